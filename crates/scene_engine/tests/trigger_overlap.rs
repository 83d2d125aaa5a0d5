//! Trigger overlaps reported through event subscriptions.

use std::cell::RefCell;
use std::rc::Rc;

use scene_engine::prelude::*;

fn unit_cube_at(center: Vec3) -> Aabb {
    Aabb::from_center_half_extents(center, Vec3::new(0.5, 0.5, 0.5))
}

#[test]
fn test_unit_cube_overlap_cases() {
    let origin = unit_cube_at(Vec3::zeros());
    assert!(origin.intersects(&unit_cube_at(Vec3::new(0.5, 0.0, 0.0))));
    assert!(!origin.intersects(&unit_cube_at(Vec3::new(2.0, 0.0, 0.0))));
}

struct Harness {
    scene: Scene,
    received: Rc<RefCell<Vec<Event>>>,
}

fn harness() -> Harness {
    scene_engine::foundation::logging::try_init();
    let mut scene = Scene::new();
    scene.register_component::<ColliderComponent>().unwrap();
    scene.register_system::<TransformSystem>().unwrap();
    scene.register_system::<TriggerSystem>().unwrap();

    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    scene.events_mut().subscribe(EventKind::Collision, Entity::NONE, move |event: &Event| {
        sink.borrow_mut().push(event.clone());
        false
    });

    Harness { scene, received }
}

fn spawn(scene: &mut Scene, position: Vec3, collider: ColliderComponent) -> Entity {
    let entity = scene
        .create_entity("body", Entity::NONE, position, Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
        .unwrap();
    scene.insert_component(entity, collider).unwrap();
    entity
}

#[test]
fn test_overlapping_cubes_report_enter() {
    let mut h = harness();
    let zone = spawn(&mut h.scene, Vec3::zeros(), ColliderComponent::cube(1.0).as_static().as_trigger());
    let body = spawn(&mut h.scene, Vec3::new(0.5, 0.0, 0.0), ColliderComponent::cube(1.0));

    h.scene.update(0.016).unwrap();

    let received = h.received.borrow();
    assert_eq!(received.len(), 2);
    let mut participants: Vec<(Entity, Entity)> = received
        .iter()
        .map(|event| (event.entity, event.payload.as_collision().unwrap().collided_entity))
        .collect();
    participants.sort();
    assert_eq!(participants, vec![(zone, body), (body, zone)]);
    assert!(received.iter().all(|e| e.payload.as_collision().unwrap().is_enter));
}

#[test]
fn test_separated_cubes_report_nothing() {
    let mut h = harness();
    spawn(&mut h.scene, Vec3::zeros(), ColliderComponent::cube(1.0).as_static().as_trigger());
    spawn(&mut h.scene, Vec3::new(2.0, 0.0, 0.0), ColliderComponent::cube(1.0));

    h.scene.update(0.016).unwrap();
    assert!(h.received.borrow().is_empty());
}

#[test]
fn test_moving_out_reports_exit() {
    let mut h = harness();
    let zone = spawn(&mut h.scene, Vec3::zeros(), ColliderComponent::cube(1.0).as_static().as_trigger());
    let body = spawn(&mut h.scene, Vec3::new(0.5, 0.0, 0.0), ColliderComponent::cube(1.0));
    h.scene.update(0.016).unwrap();

    h.scene.get_component_mut::<TransformComponent>(body).unwrap().position = Vec3::new(2.0, 0.0, 0.0);
    h.scene.update(0.016).unwrap();

    let received = h.received.borrow();
    assert_eq!(received.len(), 4);
    let exits: Vec<&CollisionEvent> = received[2..].iter().filter_map(|e| e.payload.as_collision()).collect();
    assert!(exits.iter().all(|c| !c.is_enter));
    assert!(exits.iter().any(|c| c.collided_entity == zone));
}

#[test]
fn test_entity_subscription_only_sees_own_events() {
    let mut h = harness();
    let zone = spawn(&mut h.scene, Vec3::zeros(), ColliderComponent::cube(1.0).as_static().as_trigger());
    spawn(&mut h.scene, Vec3::new(0.25, 0.0, 0.0), ColliderComponent::cube(1.0));

    let zone_events = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&zone_events);
    h.scene.events_mut().subscribe(EventKind::Collision, zone, move |_: &Event| {
        *counter.borrow_mut() += 1;
        true
    });

    h.scene.update(0.016).unwrap();
    assert_eq!(*zone_events.borrow(), 1);
    assert_eq!(h.received.borrow().len(), 2);
}
