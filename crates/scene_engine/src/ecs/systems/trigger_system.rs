//! # Trigger System
//!
//! Brute-force AABB overlap between static and dynamic colliders. Only
//! pairs where at least one side is a trigger are tested. Boxes are the
//! local collider box translated to the world position; rotation is not
//! applied.
//!
//! Overlap transitions queue [`EventKind::Collision`] events for both
//! participants: `is_enter = true` when a pair starts overlapping and
//! `is_enter = false` when it separates or one side stops being tracked.

use std::any::Any;
use std::collections::BTreeMap;

use log::trace;

use crate::ecs::components::{ColliderComponent, TransformComponent};
use crate::ecs::{EcsError, Entity, Scene, Signature, SignatureRegistry, System};
use crate::events::{CollisionEvent, EventKind, EventPayload, EventQueue};
use crate::foundation::math::Vec3;
use crate::spatial::Aabb;

/// Contact data for one static/dynamic pair
#[derive(Debug, Clone, Copy, PartialEq)]
struct Contact {
    normal: Vec3,
    point: Vec3,
}

/// Collider snapshot for one frame
#[derive(Debug, Clone, Copy)]
struct TriggerBox {
    entity: Entity,
    bounds: Aabb,
    is_trigger: bool,
}

/// Overlap-driven trigger events
#[derive(Debug, Default)]
pub struct TriggerSystem {
    /// Overlapping pairs keyed by (static, dynamic)
    active: BTreeMap<(Entity, Entity), Contact>,
    /// Pairs broken by membership loss, reported on the next update
    orphaned: Vec<((Entity, Entity), Contact)>,
}

impl TriggerSystem {
    /// Create a new trigger system
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pairs currently overlapping
    pub fn active_pairs(&self) -> usize {
        self.active.len()
    }

    /// Whether `a` and `b` currently overlap, in either role
    pub fn is_overlapping(&self, a: Entity, b: Entity) -> bool {
        self.active.contains_key(&(a, b)) || self.active.contains_key(&(b, a))
    }

    fn snapshot(scene: &Scene, entity: Entity) -> Option<(TriggerBox, bool)> {
        let transform = scene.get_component::<TransformComponent>(entity)?;
        let collider = scene.get_component::<ColliderComponent>(entity)?;
        let bounds = collider.local_aabb.translated(&transform.world_position());
        Some((
            TriggerBox {
                entity,
                bounds,
                is_trigger: collider.is_trigger,
            },
            collider.is_static,
        ))
    }

    /// Contact on the static box facing the dynamic box's centre
    fn contact(static_box: &Aabb, dynamic_box: &Aabb) -> Contact {
        let centroid = dynamic_box.center();
        let (side, _) = static_box.nearest_face(&centroid);
        Contact {
            normal: side.normal(),
            point: static_box.closest_point(&centroid),
        }
    }

    /// Queue one event per participant
    fn emit(events: &mut EventQueue, (static_entity, dynamic_entity): (Entity, Entity), contact: Contact, is_enter: bool) {
        trace!(
            "Trigger {} between {static_entity} and {dynamic_entity}",
            if is_enter { "enter" } else { "exit" }
        );
        for (entity, other) in [(static_entity, dynamic_entity), (dynamic_entity, static_entity)] {
            events.queue_event(
                EventKind::Collision,
                entity,
                EventPayload::Collision(CollisionEvent {
                    is_enter,
                    collided_entity: other,
                    normal: contact.normal,
                    point: contact.point,
                }),
            );
        }
    }
}

impl System for TriggerSystem {
    fn required_signature(&self, registry: &SignatureRegistry) -> Result<Signature, EcsError> {
        Ok(Signature::EMPTY
            .with(registry.component_id::<TransformComponent>()?)
            .with(registry.component_id::<ColliderComponent>()?))
    }

    fn on_entity_removed(&mut self, _scene: &Scene, entity: Entity) {
        let broken: Vec<(Entity, Entity)> = self
            .active
            .keys()
            .filter(|(a, b)| *a == entity || *b == entity)
            .copied()
            .collect();
        for pair in broken {
            if let Some(contact) = self.active.remove(&pair) {
                self.orphaned.push((pair, contact));
            }
        }
    }

    fn on_update(&mut self, scene: &mut Scene, entities: &[Entity], _delta_time: f32) -> Result<(), EcsError> {
        let mut statics = Vec::new();
        let mut dynamics = Vec::new();
        for &entity in entities {
            match Self::snapshot(scene, entity) {
                Some((snapshot, true)) => statics.push(snapshot),
                Some((snapshot, false)) => dynamics.push(snapshot),
                None => {}
            }
        }

        let mut overlapping = BTreeMap::new();
        for static_box in &statics {
            for dynamic_box in &dynamics {
                if !(static_box.is_trigger || dynamic_box.is_trigger) {
                    continue;
                }
                if static_box.bounds.intersects(&dynamic_box.bounds) {
                    overlapping.insert(
                        (static_box.entity, dynamic_box.entity),
                        Self::contact(&static_box.bounds, &dynamic_box.bounds),
                    );
                }
            }
        }

        let events = scene.events_mut();
        for (pair, contact) in self.orphaned.drain(..) {
            Self::emit(events, pair, contact, false);
        }
        for (pair, contact) in &self.active {
            if !overlapping.contains_key(pair) {
                Self::emit(events, *pair, *contact, false);
            }
        }
        for (pair, contact) in &overlapping {
            if !self.active.contains_key(pair) {
                Self::emit(events, *pair, *contact, true);
            }
        }

        self.active = overlapping;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
