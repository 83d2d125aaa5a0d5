//! # Scene
//!
//! Single owner of entity ids, component tables, the signature registry,
//! the ordered system list and the event queue. Every component insertion
//! or removal goes through here so that signatures and system membership
//! never drift apart.

use std::any::{type_name, TypeId};
use std::collections::BTreeSet;

use log::{debug, trace};
use slotmap::SlotMap;

use super::component::{Component, ComponentId};
use super::components::TransformComponent;
use super::entity::EntityAllocator;
use super::storage::{ComponentTable, ErasedTable};
use super::{EcsError, Entity, Signature, SignatureRegistry, System, SystemHandle};
use crate::config::SceneConfig;
use crate::events::EventQueue;
use crate::foundation::math::{Quat, Vec3};

/// Membership change waiting to be delivered to a system
#[derive(Debug, Clone, Copy)]
enum MembershipChange {
    Inserted(Entity),
    Removed(Entity),
}

/// Bookkeeping for one registered system
struct SystemEntry {
    type_id: TypeId,
    name: &'static str,
    signature: Signature,
    entities: BTreeSet<Entity>,
    /// `None` while the system is running or handling a callback
    system: Option<Box<dyn System>>,
    deferred: Vec<MembershipChange>,
}

/// ECS scene containing all entities, components and systems
pub struct Scene {
    config: SceneConfig,
    allocator: EntityAllocator,
    registry: SignatureRegistry,
    tables: Vec<Box<dyn ErasedTable>>,
    systems: SlotMap<SystemHandle, SystemEntry>,
    order: Vec<SystemHandle>,
    events: EventQueue,
}

impl Scene {
    /// Create a new scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create a scene with custom configuration
    ///
    /// [`TransformComponent`] is registered up front since every entity carries one.
    pub fn with_config(config: SceneConfig) -> Self {
        let mut scene = Self {
            registry: SignatureRegistry::with_capacity(config.initial_entity_capacity),
            config,
            allocator: EntityAllocator::new(),
            tables: Vec::new(),
            systems: SlotMap::with_key(),
            order: Vec::new(),
            events: EventQueue::new(),
        };

        // First registration on an empty registry cannot collide or overflow
        let registered = scene.register_component::<TransformComponent>();
        debug_assert!(registered.is_ok(), "transform registration failed: {registered:?}");
        scene
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Component types
    // ------------------------------------------------------------------

    /// Register a component type, assigning it the next signature bit
    pub fn register_component<T: Component>(&mut self) -> Result<ComponentId, EcsError> {
        let id = self.registry.register::<T>()?;
        debug_assert_eq!(id.bit(), self.tables.len());
        self.tables
            .push(Box::new(ComponentTable::<T>::new(self.config.initial_entity_capacity)));
        debug!("Registered component {} at bit {}", type_name::<T>(), id.bit());
        Ok(id)
    }

    /// Signature bit assigned to `T`
    pub fn component_id<T: Component>(&self) -> Result<ComponentId, EcsError> {
        self.registry.component_id::<T>()
    }

    /// Whether `T` has been registered
    pub fn is_registered<T: Component>(&self) -> bool {
        self.registry.is_registered::<T>()
    }

    /// The signature registry
    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    fn table<T: Component>(&self) -> Option<&ComponentTable<T>> {
        let id = self.registry.component_id::<T>().ok()?;
        self.tables.get(id.bit())?.as_any().downcast_ref()
    }

    fn table_mut<T: Component>(&mut self) -> Result<&mut ComponentTable<T>, EcsError> {
        let id = self.registry.component_id::<T>()?;
        self.tables
            .get_mut(id.bit())
            .and_then(|table| table.as_any_mut().downcast_mut())
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Create an entity with its mandatory transform
    ///
    /// `parent` may be [`Entity::NONE`] for a root-level entity. The world
    /// matrix is initialised from the parent's current world matrix.
    pub fn create_entity(
        &mut self,
        tag: impl Into<String>,
        parent: Entity,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> Result<Entity, EcsError> {
        let parent_world = if parent.is_none() {
            None
        } else {
            let parent_transform = self
                .get_component::<TransformComponent>(parent)
                .ok_or(EcsError::UnknownParent(parent))?;
            Some(parent_transform.world_matrix)
        };

        let entity = self.allocator.allocate().ok_or(EcsError::EntityIdsExhausted)?;
        let mut transform = TransformComponent::new(tag, parent, position, rotation, scale);
        transform.world_matrix = match parent_world {
            Some(world) => world * transform.local_matrix(),
            None => transform.local_matrix(),
        };

        self.insert_component(entity, transform)?;
        trace!("Created {entity} under {parent}");
        Ok(entity)
    }

    /// First entity under `parent` whose transform tag equals `tag`
    ///
    /// Returns [`Entity::NONE`] when nothing matches. Tags are not unique;
    /// only the lowest matching id is returned.
    pub fn get_entity(&self, tag: &str, parent: Entity) -> Entity {
        self.table::<TransformComponent>()
            .and_then(|table| {
                table
                    .iter()
                    .find(|(_, transform)| transform.parent == parent && transform.tag == tag)
                    .map(|(entity, _)| entity)
            })
            .unwrap_or(Entity::NONE)
    }

    /// Entities holding at least one component, ascending by id
    pub fn entities(&self) -> Vec<Entity> {
        self.registry.live_entities().collect()
    }

    /// Number of entities holding at least one component
    pub fn entity_count(&self) -> usize {
        self.registry.live_entities().count()
    }

    /// Current signature of `entity`
    pub fn signature(&self, entity: Entity) -> Signature {
        self.registry.signature(entity)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attach `value` to `entity`
    ///
    /// Fails if `T` is unregistered, the entity was never allocated, or the
    /// entity already holds a `T`. On success every system whose required
    /// signature is now satisfied starts tracking the entity.
    pub fn insert_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        if !self.allocator.is_allocated(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }

        let id = self.registry.component_id::<T>()?;
        if self.registry.signature(entity).contains(id) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: type_name::<T>(),
            });
        }

        self.table_mut::<T>()?.insert(entity, value);
        let signature = self.registry.set(entity, id);
        self.reevaluate_on_insert(entity, signature);
        Ok(())
    }

    /// Detach and return the `T` held by `entity`
    ///
    /// Returns `Ok(None)` when the entity has no `T`. Systems that no longer
    /// match the entity's signature stop tracking it.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<Option<T>, EcsError> {
        let id = self.registry.component_id::<T>()?;
        if !self.registry.signature(entity).contains(id) {
            return Ok(None);
        }

        let value = self.table_mut::<T>()?.remove(entity);
        let signature = self.registry.clear(entity, id);
        self.reevaluate_on_remove(entity, signature);
        Ok(value)
    }

    /// Component `T` of `entity`, if attached
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        let id = self.registry.component_id::<T>().ok()?;
        if !self.registry.signature(entity).contains(id) {
            return None;
        }
        self.table::<T>()?.get(entity)
    }

    /// Mutable component `T` of `entity`, if attached
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let id = self.registry.component_id::<T>().ok()?;
        if !self.registry.signature(entity).contains(id) {
            return None;
        }
        self.table_mut::<T>().ok()?.get_mut(entity)
    }

    /// Whether `entity` currently holds a `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.registry
            .component_id::<T>()
            .map(|id| self.registry.signature(entity).contains(id))
            .unwrap_or(false)
    }

    /// Iterate every `(entity, component)` of type `T`
    pub fn iter_components<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.table::<T>().into_iter().flat_map(|table| table.iter())
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    /// Construct and append system `S`
    pub fn register_system<S: System + Default>(&mut self) -> Result<SystemHandle, EcsError> {
        self.add_system(S::default())
    }

    /// Construct system `S` and insert it at position `index` in the update order
    pub fn register_system_at<S: System + Default>(&mut self, index: usize) -> Result<SystemHandle, EcsError> {
        self.insert_system(index, S::default())
    }

    /// Append an already-constructed system
    pub fn add_system<S: System>(&mut self, system: S) -> Result<SystemHandle, EcsError> {
        let index = self.order.len();
        self.insert_system(index, system)
    }

    /// Insert an already-constructed system at position `index`
    ///
    /// Entities that already match the system's signature are handed to it
    /// immediately.
    pub fn insert_system<S: System>(&mut self, index: usize, mut system: S) -> Result<SystemHandle, EcsError> {
        if index > self.order.len() {
            return Err(EcsError::SystemIndexOutOfRange {
                index,
                len: self.order.len(),
            });
        }

        let type_id = TypeId::of::<S>();
        let name = system.name();
        if self.systems.values().any(|entry| entry.type_id == type_id) {
            return Err(EcsError::SystemAlreadyRegistered(name));
        }

        let signature = system.required_signature(&self.registry)?;
        system.on_registered(self);
        let handle = self.systems.insert(SystemEntry {
            type_id,
            name,
            signature,
            entities: BTreeSet::new(),
            system: Some(Box::new(system)),
            deferred: Vec::new(),
        });
        self.order.insert(index, handle);
        debug!("Registered system {name} at position {index} with {signature:?}");

        let matching: Vec<Entity> = self
            .registry
            .live_entities()
            .filter(|entity| self.registry.signature(*entity).satisfies(signature))
            .collect();
        for entity in matching {
            if let Some(entry) = self.systems.get_mut(handle) {
                entry.entities.insert(entity);
            }
            self.deliver(handle, MembershipChange::Inserted(entity));
        }

        Ok(handle)
    }

    /// Handle of the registered system of type `S`
    pub fn system_handle<S: System>(&self) -> Option<SystemHandle> {
        let type_id = TypeId::of::<S>();
        self.systems
            .iter()
            .find(|(_, entry)| entry.type_id == type_id)
            .map(|(handle, _)| handle)
    }

    /// Registered system of type `S`
    ///
    /// Returns `None` while that system is itself inside `on_update`.
    pub fn get_system<S: System>(&self) -> Option<&S> {
        let handle = self.system_handle::<S>()?;
        self.systems.get(handle)?.system.as_ref()?.as_any().downcast_ref()
    }

    /// Mutable access to the registered system of type `S`
    pub fn get_system_mut<S: System>(&mut self) -> Option<&mut S> {
        let handle = self.system_handle::<S>()?;
        self.systems.get_mut(handle)?.system.as_mut()?.as_any_mut().downcast_mut()
    }

    /// Entities currently tracked by the system behind `handle`
    pub fn system_entities(&self, handle: SystemHandle) -> Result<&BTreeSet<Entity>, EcsError> {
        self.systems
            .get(handle)
            .map(|entry| &entry.entities)
            .ok_or(EcsError::SystemNotRegistered("<stale handle>"))
    }

    /// Required signature of the system behind `handle`
    pub fn system_signature(&self, handle: SystemHandle) -> Result<Signature, EcsError> {
        self.systems
            .get(handle)
            .map(|entry| entry.signature)
            .ok_or(EcsError::SystemNotRegistered("<stale handle>"))
    }

    /// Systems in update order
    pub fn system_order(&self) -> &[SystemHandle] {
        &self.order
    }

    /// Names of the systems in update order
    pub fn system_names(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .filter_map(|handle| self.systems.get(*handle).map(|entry| entry.name))
            .collect()
    }

    /// Run every system's `on_update` once, strictly in registration order
    ///
    /// Stops at the first system error. Queued events are dispatched
    /// afterwards when `dispatch_events_on_update` is set.
    pub fn update(&mut self, delta_time: f32) -> Result<(), EcsError> {
        let order = self.order.clone();
        for handle in order {
            let Some(entry) = self.systems.get_mut(handle) else {
                continue;
            };
            let Some(mut system) = entry.system.take() else {
                continue;
            };
            let entities: Vec<Entity> = entry.entities.iter().copied().collect();

            let result = system.on_update(self, &entities, delta_time);
            self.restore_system(handle, system);
            result?;
        }

        if self.config.dispatch_events_on_update {
            self.events.dispatch();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// The scene's event queue
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Mutable access to the scene's event queue
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    // ------------------------------------------------------------------
    // Membership bookkeeping
    // ------------------------------------------------------------------

    fn reevaluate_on_insert(&mut self, entity: Entity, signature: Signature) {
        for handle in self.order.clone() {
            let Some(entry) = self.systems.get_mut(handle) else {
                continue;
            };
            if signature.satisfies(entry.signature) && entry.entities.insert(entity) {
                trace!("{entity} joined {}", entry.name);
                self.deliver(handle, MembershipChange::Inserted(entity));
            }
        }
    }

    fn reevaluate_on_remove(&mut self, entity: Entity, signature: Signature) {
        for handle in self.order.clone() {
            let Some(entry) = self.systems.get_mut(handle) else {
                continue;
            };
            if !signature.satisfies(entry.signature) && entry.entities.remove(&entity) {
                trace!("{entity} left {}", entry.name);
                self.deliver(handle, MembershipChange::Removed(entity));
            }
        }
    }

    /// Queue `change` for the system and flush it now unless the system is busy
    fn deliver(&mut self, handle: SystemHandle, change: MembershipChange) {
        let Some(entry) = self.systems.get_mut(handle) else {
            return;
        };
        entry.deferred.push(change);
        if let Some(system) = entry.system.take() {
            self.restore_system(handle, system);
        }
    }

    /// Flush deferred callbacks into `system` and put it back in its slot
    fn restore_system(&mut self, handle: SystemHandle, mut system: Box<dyn System>) {
        let pending = match self.systems.get_mut(handle) {
            Some(entry) => std::mem::take(&mut entry.deferred),
            None => return,
        };

        for change in pending {
            match change {
                MembershipChange::Inserted(entity) => system.on_entity_inserted(self, entity),
                MembershipChange::Removed(entity) => system.on_entity_removed(self, entity),
            }
        }

        if let Some(entry) = self.systems.get_mut(handle) {
            entry.system = Some(system);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug, Clone, PartialEq)]
    struct Health(i32);
    impl Component for Health {}

    #[derive(Debug, Clone, PartialEq)]
    struct Poisoned;
    impl Component for Poisoned {
        const STORAGE: crate::ecs::StorageKind = crate::ecs::StorageKind::Sparse;
    }

    /// Records callbacks so tests can inspect delivery
    #[derive(Default)]
    struct PoisonSystem {
        inserted: Vec<Entity>,
        removed: Vec<Entity>,
        updates: usize,
    }

    impl System for PoisonSystem {
        fn required_signature(&self, registry: &SignatureRegistry) -> Result<Signature, EcsError> {
            Ok(Signature::EMPTY
                .with(registry.component_id::<Health>()?)
                .with(registry.component_id::<Poisoned>()?))
        }

        fn on_entity_inserted(&mut self, _scene: &Scene, entity: Entity) {
            self.inserted.push(entity);
        }

        fn on_entity_removed(&mut self, _scene: &Scene, entity: Entity) {
            self.removed.push(entity);
        }

        fn on_update(&mut self, scene: &mut Scene, entities: &[Entity], _delta_time: f32) -> Result<(), EcsError> {
            self.updates += 1;
            for entity in entities {
                if let Some(health) = scene.get_component_mut::<Health>(*entity) {
                    health.0 -= 1;
                }
            }
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    /// Cures poison during its own update, removing entities from itself
    #[derive(Default)]
    struct CureSystem {
        removed: Vec<Entity>,
    }

    impl System for CureSystem {
        fn required_signature(&self, registry: &SignatureRegistry) -> Result<Signature, EcsError> {
            Ok(Signature::EMPTY.with(registry.component_id::<Poisoned>()?))
        }

        fn on_entity_removed(&mut self, _scene: &Scene, entity: Entity) {
            self.removed.push(entity);
        }

        fn on_update(&mut self, scene: &mut Scene, entities: &[Entity], _delta_time: f32) -> Result<(), EcsError> {
            for entity in entities {
                scene.remove_component::<Poisoned>(*entity)?;
            }
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn scene_with_types() -> Scene {
        let mut scene = Scene::new();
        scene.register_component::<Health>().unwrap();
        scene.register_component::<Poisoned>().unwrap();
        scene
    }

    fn spawn(scene: &mut Scene, tag: &str) -> Entity {
        scene
            .create_entity(tag, Entity::NONE, Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
            .unwrap()
    }

    #[test]
    fn test_entities_start_at_one_with_transform() {
        let mut scene = Scene::new();
        let first = spawn(&mut scene, "a");
        let second = spawn(&mut scene, "b");

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert!(scene.has_component::<TransformComponent>(first));
        assert_eq!(scene.entities(), vec![first, second]);
    }

    #[test]
    fn test_transform_registered_first_for_any_config() {
        let config = SceneConfig {
            initial_entity_capacity: 0,
            ..SceneConfig::default()
        };
        let scene = Scene::with_config(config);

        assert!(scene.is_registered::<TransformComponent>());
        assert_eq!(scene.component_id::<TransformComponent>().unwrap().bit(), 0);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut scene = scene_with_types();
        let entity = spawn(&mut scene, "a");
        scene.insert_component(entity, Health(10)).unwrap();

        let err = scene.insert_component(entity, Health(3)).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        assert_eq!(scene.get_component::<Health>(entity), Some(&Health(10)));
    }

    #[test]
    fn test_insert_into_unallocated_entity() {
        let mut scene = scene_with_types();
        assert_eq!(
            scene.insert_component(Entity::from_raw(7), Health(1)),
            Err(EcsError::InvalidEntity(Entity::from_raw(7)))
        );
        assert_eq!(
            scene.insert_component(Entity::NONE, Health(1)),
            Err(EcsError::InvalidEntity(Entity::NONE))
        );
    }

    #[test]
    fn test_unregistered_component_insert() {
        let mut scene = Scene::new();
        let entity = spawn(&mut scene, "a");
        assert!(matches!(
            scene.insert_component(entity, Health(1)),
            Err(EcsError::ComponentNotRegistered(_))
        ));
        assert!(scene.get_component::<Health>(entity).is_none());
    }

    #[test]
    fn test_remove_clears_bit_and_value() {
        let mut scene = scene_with_types();
        let entity = spawn(&mut scene, "a");
        scene.insert_component(entity, Health(4)).unwrap();

        assert_eq!(scene.remove_component::<Health>(entity).unwrap(), Some(Health(4)));
        assert!(!scene.has_component::<Health>(entity));
        assert!(scene.get_component::<Health>(entity).is_none());
        assert_eq!(scene.remove_component::<Health>(entity).unwrap(), None);

        // Re-inserting after removal is allowed
        scene.insert_component(entity, Health(8)).unwrap();
        assert_eq!(scene.get_component::<Health>(entity), Some(&Health(8)));
    }

    #[test]
    fn test_get_entity_by_tag_and_parent() {
        let mut scene = Scene::new();
        let root = spawn(&mut scene, "ship");
        let child = scene
            .create_entity("turret", root, Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
            .unwrap();
        let _second_turret = scene
            .create_entity("turret", root, Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
            .unwrap();

        assert_eq!(scene.get_entity("ship", Entity::NONE), root);
        assert_eq!(scene.get_entity("turret", root), child);
        assert_eq!(scene.get_entity("turret", Entity::NONE), Entity::NONE);
        assert_eq!(scene.get_entity("missing", root), Entity::NONE);
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut scene = Scene::new();
        let result = scene.create_entity(
            "orphan",
            Entity::from_raw(99),
            Vec3::zeros(),
            Quat::identity(),
            Vec3::new(1.0, 1.0, 1.0),
        );
        assert_eq!(result, Err(EcsError::UnknownParent(Entity::from_raw(99))));
    }

    #[test]
    fn test_membership_follows_insert_and_remove() {
        let mut scene = scene_with_types();
        let handle = scene.register_system::<PoisonSystem>().unwrap();
        let entity = spawn(&mut scene, "a");

        scene.insert_component(entity, Health(5)).unwrap();
        assert!(scene.system_entities(handle).unwrap().is_empty());

        scene.insert_component(entity, Poisoned).unwrap();
        assert!(scene.system_entities(handle).unwrap().contains(&entity));
        assert_eq!(scene.get_system::<PoisonSystem>().unwrap().inserted, vec![entity]);

        scene.remove_component::<Health>(entity).unwrap();
        assert!(scene.system_entities(handle).unwrap().is_empty());
        assert_eq!(scene.get_system::<PoisonSystem>().unwrap().removed, vec![entity]);
    }

    #[test]
    fn test_late_registration_picks_up_existing_entities() {
        let mut scene = scene_with_types();
        let entity = spawn(&mut scene, "a");
        scene.insert_component(entity, Health(5)).unwrap();
        scene.insert_component(entity, Poisoned).unwrap();

        let handle = scene.register_system::<PoisonSystem>().unwrap();
        assert!(scene.system_entities(handle).unwrap().contains(&entity));
        assert_eq!(scene.get_system::<PoisonSystem>().unwrap().inserted, vec![entity]);
    }

    #[test]
    fn test_duplicate_system_rejected() {
        let mut scene = scene_with_types();
        scene.register_system::<PoisonSystem>().unwrap();
        assert!(matches!(
            scene.register_system::<PoisonSystem>(),
            Err(EcsError::SystemAlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_system_requires_registered_components() {
        let mut scene = Scene::new();
        assert!(matches!(
            scene.register_system::<PoisonSystem>(),
            Err(EcsError::ComponentNotRegistered(_))
        ));
        assert!(scene.system_order().is_empty());
    }

    #[test]
    fn test_register_system_at_controls_order() {
        let mut scene = scene_with_types();
        scene.register_system::<PoisonSystem>().unwrap();
        scene.register_system_at::<CureSystem>(0).unwrap();

        let names = scene.system_names();
        assert!(names[0].ends_with("CureSystem"));
        assert!(names[1].ends_with("PoisonSystem"));

        assert!(matches!(
            scene.insert_system(5, CureSystem::default()),
            Err(EcsError::SystemIndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_update_runs_systems_over_members() {
        let mut scene = scene_with_types();
        scene.register_system::<PoisonSystem>().unwrap();
        let sick = spawn(&mut scene, "sick");
        let well = spawn(&mut scene, "well");
        scene.insert_component(sick, Health(3)).unwrap();
        scene.insert_component(sick, Poisoned).unwrap();
        scene.insert_component(well, Health(3)).unwrap();

        scene.update(0.016).unwrap();
        scene.update(0.016).unwrap();

        assert_eq!(scene.get_component::<Health>(sick), Some(&Health(1)));
        assert_eq!(scene.get_component::<Health>(well), Some(&Health(3)));
        assert_eq!(scene.get_system::<PoisonSystem>().unwrap().updates, 2);
    }

    #[test]
    fn test_iter_components_visits_every_holder() {
        let mut scene = scene_with_types();
        let a = spawn(&mut scene, "a");
        let b = spawn(&mut scene, "b");
        let c = spawn(&mut scene, "c");
        scene.insert_component(c, Health(3)).unwrap();
        scene.insert_component(a, Health(1)).unwrap();

        let found: Vec<(Entity, i32)> = scene.iter_components::<Health>().map(|(e, h)| (e, h.0)).collect();
        assert_eq!(found, vec![(a, 1), (c, 3)]);
        assert!(!found.iter().any(|(e, _)| *e == b));
        assert_eq!(scene.iter_components::<TransformComponent>().count(), 3);
    }

    #[test]
    fn test_removal_during_own_update_is_deferred_then_delivered() {
        let mut scene = scene_with_types();
        scene.register_system::<CureSystem>().unwrap();
        scene.register_system::<PoisonSystem>().unwrap();
        let entity = spawn(&mut scene, "a");
        scene.insert_component(entity, Health(3)).unwrap();
        scene.insert_component(entity, Poisoned).unwrap();

        scene.update(0.016).unwrap();

        // Cure ran first, so poison never ticked
        assert_eq!(scene.get_component::<Health>(entity), Some(&Health(3)));
        assert_eq!(scene.get_system::<CureSystem>().unwrap().removed, vec![entity]);
        assert_eq!(scene.get_system::<PoisonSystem>().unwrap().removed, vec![entity]);
        let cure = scene.system_handle::<CureSystem>().unwrap();
        assert!(scene.system_entities(cure).unwrap().is_empty());
    }
}
