//! Per-type component tables
//!
//! Each registered component type gets one [`ComponentTable`]. Dense tables
//! are `Vec<Option<T>>` indexed by entity id and grow on demand; sparse
//! tables are hash maps. The scene holds tables behind the object-safe
//! [`ErasedTable`] trait and recovers the concrete type through a checked
//! `Any` downcast.

use std::any::Any;
use std::collections::HashMap;

use super::component::{Component, StorageKind};
use super::Entity;

/// Storage for every component of one type
#[derive(Debug)]
pub enum ComponentTable<T> {
    /// Slot per entity id
    Dense(Vec<Option<T>>),
    /// Map keyed by entity
    Sparse(HashMap<Entity, T>),
}

impl<T: Component> ComponentTable<T> {
    /// Create a table using `T::STORAGE`, pre-sized for `capacity` entities when dense
    pub fn new(capacity: usize) -> Self {
        match T::STORAGE {
            StorageKind::Dense => Self::Dense(Vec::with_capacity(capacity)),
            StorageKind::Sparse => Self::Sparse(HashMap::new()),
        }
    }

    /// Store `value` for `entity`, returning the value it replaced
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        match self {
            Self::Dense(slots) => {
                let index = entity.index();
                if index >= slots.len() {
                    slots.resize_with(index + 1, || None);
                }
                slots[index].replace(value)
            }
            Self::Sparse(map) => map.insert(entity, value),
        }
    }

    /// Component stored for `entity`
    pub fn get(&self, entity: Entity) -> Option<&T> {
        match self {
            Self::Dense(slots) => slots.get(entity.index()).and_then(Option::as_ref),
            Self::Sparse(map) => map.get(&entity),
        }
    }

    /// Mutable component stored for `entity`
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self {
            Self::Dense(slots) => slots.get_mut(entity.index()).and_then(Option::as_mut),
            Self::Sparse(map) => map.get_mut(&entity),
        }
    }

    /// Take the component stored for `entity`
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        match self {
            Self::Dense(slots) => slots.get_mut(entity.index()).and_then(Option::take),
            Self::Sparse(map) => map.remove(&entity),
        }
    }

    /// Number of live components
    pub fn len(&self) -> usize {
        match self {
            Self::Dense(slots) => slots.iter().filter(|slot| slot.is_some()).count(),
            Self::Sparse(map) => map.len(),
        }
    }

    /// Whether the table holds no components
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(entity, component)` pairs; dense tables yield ascending ids
    pub fn iter(&self) -> Box<dyn Iterator<Item = (Entity, &T)> + '_> {
        match self {
            Self::Dense(slots) => Box::new(
                slots
                    .iter()
                    .enumerate()
                    .filter_map(|(index, slot)| {
                        slot.as_ref().map(|value| (Entity::from_raw(index as u64), value))
                    }),
            ),
            Self::Sparse(map) => Box::new(map.iter().map(|(entity, value)| (*entity, value))),
        }
    }
}

/// Object-safe view of a [`ComponentTable`]
pub trait ErasedTable {
    /// Drop the component stored for `entity`, returning whether one existed
    fn erase(&mut self, entity: Entity) -> bool;

    /// Number of live components
    fn live_count(&self) -> usize;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedTable for ComponentTable<T> {
    fn erase(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn live_count(&self) -> usize {
        self.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
