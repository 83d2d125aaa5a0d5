//! Component signatures and the signature registry
//!
//! Every registered component type owns one bit of a fixed-width
//! [`Signature`]. The registry also tracks each entity's current signature:
//! bit *i* is set exactly when the entity holds a live component of the
//! type assigned to bit *i*.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use super::component::{Component, ComponentId};
use super::{EcsError, Entity};

/// Maximum number of registered component types (signature width)
pub const MAX_COMPONENTS: usize = 64;

/// Fixed-width component bitset
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(u64);

impl Signature {
    /// Signature with no bits set
    pub const EMPTY: Self = Self(0);

    /// Raw bit pattern
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Builder: this signature with `id` added
    #[must_use]
    pub const fn with(self, id: ComponentId) -> Self {
        Self(self.0 | (1u64 << id.0))
    }

    /// Set the bit for `id`
    pub fn insert(&mut self, id: ComponentId) {
        self.0 |= 1u64 << id.0;
    }

    /// Clear the bit for `id`
    pub fn remove(&mut self, id: ComponentId) {
        self.0 &= !(1u64 << id.0);
    }

    /// Whether the bit for `id` is set
    pub const fn contains(self, id: ComponentId) -> bool {
        self.0 & (1u64 << id.0) != 0
    }

    /// Whether every bit of `required` is also set here
    pub const fn satisfies(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Whether no bits are set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of set bits
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#b})", self.0)
    }
}

/// Assigns signature bits to component types and tracks per-entity signatures
#[derive(Debug, Default)]
pub struct SignatureRegistry {
    ids: HashMap<TypeId, ComponentId>,
    names: Vec<&'static str>,
    signatures: Vec<Signature>,
}

impl SignatureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with signature slots reserved for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            signatures: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Assign the next free bit to `T`
    pub fn register<T: Component>(&mut self) -> Result<ComponentId, EcsError> {
        let type_id = TypeId::of::<T>();
        if self.ids.contains_key(&type_id) {
            return Err(EcsError::ComponentAlreadyRegistered(type_name::<T>()));
        }

        let next = self.names.len();
        if next >= MAX_COMPONENTS {
            return Err(EcsError::TooManyComponentTypes {
                name: type_name::<T>(),
                max: MAX_COMPONENTS,
            });
        }

        // MAX_COMPONENTS fits in a u8
        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentId(next as u8);
        self.ids.insert(type_id, id);
        self.names.push(type_name::<T>());
        Ok(id)
    }

    /// Bit assigned to `T`
    pub fn component_id<T: Component>(&self) -> Result<ComponentId, EcsError> {
        self.ids
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }

    /// Whether `T` has been registered
    pub fn is_registered<T: Component>(&self) -> bool {
        self.ids.contains_key(&TypeId::of::<T>())
    }

    /// Type name registered under `id`
    pub fn name_of(&self, id: ComponentId) -> Option<&'static str> {
        self.names.get(id.bit()).copied()
    }

    /// Number of registered component types
    pub fn registered_count(&self) -> usize {
        self.names.len()
    }

    /// Current signature of `entity` (empty for unknown entities)
    pub fn signature(&self, entity: Entity) -> Signature {
        self.signatures.get(entity.index()).copied().unwrap_or_default()
    }

    /// Set bit `id` on `entity`, growing the signature array as needed
    pub(crate) fn set(&mut self, entity: Entity, id: ComponentId) -> Signature {
        let index = entity.index();
        if index >= self.signatures.len() {
            self.signatures.resize(index + 1, Signature::EMPTY);
        }
        self.signatures[index].insert(id);
        self.signatures[index]
    }

    /// Clear bit `id` on `entity`
    pub(crate) fn clear(&mut self, entity: Entity, id: ComponentId) -> Signature {
        match self.signatures.get_mut(entity.index()) {
            Some(signature) => {
                signature.remove(id);
                *signature
            }
            None => Signature::EMPTY,
        }
    }

    /// Entities with a non-empty signature, in ascending id order
    pub fn live_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.signatures
            .iter()
            .enumerate()
            .filter(|(_, signature)| !signature.is_empty())
            .map(|(index, _)| Entity::from_raw(index as u64))
    }
}
