//! Entity implementation

use std::fmt;

/// Entity identifier
///
/// Entities carry no data of their own. Id 0 is reserved for "no entity"
/// and doubles as the implicit root parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Entity {
    id: u64,
}

impl Entity {
    /// The reserved "no entity" / root handle
    pub const NONE: Self = Self { id: 0 };

    /// Create an entity handle from a raw id
    pub const fn from_raw(id: u64) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether this is the reserved "no entity" handle
    pub const fn is_none(&self) -> bool {
        self.id == 0
    }

    /// Index into dense per-entity arrays
    pub(crate) fn index(self) -> usize {
        usize::try_from(self.id).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}

/// Monotonic entity id allocator
///
/// Ids start at 1 and are never reused within a scene.
#[derive(Debug, Clone)]
pub(crate) struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    pub(crate) const fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocate the next id, or `None` once the id space is exhausted
    pub(crate) fn allocate(&mut self) -> Option<Entity> {
        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1)?;
        Some(Entity::from_raw(id))
    }

    /// Whether `entity` has been handed out by this allocator
    pub(crate) const fn is_allocated(&self, entity: Entity) -> bool {
        entity.id != 0 && entity.id < self.next_id
    }

    #[cfg(test)]
    pub(crate) const fn starting_at(next_id: u64) -> Self {
        Self { next_id }
    }
}
