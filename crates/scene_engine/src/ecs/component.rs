//! Component trait and implementations

use std::any::Any;

/// Backing representation of a component table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// `Vec` indexed by entity id, grown on demand. Best when most entities carry the type.
    Dense,
    /// Hash map keyed by entity. Best for rarely attached types.
    Sparse,
}

/// Marker trait for components
///
/// Any plain `'static` data record can be a component. The storage kind is
/// chosen per type based on its expected density.
pub trait Component: Any + 'static {
    /// Table representation for this type
    const STORAGE: StorageKind = StorageKind::Dense;
}

/// Bit position assigned to a registered component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub(crate) u8);

impl ComponentId {
    /// Bit index inside a [`Signature`](super::Signature)
    pub const fn bit(self) -> usize {
        self.0 as usize
    }
}
