//! Opaque resource handles
//!
//! The resource layer hands out these handles for meshes, materials and
//! other assets. The scene core stores and forwards them but never looks
//! inside.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker type for mesh assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mesh {}

/// Marker type for material/descriptor assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {}

/// Typed handle for type-safe asset references
pub struct AssetHandle<T> {
    raw: u64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> AssetHandle<T> {
    /// Wrap a raw handle value issued by the resource layer
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _phantom: PhantomData,
        }
    }

    /// Get the raw handle value
    pub const fn raw(&self) -> u64 {
        self.raw
    }
}

// Manual impls: derives would put bounds on `T`, which is only a marker.
impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AssetHandle<T> {}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> Hash for AssetHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetHandle<{}>({})", std::any::type_name::<T>(), self.raw)
    }
}
