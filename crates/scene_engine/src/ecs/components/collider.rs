//! Collision detection components for ECS
//!
//! A collider is an axis-aligned box in the entity's local space. The BVH
//! collision system transforms it fully into world space; the trigger
//! system only translates it by the world position.

use crate::ecs::{Component, StorageKind};
use crate::foundation::math::Vec3;
use crate::spatial::Aabb;

/// Component that marks an entity as having collision detection enabled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderComponent {
    /// Bounds in the entity's local space
    pub local_aabb: Aabb,

    /// Static colliders never move
    pub is_static: bool,

    /// Is this a trigger volume (generates events but no physical response)?
    pub is_trigger: bool,
}

impl Component for ColliderComponent {
    const STORAGE: StorageKind = StorageKind::Sparse;
}

impl ColliderComponent {
    /// Create a dynamic, solid collider
    pub fn new(local_aabb: Aabb) -> Self {
        Self {
            local_aabb,
            is_static: false,
            is_trigger: false,
        }
    }

    /// Axis-aligned cube of the given edge length centred on the entity
    pub fn cube(size: f32) -> Self {
        let half = size * 0.5;
        Self::new(Aabb::from_center_half_extents(Vec3::zeros(), Vec3::new(half, half, half)))
    }

    /// Mark this collider as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark this as a trigger volume
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}
