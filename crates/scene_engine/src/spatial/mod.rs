//! Spatial partitioning and queries
//!
//! Axis-aligned boxes, rays, and a binary bounding volume hierarchy built
//! with the surface area heuristic.

pub mod aabb;
pub mod ray;
pub mod bvh;

pub use aabb::{Aabb, HitSide, SlabHit};
pub use ray::{Ray, RayHit};
pub use bvh::{BiTreeNode, Bvh, BvhHit, BvhSlot};

use crate::ecs::Entity;

/// Errors produced while building spatial structures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpatialError {
    /// A BVH node was requested over zero primitives
    #[error("cannot build a BVH node from an empty primitive list")]
    EmptyPrimitiveList,

    /// A primitive's box has `min > max` on some axis or non-finite corners
    #[error("primitive {0} has malformed bounds")]
    InvalidBounds(Entity),
}
