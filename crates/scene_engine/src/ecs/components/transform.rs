//! Transform component for the ECS system
//!
//! Pure data component: local position/rotation/scale plus the cached
//! world matrix that [`TransformSystem`](crate::ecs::systems::TransformSystem)
//! recomputes each frame. Every entity carries exactly one.

use crate::ecs::{Component, Entity};
use crate::foundation::math::{compose_trs, translation_of, Mat4, Quat, Vec3};

/// ECS Transform component
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// Position relative to the parent
    pub position: Vec3,

    /// Rotation relative to the parent
    pub rotation: Quat,

    /// Scale factors relative to the parent
    pub scale: Vec3,

    /// Cached world matrix (parent world * local)
    pub world_matrix: Mat4,

    /// Parent entity, [`Entity::NONE`] for root-level entities
    pub parent: Entity,

    /// Lookup tag, not required to be unique
    pub tag: String,

    /// Static entities have their world matrix computed once
    pub is_static: bool,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            world_matrix: Mat4::identity(),
            parent: Entity::NONE,
            tag: String::new(),
            is_static: false,
        }
    }
}

impl TransformComponent {
    /// Create a transform with an identity world matrix
    pub fn new(tag: impl Into<String>, parent: Entity, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            parent,
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Local matrix: scale, then rotation, then translation
    pub fn local_matrix(&self) -> Mat4 {
        compose_trs(&self.position, &self.rotation, &self.scale)
    }

    /// World-space position taken from the cached world matrix
    pub fn world_position(&self) -> Vec3 {
        translation_of(&self.world_matrix)
    }

    /// Builder pattern: mark as static
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}
