//! Renderable component for entities that can be rendered
//!
//! Holds opaque mesh and material handles issued by the resource layer.
//! The render list system pairs these with world matrices.

use crate::ecs::Component;
use crate::foundation::handle::{AssetHandle, Material, Mesh};

/// Component for entities that can be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderableComponent {
    /// Mesh to draw
    pub mesh: AssetHandle<Mesh>,

    /// Material/descriptor set to bind
    pub material: AssetHandle<Material>,

    /// Number of indices to draw from the mesh
    pub index_count: u32,

    /// Whether this object is visible
    pub visible: bool,
}

impl Component for RenderableComponent {}

impl RenderableComponent {
    /// Create a visible renderable
    pub fn new(mesh: AssetHandle<Mesh>, material: AssetHandle<Material>, index_count: u32) -> Self {
        Self {
            mesh,
            material,
            index_count,
            visible: true,
        }
    }

    /// Set visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
