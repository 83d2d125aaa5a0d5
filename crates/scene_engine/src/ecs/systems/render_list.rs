//! # Render List System
//!
//! Collects every visible renderable into a flat list of draw entries for
//! the renderer. Handles are passed through untouched.

use std::any::Any;

use crate::ecs::components::{RenderableComponent, TransformComponent};
use crate::ecs::{EcsError, Entity, Scene, Signature, SignatureRegistry, System};
use crate::foundation::handle::{AssetHandle, Material, Mesh};
use crate::foundation::math::Mat4;

/// One draw call worth of data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawEntry {
    /// Entity the entry was built from
    pub entity: Entity,
    /// Mesh to draw
    pub mesh: AssetHandle<Mesh>,
    /// Material to bind
    pub material: AssetHandle<Material>,
    /// Number of indices to draw
    pub index_count: u32,
    /// Model matrix
    pub world_matrix: Mat4,
}

/// System that builds the per-frame draw list
#[derive(Debug, Default)]
pub struct RenderListSystem {
    draw_list: Vec<DrawEntry>,
}

impl RenderListSystem {
    /// Create a new render list system
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw entries from the last update, ascending by entity
    pub fn draw_list(&self) -> &[DrawEntry] {
        &self.draw_list
    }
}

impl System for RenderListSystem {
    fn required_signature(&self, registry: &SignatureRegistry) -> Result<Signature, EcsError> {
        Ok(Signature::EMPTY
            .with(registry.component_id::<TransformComponent>()?)
            .with(registry.component_id::<RenderableComponent>()?))
    }

    fn on_update(&mut self, scene: &mut Scene, entities: &[Entity], _delta_time: f32) -> Result<(), EcsError> {
        self.draw_list.clear();
        for &entity in entities {
            let (Some(transform), Some(renderable)) = (
                scene.get_component::<TransformComponent>(entity),
                scene.get_component::<RenderableComponent>(entity),
            ) else {
                continue;
            };
            if !renderable.visible {
                continue;
            }

            self.draw_list.push(DrawEntry {
                entity,
                mesh: renderable.mesh,
                material: renderable.material,
                index_count: renderable.index_count,
                world_matrix: transform.world_matrix,
            });
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::systems::TransformSystem;
    use crate::foundation::math::{Quat, Vec3};

    fn render_scene() -> Scene {
        let mut scene = Scene::new();
        scene.register_component::<RenderableComponent>().unwrap();
        scene.register_system::<TransformSystem>().unwrap();
        scene.register_system::<RenderListSystem>().unwrap();
        scene
    }

    fn spawn(scene: &mut Scene, x: f32, mesh: u64) -> Entity {
        let entity = scene
            .create_entity("mesh", Entity::NONE, Vec3::new(x, 0.0, 0.0), Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
            .unwrap();
        let renderable = RenderableComponent::new(AssetHandle::from_raw(mesh), AssetHandle::from_raw(7), 36);
        scene.insert_component(entity, renderable).unwrap();
        entity
    }

    #[test]
    fn test_collect_renderables() {
        let mut scene = render_scene();
        let a = spawn(&mut scene, 1.0, 100);
        let b = spawn(&mut scene, 2.0, 200);

        scene.update(0.016).unwrap();

        let list = scene.get_system::<RenderListSystem>().unwrap().draw_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].entity, a);
        assert_eq!(list[1].entity, b);
        assert_eq!(list[1].mesh.raw(), 200);
        assert_eq!(list[1].index_count, 36);
        assert_eq!(list[1].world_matrix, Mat4::new_translation(&Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_invisible_entities_skipped() {
        let mut scene = render_scene();
        let hidden = spawn(&mut scene, 0.0, 1);
        scene.get_component_mut::<RenderableComponent>(hidden).unwrap().set_visible(false);

        scene.update(0.016).unwrap();
        assert!(scene.get_system::<RenderListSystem>().unwrap().draw_list().is_empty());
    }

    #[test]
    fn test_entities_without_renderable_ignored() {
        let mut scene = render_scene();
        scene
            .create_entity("empty", Entity::NONE, Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
            .unwrap();

        scene.update(0.016).unwrap();
        assert!(scene.get_system::<RenderListSystem>().unwrap().draw_list().is_empty());
    }
}
