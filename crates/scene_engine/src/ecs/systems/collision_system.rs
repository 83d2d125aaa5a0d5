//! ECS collision system backed by a BVH
//!
//! Tracks every entity with a transform and a collider, keeps their
//! world-space boxes current, and answers raycasts against them.
//!
//! The tree is rebuilt only when the tracked set changed since the last
//! build. Every insertion or removal bumps a generation counter, so a
//! removal followed by an insertion still forces a rebuild even though the
//! entity count is unchanged. Frames without a rebuild optionally refit the
//! existing tree to the new boxes.
//!
//! A system built with `Default` (as `Scene::register_system` does) takes
//! its tuning from the scene's `SceneConfig::collision` when registered.
//! One built with [`CollisionSystem::new`] keeps the tuning it was given.

use std::any::Any;
use std::collections::HashMap;

use log::debug;

use crate::config::CollisionConfig;
use crate::ecs::components::{ColliderComponent, TransformComponent};
use crate::ecs::{EcsError, Entity, Scene, Signature, SignatureRegistry, System};
use crate::spatial::{Aabb, Bvh, Ray, RayHit};

/// Raycast-capable collision system
#[derive(Debug, Default)]
pub struct CollisionSystem {
    config: CollisionConfig,
    /// Set by `new`; keeps the scene config from overriding `config`
    explicit_config: bool,
    bvh: Bvh,
    world_bounds: HashMap<Entity, Aabb>,
    /// Bumped on every membership change
    generation: u64,
    /// Generation the current tree was built for
    built_generation: u64,
    build_count: usize,
}

impl CollisionSystem {
    /// Create a collision system with the given tuning
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            config,
            explicit_config: true,
            ..Self::default()
        }
    }

    /// Collision tuning in use
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// The current tree
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// How many times the tree has been built
    pub fn build_count(&self) -> usize {
        self.build_count
    }

    /// Whether the next update will rebuild the tree
    pub fn needs_rebuild(&self) -> bool {
        self.generation != self.built_generation
    }

    /// World-space box of `entity` as of the last update
    pub fn world_bounds(&self, entity: Entity) -> Option<Aabb> {
        self.world_bounds.get(&entity).copied()
    }

    /// Nearest collider hit by `ray` within the configured maximum distance
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        self.raycast_within(ray, self.config.max_ray_distance)
    }

    /// Nearest collider hit by `ray` closer than `max_distance`
    pub fn raycast_within(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        self.bvh.raycast(ray, max_distance).map(|hit| RayHit {
            entity: hit.entity,
            distance: hit.t,
            point: ray.point_at(hit.t),
            normal: hit.side.normal(),
        })
    }

    /// Collider box transformed by the entity's full world matrix
    fn compute_world_bounds(scene: &Scene, entity: Entity) -> Option<Aabb> {
        let transform = scene.get_component::<TransformComponent>(entity)?;
        let collider = scene.get_component::<ColliderComponent>(entity)?;
        Some(collider.local_aabb.transformed(&transform.world_matrix))
    }
}

impl System for CollisionSystem {
    fn required_signature(&self, registry: &SignatureRegistry) -> Result<Signature, EcsError> {
        Ok(Signature::EMPTY
            .with(registry.component_id::<TransformComponent>()?)
            .with(registry.component_id::<ColliderComponent>()?))
    }

    fn on_registered(&mut self, scene: &Scene) {
        if !self.explicit_config {
            self.config = scene.config().collision.clone();
        }
    }

    fn on_entity_inserted(&mut self, _scene: &Scene, _entity: Entity) {
        self.generation += 1;
    }

    fn on_entity_removed(&mut self, _scene: &Scene, entity: Entity) {
        self.world_bounds.remove(&entity);
        self.generation += 1;
    }

    fn on_update(&mut self, scene: &mut Scene, entities: &[Entity], _delta_time: f32) -> Result<(), EcsError> {
        self.world_bounds.clear();
        let primitives: Vec<(Entity, Aabb)> = entities
            .iter()
            .filter_map(|&entity| Self::compute_world_bounds(scene, entity).map(|bounds| (entity, bounds)))
            .collect();
        self.world_bounds.extend(primitives.iter().copied());

        if !self.needs_rebuild() {
            if self.config.refit_each_frame {
                let bounds = &self.world_bounds;
                self.bvh.refit(|entity| bounds.get(&entity).copied());
            }
            return Ok(());
        }

        self.bvh = if primitives.is_empty() {
            Bvh::default()
        } else {
            Bvh::build(&primitives)?
        };
        self.built_generation = self.generation;
        self.build_count += 1;
        debug!(
            "Rebuilt collision BVH: {} primitives, {} nodes",
            primitives.len(),
            self.bvh.len()
        );
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
