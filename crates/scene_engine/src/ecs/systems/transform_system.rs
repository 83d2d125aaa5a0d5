//! # Transform System
//!
//! Recomputes every entity's cached world matrix from its local
//! position/rotation/scale and its parent's world matrix. Entities are
//! processed shallowest first so a parent is always current before its
//! children read it.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use log::warn;

use crate::ecs::components::TransformComponent;
use crate::ecs::{EcsError, Entity, Scene, Signature, SignatureRegistry, System};
use crate::foundation::math::Mat4;

/// System that propagates transforms down the parent hierarchy
#[derive(Debug, Default)]
pub struct TransformSystem {
    /// Static entities whose world matrix has not been computed yet
    pending_static: HashSet<Entity>,
}

impl TransformSystem {
    /// Create a new transform system
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parent links between `entity` and the root
    ///
    /// Stops after `limit` steps so a parent cycle cannot loop forever.
    fn depth(scene: &Scene, entity: Entity, limit: usize) -> usize {
        let mut depth = 0;
        let mut current = entity;
        while let Some(transform) = scene.get_component::<TransformComponent>(current) {
            if transform.parent.is_none() || depth >= limit {
                break;
            }
            current = transform.parent;
            depth += 1;
        }
        depth
    }
}

impl System for TransformSystem {
    fn required_signature(&self, registry: &SignatureRegistry) -> Result<Signature, EcsError> {
        Ok(Signature::EMPTY.with(registry.component_id::<TransformComponent>()?))
    }

    fn on_entity_inserted(&mut self, scene: &Scene, entity: Entity) {
        if scene
            .get_component::<TransformComponent>(entity)
            .is_some_and(|transform| transform.is_static)
        {
            self.pending_static.insert(entity);
        }
    }

    fn on_entity_removed(&mut self, _scene: &Scene, entity: Entity) {
        self.pending_static.remove(&entity);
    }

    fn on_update(&mut self, scene: &mut Scene, entities: &[Entity], _delta_time: f32) -> Result<(), EcsError> {
        let depths: HashMap<Entity, usize> = entities
            .iter()
            .map(|&entity| (entity, Self::depth(scene, entity, entities.len())))
            .collect();

        let mut ordered = entities.to_vec();
        ordered.sort_by_key(|entity| (depths[entity], *entity));

        for entity in ordered {
            let Some(transform) = scene.get_component::<TransformComponent>(entity) else {
                continue;
            };
            if transform.is_static && !self.pending_static.contains(&entity) {
                continue;
            }

            let parent = transform.parent;
            let local = transform.local_matrix();
            let parent_world = if parent.is_none() {
                Mat4::identity()
            } else if let Some(parent_transform) = scene.get_component::<TransformComponent>(parent) {
                parent_transform.world_matrix
            } else {
                warn!("{entity} has parent {parent} without a transform, treating it as a root");
                Mat4::identity()
            };

            if let Some(transform) = scene.get_component_mut::<TransformComponent>(entity) {
                transform.world_matrix = parent_world * local;
            }
            self.pending_static.remove(&entity);
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
