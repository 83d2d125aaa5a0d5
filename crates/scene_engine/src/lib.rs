//! # Scene Engine
//!
//! Entity-component scene core with a BVH-backed collision and raycast
//! subsystem for real-time 3D applications.
//!
//! ## Features
//!
//! - **ECS Architecture**: Signature-routed systems over typed component tables
//! - **Transform Hierarchy**: Parent-relative transforms propagated each frame
//! - **BVH Raycasts**: SAH-built bounding volume hierarchy with nearest-hit queries
//! - **Trigger Volumes**: AABB overlap detection reported through an event queue
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), EcsError> {
//!     let mut scene = Scene::new();
//!     scene.register_component::<ColliderComponent>()?;
//!     scene.register_system::<TransformSystem>()?;
//!     scene.register_system::<CollisionSystem>()?;
//!
//!     let crate_box = scene.create_entity(
//!         "crate",
//!         Entity::NONE,
//!         Vec3::new(0.0, 0.0, 5.0),
//!         Quat::identity(),
//!         Vec3::new(1.0, 1.0, 1.0),
//!     )?;
//!     scene.insert_component(crate_box, ColliderComponent::cube(1.0))?;
//!     scene.update(1.0 / 60.0)?;
//!
//!     let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
//!     let hit = scene
//!         .get_system::<CollisionSystem>()
//!         .and_then(|collision| collision.raycast(&ray));
//!     assert_eq!(hit.map(|hit| hit.entity), Some(crate_box));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod spatial;
pub mod events;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, SceneConfig},
        ecs::{
            components::{ColliderComponent, RenderableComponent, TransformComponent},
            systems::{CollisionSystem, DrawEntry, RenderListSystem, TransformSystem, TriggerSystem},
            Component, EcsError, Entity, Scene, Signature, SignatureRegistry, StorageKind, System,
            SystemHandle,
        },
        events::{CollisionEvent, Event, EventKind, EventPayload, EventQueue},
        foundation::{
            handle::{AssetHandle, Material, Mesh},
            math::{Mat4, Quat, Vec3},
        },
        spatial::{Aabb, Bvh, HitSide, Ray, RayHit, SpatialError},
    };
}
