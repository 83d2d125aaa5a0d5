//! ECS Systems module

pub mod transform_system;
pub mod collision_system;
pub mod trigger_system;
pub mod render_list;

pub use transform_system::TransformSystem;
pub use collision_system::CollisionSystem;
pub use trigger_system::TriggerSystem;
pub use render_list::{DrawEntry, RenderListSystem};
