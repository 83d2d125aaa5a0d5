//! ECS Components module
//!
//! Built-in components every scene understands.

pub mod transform;
pub mod collider;
pub mod renderable;

pub use transform::TransformComponent;
pub use collider::ColliderComponent;
pub use renderable::RenderableComponent;
