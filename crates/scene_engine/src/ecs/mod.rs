//! Entity-Component-System implementation
//!
//! The [`Scene`] owns entity ids, one table per component type, the
//! signature registry and the ordered system list. It is the only place
//! component state changes, and it routes entities to systems by
//! signature.

pub mod entity;
pub mod component;
pub mod signature;
pub mod storage;
pub mod system;
pub mod scene;
pub mod error;
pub mod components;
pub mod systems;

pub use entity::Entity;
pub use component::{Component, ComponentId, StorageKind};
pub use signature::{Signature, SignatureRegistry, MAX_COMPONENTS};
pub use storage::ComponentTable;
pub use system::{System, SystemHandle};
pub use scene::Scene;
pub use error::EcsError;
