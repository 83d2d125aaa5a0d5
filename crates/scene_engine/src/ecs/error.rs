//! ECS error types
//!
//! Structural misuse of the scene (double registration, duplicate
//! insertion, unknown types) is reported through [`EcsError`] rather than
//! aborting. Expected "not found" outcomes are `Option`s at the call site.

use thiserror::Error;

use super::Entity;
use crate::spatial::SpatialError;

/// Errors produced by scene, component and system operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EcsError {
    /// A component type was registered twice
    #[error("component type `{0}` is already registered")]
    ComponentAlreadyRegistered(&'static str),

    /// A component type was used before registration
    #[error("component type `{0}` is not registered")]
    ComponentNotRegistered(&'static str),

    /// Every signature bit is already assigned
    #[error("cannot register `{name}`: all {max} component slots are in use")]
    TooManyComponentTypes {
        /// Type that failed to register
        name: &'static str,
        /// Signature width
        max: usize,
    },

    /// The entity already holds a component of this type
    #[error("{entity} already has a `{component}` component")]
    DuplicateComponent {
        /// Target entity
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// The entity handle was never allocated by this scene
    #[error("{0} is not a live entity of this scene")]
    InvalidEntity(Entity),

    /// The entity id counter overflowed
    #[error("entity id space exhausted")]
    EntityIdsExhausted,

    /// A system type was registered twice
    #[error("system `{0}` is already registered")]
    SystemAlreadyRegistered(&'static str),

    /// A system type or handle was looked up but is not registered
    #[error("system `{0}` is not registered")]
    SystemNotRegistered(&'static str),

    /// Explicit system insertion position past the end of the list
    #[error("system index {index} out of range ({len} systems registered)")]
    SystemIndexOutOfRange {
        /// Requested position
        index: usize,
        /// Current number of systems
        len: usize,
    },

    /// `create_entity` was given a parent that does not exist
    #[error("parent {0} does not exist")]
    UnknownParent(Entity),

    /// Spatial subsystem failure
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}
