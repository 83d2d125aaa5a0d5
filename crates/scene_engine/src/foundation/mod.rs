//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Opaque resource handles
//! - Logging utilities

pub mod math;
pub mod handle;
pub mod logging;
