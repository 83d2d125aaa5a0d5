//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Panics inside `env_logger` if a logger is already installed; use
/// [`try_init`] from tests.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, ignoring an already-installed logger
pub fn try_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
