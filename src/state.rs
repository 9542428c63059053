//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::ServiceConfig;

/// Shared application state, cloneable across handlers via an Arc-wrapped config.
///
/// The configuration is resolved once at startup and never mutated, so
/// concurrent requests can read it without coordination.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    /// Creates a new application state from the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
