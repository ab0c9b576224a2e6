//! Application state management.

use crate::config::ServerConfig;
use guess_commit_core::SessionRegistry;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    registry: Arc<SessionRegistry>,
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Shared handle for background tasks
    pub fn registry_handle(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
