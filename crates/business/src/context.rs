//! Service context - shared store handle and configuration

use crate::config::PlatformConfig;
use careswap_persistence::Store;
use std::sync::Arc;

/// Context for business operations
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn Store>,
    config: PlatformConfig,
}

impl ServiceContext {
    /// Create a context over `store` with the default configuration
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            config: PlatformConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PlatformConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
