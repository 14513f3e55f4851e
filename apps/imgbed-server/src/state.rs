//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::objects::DeletePolicy;
use crate::storage::ObjectStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the object store
    pub fn store(&self) -> &dyn ObjectStore {
        self.inner.store.as_ref()
    }

    /// Delete policy selected by `STRICT_DELETE`
    pub fn delete_policy(&self) -> DeletePolicy {
        DeletePolicy::from_strict(self.inner.config.auth.strict_delete)
    }
}
