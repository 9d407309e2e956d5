//! Environment dependencies for the application reducer.

use std::sync::Arc;

use tickethub_core::environment::Clock;

use crate::config::Config;
use crate::providers::{
    AuthApi, FileSessionStore, HttpAuthClient, HttpInventoryClient, InventoryApi, SessionStore,
};

/// Injected dependencies for the application reducer.
///
/// Dependencies are trait objects behind `Arc` so effects can clone them
/// into spawned futures. Production wiring talks HTTP and the filesystem;
/// tests inject the in-memory providers from [`crate::mocks`].
#[derive(Clone)]
pub struct AppEnvironment {
    inventory: Arc<dyn InventoryApi>,
    auth: Arc<dyn AuthApi>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl AppEnvironment {
    /// Assemble an environment from explicit providers.
    #[must_use]
    pub fn new(
        inventory: Arc<dyn InventoryApi>,
        auth: Arc<dyn AuthApi>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inventory,
            auth,
            sessions,
            clock,
        }
    }

    /// Assemble the production environment from configuration.
    #[must_use]
    pub fn production(config: &Config) -> Self {
        Self::new(
            Arc::new(HttpInventoryClient::new(config.api_url.clone())),
            Arc::new(HttpAuthClient::new(config.api_url.clone())),
            Arc::new(FileSessionStore::new(config.session_file.clone())),
            Arc::new(tickethub_core::environment::SystemClock),
        )
    }

    /// The remote inventory store.
    #[must_use]
    pub fn inventory(&self) -> Arc<dyn InventoryApi> {
        Arc::clone(&self.inventory)
    }

    /// The credential endpoints.
    #[must_use]
    pub fn auth(&self) -> Arc<dyn AuthApi> {
        Arc::clone(&self.auth)
    }

    /// The persisted session record.
    #[must_use]
    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// The clock.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}
