//! Mock session store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::Result;
use crate::providers::SessionStore;
use crate::types::Session;

/// Mock session store holding the record in memory.
#[derive(Clone, Debug, Default)]
pub struct MockSessionStore {
    record: Arc<Mutex<Option<Session>>>,
}

impl MockSessionStore {
    /// Create a store with no persisted record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a record, as if a previous process
    /// had logged in.
    #[must_use]
    pub fn with_record(session: Session) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(session))),
        }
    }

    /// Inspect the current record (for assertions).
    #[must_use]
    pub fn record(&self) -> Option<Session> {
        self.record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.record())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self
            .record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self
            .record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}
