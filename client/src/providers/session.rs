//! Persisted session record.
//!
//! One record holding the authenticated session, surviving process
//! restarts, explicitly invalidated on logout.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{ClientError, Result};
use crate::types::Session;

/// Storage for the one persisted session record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted record, if one exists.
    ///
    /// A missing record is `None`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionPersistence`] when the record exists
    /// but cannot be read or decoded.
    async fn load(&self) -> Result<Option<Session>>;

    /// Persist the record, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionPersistence`] when the record cannot
    /// be written.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove the record. Missing records are fine.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionPersistence`] when an existing record
    /// cannot be removed.
    async fn clear(&self) -> Result<()>;
}

/// Session store backed by a JSON file.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn persistence_error(&self, action: &str, e: impl std::fmt::Display) -> ClientError {
        ClientError::SessionPersistence {
            detail: format!("{action} {}: {e}", self.path.display()),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let session = serde_json::from_slice(&bytes)
                    .map_err(|e| self.persistence_error("decode", e))?;
                Ok(Some(session))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.persistence_error("read", e)),
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.persistence_error("create dir for", e))?;
        }

        let bytes = serde_json::to_vec_pretty(session)
            .map_err(|e| self.persistence_error("encode", e))?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| self.persistence_error("write", e))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.persistence_error("remove", e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::types::UserId;

    fn session() -> Session {
        Session {
            user_id: UserId::new(17),
            username: "ada".to_string(),
        }
    }

    #[tokio::test]
    async fn load_on_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        store.save(&session()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(session()));
    }

    #[tokio::test]
    async fn clear_removes_the_record_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store.save(&session()).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error_not_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"not json").await.unwrap();
        let store = FileSessionStore::new(path);

        assert!(store.load().await.is_err());
    }
}
