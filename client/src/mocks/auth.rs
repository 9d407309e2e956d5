//! Mock credential endpoints.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ClientError, Result};
use crate::providers::AuthApi;
use crate::types::{Session, UserId};

#[derive(Debug, Default)]
struct Inner {
    /// username → (password, user id)
    accounts: HashMap<String, (String, UserId)>,
    next_user_id: i64,
}

/// Mock credential store.
#[derive(Clone, Debug, Default)]
pub struct MockAuthApi {
    inner: Arc<Mutex<Inner>>,
}

impl MockAuthApi {
    /// Create an empty mock with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock pre-seeded with one account.
    #[must_use]
    pub fn with_account(self, username: &str, password: &str) -> Self {
        {
            let mut inner = self.lock();
            inner.next_user_id += 1;
            let id = UserId::new(inner.next_user_id);
            inner
                .accounts
                .insert(username.to_string(), (password.to_string(), id));
        }
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let inner = self.lock();
        match inner.accounts.get(username) {
            Some((stored, id)) if stored == password => Ok(Session {
                user_id: *id,
                username: username.to_string(),
            }),
            _ => Err(ClientError::InvalidCredentials),
        }
    }

    async fn register(&self, username: &str, password: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.accounts.contains_key(username) {
            return Err(ClientError::RegistrationRejected {
                reason: "Error: Username is already taken!".to_string(),
            });
        }

        inner.next_user_id += 1;
        let id = UserId::new(inner.next_user_id);
        inner
            .accounts
            .insert(username.to_string(), (password.to_string(), id));
        Ok(())
    }
}
