//! Credential endpoints: login and registration.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::types::{Session, UserId};

/// Login and registration against the remote store.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidCredentials`] when the store refuses the pair
    /// - [`ClientError::RemoteUnavailable`] on transport failure
    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// Create a new account. Does not log the visitor in.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RegistrationRejected`] with the store's reason
    ///   (e.g. the username is taken)
    /// - [`ClientError::RemoteUnavailable`] on transport failure
    async fn register(&self, username: &str, password: &str) -> Result<()>;
}

/// Credentials payload for both endpoints.
#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// The user record the store returns on a successful login.
#[derive(Debug, Deserialize)]
struct UserRecord {
    id: i64,
    username: String,
}

/// Production auth client over HTTP.
#[derive(Clone, Debug)]
pub struct HttpAuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthClient {
    /// Create a client for the store at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&CredentialsBody { username, password })
            .send()
            .await
            .map_err(|e| ClientError::RemoteUnavailable {
                detail: format!("POST {url}: {e}"),
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(ClientError::InvalidCredentials),
            status if status.is_success() => {
                let record: UserRecord =
                    response.json().await.map_err(|e| ClientError::Decode {
                        detail: format!("POST {url}: {e}"),
                    })?;
                Ok(Session {
                    user_id: UserId::new(record.id),
                    username: record.username,
                })
            },
            status => Err(ClientError::RemoteUnavailable {
                detail: format!("POST {url}: {status}"),
            }),
        }
    }

    async fn register(&self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/auth/register", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&CredentialsBody { username, password })
            .send()
            .await
            .map_err(|e| ClientError::RemoteUnavailable {
                detail: format!("POST {url}: {e}"),
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => {
                let reason = response.text().await.unwrap_or_default();
                Err(ClientError::RegistrationRejected { reason })
            },
            status => Err(ClientError::RemoteUnavailable {
                detail: format!("POST {url}: {status}"),
            }),
        }
    }
}
