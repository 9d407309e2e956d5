//! Configuration management for the TicketHub client.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote inventory store's REST endpoints
    pub api_url: String,
    /// URL of the push-channel websocket endpoint
    pub ws_url: String,
    /// Path of the persisted session record
    pub session_file: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Recognized variables:
    /// - `TICKETHUB_API_URL` (default `http://localhost:8080`)
    /// - `TICKETHUB_WS_URL` (default `ws://localhost:8080/ws`)
    /// - `TICKETHUB_SESSION_FILE` (default: platform config dir)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("TICKETHUB_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            ws_url: env::var("TICKETHUB_WS_URL")
                .unwrap_or_else(|_| "ws://localhost:8080/ws".to_string()),
            session_file: env::var_os("TICKETHUB_SESSION_FILE")
                .map_or_else(default_session_file, PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Platform default for the persisted session record.
///
/// Falls back to the working directory when the platform reports no config
/// directory (e.g. stripped-down containers).
fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tickethub")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        // Only assert on variables this test does not control when they are
        // absent, so a developer's .env cannot break the suite.
        if env::var("TICKETHUB_API_URL").is_err() && env::var("TICKETHUB_WS_URL").is_err() {
            let config = Config::from_env();
            assert_eq!(config.api_url, "http://localhost:8080");
            assert_eq!(config.ws_url, "ws://localhost:8080/ws");
        }
    }

    #[test]
    fn session_file_has_a_file_name() {
        let config = Config::from_env();
        assert!(config.session_file.file_name().is_some());
    }
}
