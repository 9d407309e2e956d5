//! Error types for the TicketHub client.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error taxonomy for the booking client.
///
/// Read failures (`RemoteUnavailable`) are recovered locally: callers keep
/// whatever data they already had and log the failure. Booking attempts
/// never surface here at all - every attempt resolves to a
/// [`crate::types::BookingOutcome`], including the transport-failure case,
/// because the user's intent must never be dropped into an error path.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A read against the remote store failed (transport or non-2xx).
    ///
    /// Recovered locally: prior data is retained and the failure is logged.
    #[error("Remote inventory unavailable: {detail}")]
    RemoteUnavailable {
        /// Diagnostic detail
        detail: String,
    },

    /// Login refused by the remote store.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Registration refused by the remote store.
    #[error("Registration rejected: {reason}")]
    RegistrationRejected {
        /// The remote store's reason string
        reason: String,
    },

    /// An authentication intent resolved to a refusal.
    ///
    /// Produced at the facade boundary when a login or registration
    /// feedback action carries a refusal.
    #[error("Authentication failed: {reason}")]
    AuthRejected {
        /// User-facing reason
        reason: String,
    },

    /// A remote payload could not be decoded.
    #[error("Failed to decode remote payload: {detail}")]
    Decode {
        /// Diagnostic detail
        detail: String,
    },

    /// The persisted session record could not be read or written.
    #[error("Session persistence failed: {detail}")]
    SessionPersistence {
        /// Diagnostic detail
        detail: String,
    },

    /// The push channel could not be established.
    #[error("Realtime channel error: {detail}")]
    Realtime {
        /// Diagnostic detail
        detail: String,
    },

    /// The underlying store refused or timed out on an action.
    #[error("Store error: {0}")]
    Store(#[from] tickethub_runtime::StoreError),
}
