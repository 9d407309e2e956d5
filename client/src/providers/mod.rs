//! Provider traits and their production implementations.
//!
//! Every external dependency of the reducer sits behind a trait here:
//! the remote inventory store, the credential endpoints, and the
//! persisted session record. Production implementations talk HTTP and the
//! filesystem; the [`crate::mocks`] module provides in-memory stand-ins.

mod auth;
mod inventory;
mod session;

pub use auth::{AuthApi, HttpAuthClient};
pub use inventory::{HttpInventoryClient, InventoryApi};
pub use session::{FileSessionStore, SessionStore};
