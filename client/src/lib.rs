//! TicketHub booking client.
//!
//! An interactive client that lets a signed-in visitor browse events, view
//! a seat map, reserve a seat, and track confirmed reservations, while
//! staying consistent with a remote inventory that other visitors mutate
//! concurrently.
//!
//! Three independently arriving information sources feed one coherent
//! view:
//!
//! - pull requests against the authoritative store ([`providers`]),
//! - a push channel broadcasting every client's seat changes ([`realtime`]),
//! - the local visitor's own booking attempts.
//!
//! The [`reconciler`] merges all three; the [`navigation`] machine gates
//! what is fetched and shown; the [`reducer`] glues them together over the
//! store runtime, which serializes every transition. [`app::TicketHubClient`]
//! is the facade a presentation layer consumes.
//!
//! # Quick Start
//!
//! ```no_run
//! use tickethub_client::{AppEnvironment, Config, TicketHubClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! let env = AppEnvironment::production(&config);
//! let client = TicketHubClient::new(&config, env);
//!
//! if !client.restore_session().await? {
//!     client.login("ada", "secret").await?;
//! }
//!
//! let events = client.events().await;
//! if let Some(event) = events.first() {
//!     client.select_event(event.clone()).await?;
//!     let outcome = client.book_seat("A1").await?;
//!     println!("booking: {outcome:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod app;
pub mod config;
pub mod environment;
pub mod error;
pub mod mocks;
pub mod navigation;
pub mod providers;
pub mod realtime;
pub mod reconciler;
pub mod reducer;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use actions::AppAction;
pub use app::{AppStore, TicketHubClient};
pub use config::Config;
pub use environment::AppEnvironment;
pub use error::{ClientError, Result};
pub use navigation::{NavigationState, View};
pub use reconciler::{ReconcilerState, SeatChangeOutcome};
pub use reducer::AppReducer;
pub use state::AppState;
pub use types::{BookingOutcome, Event, EventId, Seat, SeatChange, Session, Ticket, UserId};
