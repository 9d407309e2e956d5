//! Client facade: the surface a presentation layer talks to.
//!
//! Owns the store and the push-channel handle, forwards user intents as
//! actions, and ties the channel lifecycle to the session lifecycle:
//! established on login (or restore), torn down on logout.

use std::time::Duration;

use tickethub_runtime::Store;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::actions::AppAction;
use crate::config::Config;
use crate::environment::AppEnvironment;
use crate::error::{ClientError, Result};
use crate::navigation::View;
use crate::realtime::{self, RealtimeHandle};
use crate::reducer::AppReducer;
use crate::state::AppState;
use crate::types::{BookingOutcome, Event, Seat, Session, Ticket};

/// The concrete store type for the booking client.
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// How long the facade waits for an intent to resolve to feedback.
///
/// This bounds the wait on the local feedback loop, not the remote call:
/// a hung request manifests as a timeout here and a stale snapshot, never
/// a crash.
const RESOLUTION_TIMEOUT: Duration = Duration::from_secs(30);

/// The booking client.
///
/// All methods take `&self`; state lives in the store and transitions are
/// serialized there.
pub struct TicketHubClient {
    store: AppStore,
    ws_url: String,
    realtime: Mutex<Option<RealtimeHandle>>,
}

impl TicketHubClient {
    /// Assemble a client from configuration and an environment.
    #[must_use]
    pub fn new(config: &Config, env: AppEnvironment) -> Self {
        Self {
            store: Store::new(AppState::new(), AppReducer::new(), env),
            ws_url: config.ws_url.clone(),
            realtime: Mutex::new(None),
        }
    }

    /// Try to resume the persisted session.
    ///
    /// Returns whether a session was restored; on success the push channel
    /// is established and the event list fetch is already under way.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store refuses the action (shutdown).
    pub async fn restore_session(&self) -> Result<bool> {
        let mut handle = self.store.send(AppAction::RestoreSession).await?;
        handle.wait().await;

        if self.store.state(AppState::is_authenticated).await {
            self.connect_realtime().await;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Log in and establish the push channel.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthRejected`] when the store refuses the credentials
    /// - [`ClientError::Store`] on local feedback timeout or shutdown
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let outcome = self
            .store
            .send_and_wait_for(
                AppAction::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                |a| matches!(a, AppAction::LoggedIn { .. } | AppAction::AuthFailed { .. }),
                RESOLUTION_TIMEOUT,
            )
            .await?;

        match outcome {
            AppAction::LoggedIn { session } => {
                self.connect_realtime().await;
                Ok(session)
            },
            AppAction::AuthFailed { reason } => Err(ClientError::AuthRejected { reason }),
            other => {
                debug!(?other, "Unexpected login resolution");
                Err(ClientError::AuthRejected {
                    reason: "Unexpected authentication outcome".to_string(),
                })
            },
        }
    }

    /// Register a new account. The visitor logs in separately afterwards.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthRejected`] with the store's reason
    /// - [`ClientError::Store`] on local feedback timeout or shutdown
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let outcome = self
            .store
            .send_and_wait_for(
                AppAction::Register {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                |a| matches!(a, AppAction::Registered | AppAction::AuthFailed { .. }),
                RESOLUTION_TIMEOUT,
            )
            .await?;

        match outcome {
            AppAction::Registered => Ok(()),
            AppAction::AuthFailed { reason } => Err(ClientError::AuthRejected { reason }),
            other => {
                debug!(?other, "Unexpected registration resolution");
                Err(ClientError::AuthRejected {
                    reason: "Unexpected registration outcome".to_string(),
                })
            },
        }
    }

    /// End the session: clear state and the persisted record, then tear
    /// the push channel down.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store refuses the action (shutdown).
    pub async fn logout(&self) -> Result<()> {
        let mut handle = self.store.send(AppAction::Logout).await?;
        handle.wait().await;

        if let Some(handle) = self.realtime.lock().await.take() {
            handle.close();
        }
        Ok(())
    }

    /// Select an event: enters its stage and fetches its seat map.
    ///
    /// A dropped push channel is re-established here - channel recovery is
    /// driven by session and selection changes, never by an autonomous
    /// retry loop.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store refuses the action (shutdown).
    pub async fn select_event(&self, event: Event) -> Result<()> {
        self.store.send(AppAction::SelectEvent { event }).await?;

        if !self.realtime_active().await && self.session().await.is_some() {
            self.connect_realtime().await;
        }
        Ok(())
    }

    /// Switch views; entering the wallet re-fetches tickets.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store refuses the action (shutdown).
    pub async fn navigate(&self, view: View) -> Result<()> {
        self.store.send(AppAction::Navigate { view }).await?;
        Ok(())
    }

    /// Re-fetch the event list.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store refuses the action (shutdown).
    pub async fn refresh_events(&self) -> Result<()> {
        self.store.send(AppAction::RefreshEvents).await?;
        Ok(())
    }

    /// Attempt to book a seat and wait for the verdict.
    ///
    /// Intents refused before reaching the store (no session, not on a
    /// stage, another attempt in flight) resolve as [`BookingOutcome::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] on local feedback timeout or shutdown.
    pub async fn book_seat(&self, seat_number: &str) -> Result<BookingOutcome> {
        let wanted = seat_number.to_string();
        let outcome = self
            .store
            .send_and_wait_for(
                AppAction::BookSeat {
                    seat_number: seat_number.to_string(),
                },
                move |a| {
                    matches!(
                        a,
                        AppAction::BookingResolved { seat_number, .. }
                            | AppAction::BookingIgnored { seat_number, .. }
                            if *seat_number == wanted
                    )
                },
                RESOLUTION_TIMEOUT,
            )
            .await?;

        match outcome {
            AppAction::BookingResolved { outcome, .. } => Ok(outcome),
            AppAction::BookingIgnored { reason, .. } => {
                Ok(BookingOutcome::Rejected { reason })
            },
            other => {
                debug!(?other, "Unexpected booking resolution");
                Ok(BookingOutcome::TransportError {
                    detail: "Unexpected booking resolution".to_string(),
                })
            },
        }
    }

    /// Whether the push channel is currently up.
    pub async fn realtime_active(&self) -> bool {
        self.realtime
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Current session snapshot.
    pub async fn session(&self) -> Option<Session> {
        self.store.state(|s| s.session.clone()).await
    }

    /// Current event list snapshot.
    pub async fn events(&self) -> Vec<Event> {
        self.store.state(|s| s.events.clone()).await
    }

    /// Current seat map snapshot, sorted by seat number.
    pub async fn seats(&self) -> Vec<Seat> {
        self.store.state(|s| s.reconciler.seats().to_vec()).await
    }

    /// Current ticket wallet snapshot.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.store.state(|s| s.reconciler.tickets().to_vec()).await
    }

    /// Current view.
    pub async fn view(&self) -> View {
        self.store.state(|s| s.navigation.view).await
    }

    /// Latest user-visible status line.
    pub async fn notice(&self) -> Option<String> {
        self.store.state(|s| s.notice.clone()).await
    }

    /// Direct access to the store, for tests and embedding hosts.
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Gracefully shut the store down.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] when pending effects outlive the
    /// timeout.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        if let Some(handle) = self.realtime.lock().await.take() {
            handle.close();
        }
        self.store.shutdown(timeout).await?;
        Ok(())
    }

    /// Establish the push channel, replacing any previous one.
    ///
    /// Channel failure is not fatal: the pull endpoints remain the
    /// correctness backstop, so the client degrades to pull-only.
    async fn connect_realtime(&self) {
        let mut slot = self.realtime.lock().await;
        if let Some(existing) = slot.take() {
            existing.close();
        }

        match realtime::connect(&self.ws_url, self.store.clone()).await {
            Ok(handle) => *slot = Some(handle),
            Err(error) => {
                warn!(%error, "Push channel unavailable; relying on pull refreshes");
            },
        }
    }
}
