//! Top-level application state.

use crate::navigation::NavigationState;
use crate::reconciler::ReconcilerState;
use crate::types::{Event, Session};

/// The whole client state: session, navigation, and the reconciled
/// seat/ticket view, plus the event-list cache and transient UI fields.
///
/// There is no ambient "current user" anywhere else - the session lives
/// here and is threaded into every collaborator, so tests can run several
/// clients side by side.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// The authenticated identity, if any
    pub session: Option<Session>,
    /// Which screen is active and which event is selected
    pub navigation: NavigationState,
    /// The merged seat snapshot and ticket wallet
    pub reconciler: ReconcilerState,
    /// Cached remote event list; never touched by push notifications
    pub events: Vec<Event>,
    /// Seat label of the booking attempt currently in flight, if any
    pub booking_in_flight: Option<String>,
    /// Latest user-visible status line (booking results, warnings)
    pub notice: Option<String>,
    /// Whether the push channel has completed its subscription handshake
    pub realtime_connected: bool,
}

impl AppState {
    /// Create the initial, unauthenticated state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is active
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Set a user-visible status line
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_unauthenticated_and_empty() {
        let state = AppState::new();
        assert!(!state.is_authenticated());
        assert!(state.events.is_empty());
        assert!(state.reconciler.seats().is_empty());
        assert!(state.notice.is_none());
    }
}
