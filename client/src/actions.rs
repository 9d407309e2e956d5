//! Actions for the booking client.
//!
//! One enum covers both user intents (forwarded by the presentation layer)
//! and feedback produced by effects: fetch results, booking resolutions,
//! and decoded push notifications. Every state transition in the client is
//! one of these flowing through the reducer.

use crate::types::{BookingOutcome, Event, EventId, Seat, SeatChange, Session, Ticket};
use crate::navigation::View;

/// All inputs to the application reducer.
#[derive(Clone, Debug)]
pub enum AppAction {
    // ========== User intents ==========
    /// Load the persisted session record, if one exists.
    ///
    /// Sent once at startup. A missing record produces no feedback; a
    /// found one continues like a login, minus re-persisting the record.
    RestoreSession,

    /// Log in with credentials.
    Login {
        /// Account name
        username: String,
        /// Account password
        password: String,
    },

    /// Register a new account.
    ///
    /// Registration does not log the visitor in; the original flow asks
    /// them to log in afterwards.
    Register {
        /// Account name
        username: String,
        /// Account password
        password: String,
    },

    /// End the session: clear all per-session state and the persisted
    /// record.
    Logout,

    /// Re-fetch the event list.
    RefreshEvents,

    /// Select an event and enter its stage; triggers a seat fetch.
    SelectEvent {
        /// The chosen event
        event: Event,
    },

    /// Switch views without changing the selection.
    Navigate {
        /// The requested view
        view: View,
    },

    /// Attempt to book a seat on the currently staged event.
    BookSeat {
        /// Seat label, e.g. `"A1"`
        seat_number: String,
    },

    // ========== Feedback from effects ==========
    /// A persisted session record was found at startup.
    SessionRestored {
        /// The restored identity
        session: Session,
    },

    /// Login succeeded.
    LoggedIn {
        /// The authenticated identity
        session: Session,
    },

    /// Registration succeeded; the visitor should now log in.
    Registered,

    /// Login or registration was refused.
    AuthFailed {
        /// User-facing reason
        reason: String,
    },

    /// The event list arrived.
    EventsFetched {
        /// Current remote event list
        events: Vec<Event>,
    },

    /// The event list fetch failed; the prior list stays on display.
    EventsFetchFailed {
        /// Diagnostic detail
        detail: String,
    },

    /// A seat list arrived for some event.
    ///
    /// The reconciler decides relevance: results for an event that is no
    /// longer selected are discarded.
    SeatsFetched {
        /// The event the fetch was issued for
        event_id: EventId,
        /// The fetched seats
        seats: Vec<Seat>,
    },

    /// A seat list fetch failed; the prior snapshot stays on display.
    SeatsFetchFailed {
        /// The event the fetch was issued for
        event_id: EventId,
        /// Diagnostic detail
        detail: String,
    },

    /// The ticket wallet arrived.
    TicketsFetched {
        /// The visitor's confirmed reservations
        tickets: Vec<Ticket>,
    },

    /// The ticket wallet fetch failed; the prior wallet stays on display.
    TicketsFetchFailed {
        /// Diagnostic detail
        detail: String,
    },

    /// A booking attempt resolved to exactly one outcome.
    BookingResolved {
        /// The seat the attempt was for
        seat_number: String,
        /// The attempt's verdict
        outcome: BookingOutcome,
    },

    /// A booking intent was refused before reaching the remote store
    /// (no session, not on a stage, or another attempt in flight).
    BookingIgnored {
        /// The seat the intent named
        seat_number: String,
        /// User-facing reason
        reason: String,
    },

    /// A decoded push notification: some client bought a seat.
    SeatChangeNotified {
        /// The seat that transitioned to sold
        change: SeatChange,
    },

    /// The push channel finished its subscription handshake.
    RealtimeConnected,
}
