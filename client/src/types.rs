//! Domain types for the TicketHub client.
//!
//! Everything here is a read-side projection of remote state: identifiers
//! are remote-assigned surrogates, and the only field the client ever
//! mutates locally is a seat's `sold` flag, which moves in one direction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an event (remote-assigned surrogate)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

/// Unique identifier for a seat record (remote-assigned surrogate)
///
/// Seat *identity* for reconciliation purposes is `(event, seat number)`;
/// this id only exists because the remote store assigns one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(i64);

/// Unique identifier for a confirmed ticket (remote-assigned surrogate)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(i64);

/// Unique identifier for a user account (remote-assigned surrogate)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Wrap a raw remote identifier
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Return the raw identifier
            #[must_use]
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_id!(EventId);
impl_id!(SeatId);
impl_id!(TicketId);
impl_id!(UserId);

/// The authenticated identity, persisted across process restarts
///
/// Created on successful login; destroyed on logout. Owned by the session
/// store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Remote user identifier
    pub user_id: UserId,
    /// Display name, echoed back on booking attempts
    pub username: String,
}

/// A bookable event
///
/// Immutable from the client's perspective; never touched by push
/// notifications.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Remote identifier
    pub id: EventId,
    /// Event name
    pub name: String,
    /// Venue name
    pub venue: String,
    /// Scheduled date
    pub date: DateTime<Utc>,
}

/// A single seat within an event's seat map
///
/// `sold` is monotonic from this client's point of view: once set it never
/// reverts. The remote store is the sole arbiter of the reversal case,
/// which this client does not attempt to reconcile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    /// Remote identifier
    pub id: SeatId,
    /// Human-readable seat label, e.g. `"A1"`; the reconciliation key
    pub seat_number: String,
    /// Whether the seat has been sold
    pub sold: bool,
}

/// A confirmed reservation owned by the current session's identity
///
/// Tickets are only ever produced by re-fetching the wallet from the
/// remote store; the client never fabricates one from a booking response,
/// because only the store assigns the authoritative record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Remote identifier
    pub id: TicketId,
    /// Seat label this ticket covers
    pub seat_number: String,
    /// The event the seat belongs to, when the remote store includes it
    #[serde(default)]
    pub event: Option<Event>,
}

/// Push notification payload: a seat somewhere transitioned to sold
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatChange {
    /// Event the seat belongs to
    pub event_id: EventId,
    /// Seat label that was sold
    pub seat_number: String,
}

/// Outcome of a single booking attempt
///
/// Exactly one of these per attempt. The wire contract is a marker string
/// in the response body; decoding it into this structured type happens in
/// the HTTP provider and nowhere else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingOutcome {
    /// The remote arbiter granted the seat
    Success,
    /// The remote arbiter refused, with its human-readable reason
    Rejected {
        /// Reason string, surfaced to the user verbatim
        reason: String,
    },
    /// The attempt never reached a verdict (network failure, non-2xx)
    TransportError {
        /// Diagnostic detail, logged but not shown verbatim
        detail: String,
    },
}

impl BookingOutcome {
    /// Whether this outcome granted the seat
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn seat_decodes_from_wire_camel_case() {
        let seat: Seat = serde_json::from_str(r#"{"id":7,"seatNumber":"A1","sold":false}"#)
            .expect("seat should decode");
        assert_eq!(seat.id, SeatId::new(7));
        assert_eq!(seat.seat_number, "A1");
        assert!(!seat.sold);
    }

    #[test]
    fn ticket_tolerates_missing_event() {
        let ticket: Ticket = serde_json::from_str(r#"{"id":3,"seatNumber":"B2"}"#)
            .expect("ticket should decode");
        assert!(ticket.event.is_none());
    }

    #[test]
    fn seat_change_decodes_from_wire() {
        let change: SeatChange =
            serde_json::from_str(r#"{"eventId":1,"seatNumber":"C3"}"#).expect("should decode");
        assert_eq!(change.event_id, EventId::new(1));
        assert_eq!(change.seat_number, "C3");
    }

    #[test]
    fn ids_display_as_raw_values() {
        assert_eq!(EventId::new(42).to_string(), "42");
        assert_eq!(UserId::new(7).as_i64(), 7);
    }
}
