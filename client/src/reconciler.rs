//! The reconciler: one consistent seat/ticket view from three sources.
//!
//! The reconciler owns the canonical in-memory seat list for the currently
//! displayed event and the session's ticket list, and merges three
//! independently arriving information sources into them:
//!
//! 1. pull results from the remote store (wholesale snapshot replacement),
//! 2. push notifications broadcast for changes made by *any* client
//!    (point updates), and
//! 3. the outcome of this visitor's own booking attempts (which never
//!    update the snapshot directly - they trigger authoritative
//!    re-fetches instead).
//!
//! All merge operations are idempotent on an already-sold seat, so the
//! final snapshot converges regardless of arrival order.

use crate::types::{EventId, Seat, SeatChange, Ticket};

/// What happened to a push notification during the merge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeatChangeOutcome {
    /// The seat was found and marked sold
    Applied,
    /// The seat was already sold; the duplicate is a no-op
    AlreadySold,
    /// The notification named the tracked event but a seat the snapshot
    /// does not contain; it is dropped, not queued for replay
    UnknownSeat,
    /// The notification named a different event and was filtered out
    DifferentEvent,
}

impl SeatChangeOutcome {
    /// Whether the notification addressed the tracked event at all
    #[must_use]
    pub const fn is_routed(self) -> bool {
        !matches!(self, Self::DifferentEvent)
    }
}

/// The reconciler's state: seat snapshot plus ticket wallet
///
/// The snapshot covers at most one event at a time. Ordering invariant:
/// the exposed seat list is always sorted by seat number using plain
/// lexicographic string ordering, re-applied on every wholesale
/// replacement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcilerState {
    /// The event whose seats the snapshot mirrors
    tracked_event: Option<EventId>,
    /// The seat map snapshot, sorted by seat number
    seats: Vec<Seat>,
    /// The session's confirmed reservations
    tickets: Vec<Ticket>,
}

impl ReconcilerState {
    /// Create an empty reconciler
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tracked_event: None,
            seats: Vec::new(),
            tickets: Vec::new(),
        }
    }

    /// The event currently being tracked, if any
    #[must_use]
    pub const fn tracked_event(&self) -> Option<EventId> {
        self.tracked_event
    }

    /// Read the seat map snapshot
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Read the ticket wallet
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Start tracking a newly selected event
    ///
    /// The previous snapshot is dropped immediately rather than shown
    /// against the wrong event while the fetch for the new one is in
    /// flight.
    pub fn retarget(&mut self, event_id: EventId) {
        self.tracked_event = Some(event_id);
        self.seats.clear();
    }

    /// Merge a pull result: wholesale snapshot replacement
    ///
    /// Applies only if `event_id` still matches the tracked event;
    /// otherwise the result is discarded. This guards against a stale
    /// fetch for a previously selected event resolving after the visitor
    /// has moved on - last-writer-wins by *relevance*, not by time.
    ///
    /// Returns whether the result was applied.
    pub fn seats_fetched(&mut self, event_id: EventId, mut seats: Vec<Seat>) -> bool {
        if self.tracked_event != Some(event_id) {
            return false;
        }

        seats.sort_by(|a, b| a.seat_number.cmp(&b.seat_number));
        self.seats = seats;
        true
    }

    /// Merge a push notification: point update of one seat
    ///
    /// Marks the named seat sold when the notification addresses the
    /// tracked event and the seat exists in the snapshot. `sold` only ever
    /// moves to `true`, so replayed or duplicated notifications cannot
    /// disturb the snapshot.
    pub fn seat_change(&mut self, change: &SeatChange) -> SeatChangeOutcome {
        if self.tracked_event != Some(change.event_id) {
            return SeatChangeOutcome::DifferentEvent;
        }

        match self
            .seats
            .iter_mut()
            .find(|seat| seat.seat_number == change.seat_number)
        {
            Some(seat) if seat.sold => SeatChangeOutcome::AlreadySold,
            Some(seat) => {
                seat.sold = true;
                SeatChangeOutcome::Applied
            },
            None => SeatChangeOutcome::UnknownSeat,
        }
    }

    /// Merge a ticket pull result: wholesale wallet replacement
    pub fn tickets_fetched(&mut self, tickets: Vec<Ticket>) {
        self.tickets = tickets;
    }

    /// Drop everything (logout path)
    ///
    /// This is the only destructor; both the snapshot and the wallet are
    /// invalidated unconditionally.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
