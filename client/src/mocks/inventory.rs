//! Mock inventory store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ClientError, Result};
use crate::providers::InventoryApi;
use crate::types::{BookingOutcome, Event, EventId, Seat, Ticket, TicketId, UserId};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<Event>,
    seats: HashMap<EventId, Vec<Seat>>,
    tickets: HashMap<UserId, Vec<Ticket>>,
    next_ticket_id: i64,
    fail_reads: bool,
    event_fetches: usize,
    seat_fetches: usize,
    ticket_fetches: usize,
}

/// Mock inventory store.
///
/// Holds events, seats and tickets in memory and arbitrates bookings
/// atomically per seat, like the real store: the first attempt wins, every
/// later one is rejected with the store's reason string.
#[derive(Clone, Debug, Default)]
pub struct MockInventoryApi {
    inner: Arc<Mutex<Inner>>,
}

impl MockInventoryApi {
    /// Create an empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seed the event list.
    #[must_use]
    pub fn with_events(self, events: Vec<Event>) -> Self {
        self.lock().events = events;
        self
    }

    /// Seed the seat list for one event.
    #[must_use]
    pub fn with_seats(self, event_id: EventId, seats: Vec<Seat>) -> Self {
        self.lock().seats.insert(event_id, seats);
        self
    }

    /// Make every read fail with `RemoteUnavailable` until turned off.
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Number of event-list pulls served so far.
    #[must_use]
    pub fn event_fetches(&self) -> usize {
        self.lock().event_fetches
    }

    /// Number of seat-list pulls served so far.
    #[must_use]
    pub fn seat_fetches(&self) -> usize {
        self.lock().seat_fetches
    }

    /// Number of ticket pulls served so far.
    #[must_use]
    pub fn ticket_fetches(&self) -> usize {
        self.lock().ticket_fetches
    }

    /// Mark a seat sold out-of-band, as if another client had booked it.
    ///
    /// Returns the corresponding change notification payload.
    pub fn sell_externally(
        &self,
        event_id: EventId,
        seat_number: &str,
    ) -> crate::types::SeatChange {
        let mut inner = self.lock();
        if let Some(seat) = inner
            .seats
            .get_mut(&event_id)
            .and_then(|seats| seats.iter_mut().find(|s| s.seat_number == seat_number))
        {
            seat.sold = true;
        }
        crate::types::SeatChange {
            event_id,
            seat_number: seat_number.to_string(),
        }
    }

    fn read_guard(inner: &Inner, what: &str) -> Result<()> {
        if inner.fail_reads {
            return Err(ClientError::RemoteUnavailable {
                detail: format!("mock read failure: {what}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryApi for MockInventoryApi {
    async fn list_events(&self) -> Result<Vec<Event>> {
        let mut inner = self.lock();
        inner.event_fetches += 1;
        Self::read_guard(&inner, "events")?;
        Ok(inner.events.clone())
    }

    async fn list_seats(&self, event_id: EventId) -> Result<Vec<Seat>> {
        let mut inner = self.lock();
        inner.seat_fetches += 1;
        Self::read_guard(&inner, "seats")?;
        let mut seats = inner.seats.get(&event_id).cloned().unwrap_or_default();
        seats.sort_by(|a, b| a.seat_number.cmp(&b.seat_number));
        Ok(seats)
    }

    async fn list_my_tickets(&self, user_id: UserId) -> Result<Vec<Ticket>> {
        let mut inner = self.lock();
        inner.ticket_fetches += 1;
        Self::read_guard(&inner, "tickets")?;
        Ok(inner.tickets.get(&user_id).cloned().unwrap_or_default())
    }

    async fn book_seat(
        &self,
        event_id: EventId,
        seat_number: &str,
        user_id: UserId,
        _username: &str,
    ) -> BookingOutcome {
        let mut inner = self.lock();

        let event = inner.events.iter().find(|e| e.id == event_id).cloned();

        let Some(seat) = inner
            .seats
            .get_mut(&event_id)
            .and_then(|seats| seats.iter_mut().find(|s| s.seat_number == seat_number))
        else {
            return BookingOutcome::Rejected {
                reason: format!("Seat {seat_number} not found for event {event_id}."),
            };
        };

        if seat.sold {
            return BookingOutcome::Rejected {
                reason: format!("Seat {seat_number} is already taken."),
            };
        }

        seat.sold = true;

        inner.next_ticket_id += 1;
        let ticket = Ticket {
            id: TicketId::new(inner.next_ticket_id),
            seat_number: seat_number.to_string(),
            event,
        };
        inner.tickets.entry(user_id).or_default().push(ticket);

        BookingOutcome::Success
    }
}
