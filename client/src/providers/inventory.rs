//! Remote inventory store client.
//!
//! Pull endpoints for events, seats and tickets, plus the single write
//! operation: a booking attempt. Conflict resolution authority rests
//! entirely with the remote store; this client only reports what it said.

use async_trait::async_trait;

use crate::error::{ClientError, Result};
use crate::types::{BookingOutcome, Event, EventId, Seat, Ticket, UserId};

/// Marker the remote store embeds in the body of a granted booking.
///
/// The wire contract is "body contains the marker"; everything else in a
/// 2xx response is a refusal with the body as the human-readable reason.
/// That sniffing lives here and nowhere else - the rest of the client
/// only sees [`BookingOutcome`].
const BOOKING_SUCCESS_MARKER: &str = "SUCCESS";

/// Read and write operations against the remote inventory store.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Fetch the full event list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RemoteUnavailable`] on transport failure or a
    /// non-2xx response. Callers keep their prior list.
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// Fetch the seat list for one event, sorted by seat number.
    ///
    /// The sort is this client's responsibility even if the remote result
    /// is unordered.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RemoteUnavailable`] on transport failure or a
    /// non-2xx response.
    async fn list_seats(&self, event_id: EventId) -> Result<Vec<Seat>>;

    /// Fetch the visitor's confirmed reservations.
    ///
    /// A visitor with no reservations gets an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RemoteUnavailable`] on transport failure or a
    /// non-2xx response.
    async fn list_my_tickets(&self, user_id: UserId) -> Result<Vec<Ticket>>;

    /// Attempt to book one seat. The only write operation.
    ///
    /// Every attempt resolves to exactly one [`BookingOutcome`]; transport
    /// failures are an outcome, not an error, because the user's intent
    /// must never be silently dropped.
    async fn book_seat(
        &self,
        event_id: EventId,
        seat_number: &str,
        user_id: UserId,
        username: &str,
    ) -> BookingOutcome;
}

/// Production inventory client over HTTP.
#[derive(Clone, Debug)]
pub struct HttpInventoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInventoryClient {
    /// Create a client for the store at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T> {
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::RemoteUnavailable {
                detail: format!("GET {url}: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::RemoteUnavailable {
                detail: format!("GET {url}: {status}"),
            });
        }

        response.json().await.map_err(|e| ClientError::Decode {
            detail: format!("GET {url}: {e}"),
        })
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryClient {
    async fn list_events(&self) -> Result<Vec<Event>> {
        self.get_json(format!("{}/events", self.base_url)).await
    }

    async fn list_seats(&self, event_id: EventId) -> Result<Vec<Seat>> {
        let mut seats: Vec<Seat> = self
            .get_json(format!("{}/tickets?eventId={event_id}", self.base_url))
            .await?;
        seats.sort_by(|a, b| a.seat_number.cmp(&b.seat_number));
        Ok(seats)
    }

    async fn list_my_tickets(&self, user_id: UserId) -> Result<Vec<Ticket>> {
        self.get_json(format!(
            "{}/tickets/my-tickets?userId={user_id}",
            self.base_url
        ))
        .await
    }

    async fn book_seat(
        &self,
        event_id: EventId,
        seat_number: &str,
        user_id: UserId,
        username: &str,
    ) -> BookingOutcome {
        // The store binds request parameters, not a JSON body.
        let url = format!("{}/tickets/book", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[
                ("seatNumber", seat_number),
                ("eventId", &event_id.to_string()),
                ("user", username),
                ("userId", &user_id.to_string()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return BookingOutcome::TransportError {
                    detail: format!("POST {url}: {e}"),
                };
            },
        };

        let status = response.status();
        if !status.is_success() {
            return BookingOutcome::TransportError {
                detail: format!("POST {url}: {status}"),
            };
        }

        match response.text().await {
            Ok(body) if body.contains(BOOKING_SUCCESS_MARKER) => BookingOutcome::Success,
            Ok(body) => BookingOutcome::Rejected { reason: body },
            Err(e) => BookingOutcome::TransportError {
                detail: format!("POST {url}: {e}"),
            },
        }
    }
}
