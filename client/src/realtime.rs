//! Realtime subscriber: the push channel.
//!
//! Maintains exactly one websocket subscription per active session. The
//! channel carries seat-change notifications for *all* events (the server
//! does not scope topics per event); filtering by event happens in the
//! reconciler. Inbound frames are decoded and forwarded verbatim into the
//! store, where they serialize behind every other transition.
//!
//! There is no autonomous reconnect: on error or close the read loop ends
//! with a warning, and the next login (or event selection after a
//! re-login) establishes a fresh channel. The pull endpoints remain the
//! correctness backstop either way.

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::actions::AppAction;
use crate::app::AppStore;
use crate::error::{ClientError, Result};
use crate::types::SeatChange;

/// Topic carrying seat-change notifications.
pub const SEAT_TOPIC: &str = "seats";

/// Server → client frames on the push channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FeedFrame {
    /// Subscription confirmed for the listed topics
    Subscribed { topics: Vec<String> },
    /// A topic event; for the seat topic the payload is a [`SeatChange`]
    Event { topic: String, change: SeatChange },
    /// Anything this client does not understand
    #[serde(other)]
    Unknown,
}

/// Handle on the active push channel.
///
/// Closing (or dropping) the handle tears the read loop down. The facade
/// closes it on logout: an orphaned open channel after logout is a defect,
/// not a degraded mode.
#[derive(Debug)]
pub struct RealtimeHandle {
    task: JoinHandle<()>,
}

impl RealtimeHandle {
    /// Tear the channel down.
    pub fn close(&self) {
        self.task.abort();
    }

    /// Whether the read loop has ended (closed, errored, or torn down).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RealtimeHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Establish the push channel and subscribe to the seat topic.
///
/// Dispatches [`AppAction::RealtimeConnected`] once when the server
/// confirms the subscription, then forwards each decoded notification as
/// [`AppAction::SeatChangeNotified`]. Malformed or unroutable frames are
/// dropped with a debug log - the pull-based re-fetch is the correctness
/// backstop.
///
/// # Errors
///
/// Returns [`ClientError::Realtime`] when the websocket cannot be
/// established or the subscribe frame cannot be sent.
pub async fn connect(ws_url: &str, store: AppStore) -> Result<RealtimeHandle> {
    let (stream, _) = connect_async(ws_url)
        .await
        .map_err(|e| ClientError::Realtime {
            detail: format!("connect {ws_url}: {e}"),
        })?;

    let (mut sink, mut read) = stream.split();

    let subscribe = serde_json::json!({ "type": "subscribe", "topics": [SEAT_TOPIC] });
    sink.send(Message::Text(subscribe.to_string()))
        .await
        .map_err(|e| ClientError::Realtime {
            detail: format!("subscribe {ws_url}: {e}"),
        })?;

    debug!(url = ws_url, topic = SEAT_TOPIC, "Push channel subscribing");

    let task = tokio::spawn(async move {
        let mut announced = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<FeedFrame>(&text) {
                    Ok(FeedFrame::Subscribed { topics }) => {
                        if !announced && topics.iter().any(|t| t == SEAT_TOPIC) {
                            announced = true;
                            if store.send(AppAction::RealtimeConnected).await.is_err() {
                                break;
                            }
                        }
                    },
                    Ok(FeedFrame::Event { topic, change }) if topic == SEAT_TOPIC => {
                        if store
                            .send(AppAction::SeatChangeNotified { change })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    },
                    Ok(FeedFrame::Event { topic, .. }) => {
                        debug!(topic, "Dropping event for an unsubscribed topic");
                    },
                    Ok(FeedFrame::Unknown) => {
                        debug!("Dropping unrecognized push frame");
                    },
                    Err(error) => {
                        debug!(%error, "Dropping malformed push frame");
                    },
                },
                Ok(Message::Ping(payload)) => {
                    let _ = sink.send(Message::Pong(payload)).await;
                },
                Ok(Message::Close(_)) => {
                    info!("Push channel closed by the server");
                    break;
                },
                Ok(_) => {}, // binary and pong frames carry nothing for us
                Err(error) => {
                    warn!(%error, "Push channel read failed; no automatic reconnect");
                    break;
                },
            }
        }
    });

    Ok(RealtimeHandle { task })
}
