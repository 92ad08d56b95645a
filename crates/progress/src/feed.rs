//! WebSocket feed of lifecycle events from the queue manager.
//!
//! Connects to the queue manager's `/ws` endpoint, parses text frames
//! into [`LifecycleEvent`]s, and forwards them to a broadcast channel
//! for the consumer. The connection is re-established with exponential
//! backoff whenever it drops, until the cancellation token fires.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::messages::{parse_event, LifecycleEvent};

/// Broadcast channel capacity for lifecycle events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Tunable parameters for the reconnect backoff strategy.
pub struct BackoffConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay, clamped to
/// [`BackoffConfig::max_delay`].
pub fn next_delay(current: Duration, config: &BackoffConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Errors from the feed connection layer.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Lifecycle event source over WebSocket.
pub struct EventFeed {
    ws_url: String,
}

impl EventFeed {
    /// * `ws_url` - WebSocket base URL, e.g. `ws://queue-manager:3000`.
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }

    /// Create the shared event channel feed and consumer communicate
    /// over.
    pub fn channel() -> (
        broadcast::Sender<LifecycleEvent>,
        broadcast::Receiver<LifecycleEvent>,
    ) {
        broadcast::channel(EVENT_CHANNEL_CAPACITY)
    }

    /// Run until cancelled: connect, pump frames, reconnect on drop.
    pub async fn run(self, events: broadcast::Sender<LifecycleEvent>, cancel: CancellationToken) {
        let backoff = BackoffConfig::default();

        loop {
            let stream = match self.connect().await {
                Ok(stream) => stream,
                Err(error) => {
                    tracing::warn!(%error, "Feed connection failed, entering reconnect loop");
                    match self.reconnect(&backoff, &cancel).await {
                        Some(stream) => stream,
                        None => return, // cancelled
                    }
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = pump(stream, &events) => {}
            }

            if cancel.is_cancelled() {
                return;
            }
            tracing::info!("Feed connection lost, reconnecting");
            if self.reconnect(&backoff, &cancel).await.is_none() {
                return; // cancelled
            }
        }
    }

    /// Connect to the queue manager's WebSocket endpoint.
    ///
    /// A fresh client id (UUID v4) is appended so the queue manager can
    /// address messages back to this client.
    async fn connect(&self) -> Result<WsStream, FeedError> {
        let client_id = uuid::Uuid::new_v4().to_string();
        let url = format!("{}/ws?clientId={}", self.ws_url, client_id);

        let (stream, _response) = connect_async(&url).await.map_err(|e| {
            FeedError::Connection(format!("Failed to connect to {}: {e}", self.ws_url))
        })?;

        tracing::info!(%client_id, "Connected to queue manager event feed");
        Ok(stream)
    }

    /// Retry the connection with exponential backoff.
    ///
    /// Returns `Some(stream)` once a connection succeeds, or `None` if
    /// `cancel` fires first.
    async fn reconnect(
        &self,
        config: &BackoffConfig,
        cancel: &CancellationToken,
    ) -> Option<WsStream> {
        let mut delay = config.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            tracing::info!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting to event feed",
            );

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Feed reconnect cancelled");
                    return None;
                }
                result = self.connect() => {
                    match result {
                        Ok(stream) => return Some(stream),
                        Err(error) => {
                            tracing::warn!(%error, "Reconnect attempt {attempt} failed");
                        }
                    }
                }
            }

            // Wait before the next attempt, respecting cancellation.
            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            delay = next_delay(delay, config);
        }
    }
}

/// Read frames until the stream ends, forwarding parsed events.
///
/// Malformed or unknown frames are logged and skipped; the feed stays
/// up.
async fn pump(mut stream: WsStream, events: &broadcast::Sender<LifecycleEvent>) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match parse_event(&text) {
                Ok(event) => {
                    // Send fails only when no consumer is subscribed;
                    // the feed keeps running either way.
                    let _ = events.send(event);
                }
                Err(error) => {
                    tracing::warn!(%error, raw_frame = %text, "Unparseable feed frame");
                }
            },
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Handled automatically by tungstenite.
            }
            Ok(Message::Binary(_)) => {
                tracing::trace!("Ignoring binary frame");
            }
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "Event feed closed by server");
                break;
            }
            Ok(Message::Frame(_)) => {}
            Err(error) => {
                tracing::error!(%error, "Event feed receive error");
                break;
            }
        }
    }
}
