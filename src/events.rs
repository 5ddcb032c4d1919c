//! Live-update events
//!
//! Typed events announcing changes to the match history, decoding of the
//! text frames they arrive in, and an in-process publish/subscribe bus that
//! fans them out to any number of subscribers. The bus is an ordinary value
//! handed to whoever needs it; there is no process-wide connection state.

use crate::config::EventSettings;
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Text a client answers a keepalive ping with
pub const PONG_REPLY: &str = "pong";

const PING: &str = "ping";

/// Change to the match history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    NewMatch {
        #[serde(default)]
        ranked_game_number: Option<u32>,
    },
    MatchUpdated {
        ranked_game_number: u32,
    },
    MatchDeleted {
        ranked_game_number: u32,
    },
    /// Any event type this client does not know about
    #[serde(other)]
    Unknown,
}

impl MatchEvent {
    /// Whether cached statistics must be refetched after this event
    pub fn invalidates_history(&self) -> bool {
        !matches!(self, MatchEvent::Unknown)
    }
}

/// A decoded text frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Keepalive; answer with [`PONG_REPLY`]
    Ping,
    Event(MatchEvent),
    Ignored,
}

/// Decode one text frame from the live-update channel
pub fn decode_frame(text: &str) -> Frame {
    if text == PING {
        return Frame::Ping;
    }

    if !text.trim_start().starts_with('{') {
        debug!("Ignoring non-object frame: {}", text);
        return Frame::Ignored;
    }

    match serde_json::from_str::<MatchEvent>(text) {
        Ok(event) => Frame::Event(event),
        Err(e) => {
            warn!("Failed to parse event frame: {}", e);
            Frame::Ignored
        }
    }
}

/// Trait for publishing match events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: MatchEvent) -> Result<()>;
}

/// Broadcast-channel event bus
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<MatchEvent>,
}

impl BroadcastEventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TrackerError::EventBusError {
                message: "Channel capacity must be greater than 0".to_string(),
            }
            .into());
        }

        let (sender, _) = broadcast::channel(capacity);
        Ok(Self { sender })
    }

    pub fn from_settings(settings: &EventSettings) -> Result<Self> {
        Self::new(settings.channel_capacity)
    }

    /// Register a subscriber; dropping the subscription unsubscribes
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Decode a frame and publish it if it carries an event
    ///
    /// Returns the reply to send back, if any.
    pub async fn dispatch_frame(&self, text: &str) -> Result<Option<&'static str>> {
        match decode_frame(text) {
            Frame::Ping => Ok(Some(PONG_REPLY)),
            Frame::Event(event) => {
                self.publish(event).await?;
                Ok(None)
            }
            Frame::Ignored => Ok(None),
        }
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, event: MatchEvent) -> Result<()> {
        match self.sender.send(event) {
            Ok(receivers) => debug!("Published event to {} subscribers", receivers),
            Err(broadcast::error::SendError(event)) => {
                debug!("No subscribers for event {:?}", event);
            }
        }
        Ok(())
    }
}

/// Receiving end of a [`BroadcastEventBus`] subscription
#[derive(Debug)]
pub struct EventSubscription {
    receiver: broadcast::Receiver<MatchEvent>,
}

impl EventSubscription {
    /// Wait for the next event; `None` once the bus is gone
    ///
    /// A subscriber that falls behind skips the events it missed.
    pub async fn next(&mut self) -> Option<MatchEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already queued
    pub fn try_next(&mut self) -> Option<MatchEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(_) => return None,
            }
        }
    }
}
