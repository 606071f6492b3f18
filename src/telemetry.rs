//! Telemetry sink for translated commands
//!
//! Every executed command produces an [`Event`] carrying the raw text the
//! player typed, never the resolved codes. Delivery is fire-and-forget: a
//! [`Sink`] must return immediately and swallow transport failures.

use crate::mapping::PlayerSlot;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Structured notification about an executed command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Chat author, empty for system notifications
    #[serde(rename = "user")]
    pub author: String,
    /// Raw action text before alias resolution
    pub action: String,
    /// Platform label of the player slot
    pub platform: String,
    pub timestamp: DateTime<Local>,
}

impl Event {
    pub fn new(author: Option<&str>, action: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            author: author.unwrap_or_default().to_string(),
            action: action.into(),
            platform: platform.into(),
            timestamp: Local::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.author.is_empty() {
            write!(f, "[{}] {}", self.platform, self.action)
        } else {
            write!(f, "[{}] {}: {}", self.platform, self.author, self.action)
        }
    }
}

/// Platform labels per player slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platforms(pub [String; 2]);

impl Default for Platforms {
    fn default() -> Self {
        Self(["A".to_string(), "B".to_string()])
    }
}

impl Platforms {
    pub fn label(&self, player: PlayerSlot) -> &str {
        &self.0[player.index()]
    }
}

/// Telemetry capability consumed by the dispatcher
pub trait Sink: Send + Sync + 'static {
    fn notify(&self, event: Event);
}

/// Writes events to the log
#[derive(Debug, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn notify(&self, event: Event) {
        info!("{}", event);
    }
}

/// Forwards events into a channel, e.g. towards the MQTT bridge
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Event>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }
}

impl Sink for ChannelSink {
    fn notify(&self, event: Event) {
        if let Err(e) = self.sender.try_send(event) {
            debug!("Telemetry event dropped: {}", e);
        }
    }
}

/// Keeps every event in memory, clones share the log
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Only the action texts, in order
    pub fn actions(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.action).collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Sink for RecordingSink {
    fn notify(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_user_field() {
        let event = Event::new(Some("alice"), "UP15", "youtube");
        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["user"], "alice");
        assert_eq!(json["action"], "UP15");
        assert_eq!(json["platform"], "youtube");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn missing_author_is_empty() {
        let event = Event::new(None, "DAD", "A");
        assert_eq!(event.author, "");
        assert_eq!(event.to_string(), "[A] DAD");
    }

    #[test]
    fn channel_sink_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sink = ChannelSink::new(tx);
        sink.notify(Event::new(None, "A", "A"));
    }

    #[test]
    fn channel_sink_swallows_full_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = ChannelSink::new(tx);
        sink.notify(Event::new(None, "first", "A"));
        sink.notify(Event::new(None, "second", "A"));
        assert_eq!(rx.try_recv().unwrap().action, "first");
        assert!(rx.try_recv().is_err());
    }
}
