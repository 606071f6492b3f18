//! # MQTT Integration Module
//!
//! Connects crowdpad to the chat bridges and the stream overlay through an MQTT
//! broker. Chat bridges publish raw commands on one topic per player slot; the
//! translation engine's telemetry events go out as JSON on a single topic.
//!
//! ## Module Architecture
//!
//! ```text
//! mqtt/
//! ├── config.rs           - Broker, topics and defaults
//! ├── message_manager.rs  - Payload parsing and channel pair
//! └── mqtt_handler.rs     - Connection loop, subscriptions, telemetry publishing
//! ```
//!
//! ## Message Flow
//!
//! ```text
//! chat bridge ──► commands/1, commands/2 ──► MqttBridge ──► engine queue
//! engine ──► ChannelSink ──► MqttBridge ──► telemetry topic ──► overlay
//! ```
//!
//! Telemetry is best-effort: if the broker is gone, events are dropped rather
//! than queued.

pub mod config;
pub mod message_manager;
pub mod mqtt_handler;

pub use config::MqttConfig;
pub use mqtt_handler::{MqttBridge, MqttStatus};
