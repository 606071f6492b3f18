use serde::{Deserialize, Serialize};

/// Broker-Verbindung, Befehls-Topics pro Spieler und Telemetrie-Topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    /// Topic für Spieler 1 und Spieler 2
    pub command_topics: [String; 2],
    pub telemetry_topic: String,
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 1883,
            client_id: "crowdpad".to_string(),
            user: None,
            password: None,
            keep_alive_secs: 5,
            command_topics: [
                "crowdpad/commands/1".to_string(),
                "crowdpad/commands/2".to_string(),
            ],
            telemetry_topic: "crowdpad/telemetry".to_string(),
            channel_capacity: 100,
        }
    }
}
