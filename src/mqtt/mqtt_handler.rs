use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Local};
use rumqttc::{AsyncClient, Event as MqttEvent, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::config::MqttConfig;
use super::message_manager::{parse_payload, MsgManager};
use crate::mapping::{ChatCommand, PlayerSlot};
use crate::telemetry::Event;

#[derive(Clone, Debug, Default)]
pub struct MqttStatus {
    /// Nur der jüngste Fehler wird behalten
    pub last_error: Option<String>,
    pub error_count: usize,
    pub messages_received: usize,
    pub messages_sent: usize,
    pub last_activity: Option<DateTime<Local>>,
}

impl MqttStatus {
    fn record_error(&mut self, error: impl Display) {
        self.error_count += 1;
        self.last_error = Some(error.to_string());
    }
}

/// Verbindet Chat-Topics mit der Engine und veröffentlicht Telemetrie
pub struct MqttBridge {
    status: MqttStatus,
    config: MqttConfig,
    msg_manager: MsgManager,
}

impl MqttBridge {
    pub fn new(
        config: MqttConfig,
        command_tx: mpsc::Sender<ChatCommand>,
        telemetry_rx: mpsc::Receiver<Event>,
    ) -> Self {
        let msg_manager = MsgManager {
            command_tx,
            telemetry_rx,
        };

        MqttBridge {
            status: MqttStatus::default(),
            config,
            msg_manager,
        }
    }

    pub fn status(&self) -> &MqttStatus {
        &self.status
    }

    fn options(&self) -> MqttOptions {
        let mut mqtt_options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.host.clone(),
            self.config.port,
        );
        mqtt_options.set_keep_alive(Duration::from_secs(self.config.keep_alive_secs.max(5)));
        if let (Some(user), Some(pw)) = (&self.config.user, &self.config.password) {
            mqtt_options.set_credentials(user.clone(), pw.clone());
        }
        mqtt_options
    }

    /// Spieler, dem ein Befehls-Topic gehört
    pub fn slot_for_topic(&self, topic: &str) -> Option<PlayerSlot> {
        PlayerSlot::ALL
            .into_iter()
            .find(|slot| self.config.command_topics[slot.index()] == topic)
    }

    fn handle_publish(&mut self, topic: &str, payload: &[u8]) {
        let Some(player) = self.slot_for_topic(topic) else {
            trace!("Ignoring message on unrelated topic {}", topic);
            return;
        };

        self.status.messages_received += 1;
        self.status.last_activity = Some(Local::now());

        if let Some(command) = parse_payload(player, payload) {
            debug!("Received {}", command);
            if let Err(e) = self.msg_manager.command_tx.try_send(command) {
                warn!("Unable to forward command to engine: {}", e);
            }
        }
    }

    fn subscribe_all(&mut self, client: &AsyncClient) {
        for topic in &self.config.command_topics {
            match client.try_subscribe(topic.clone(), QoS::AtLeastOnce) {
                Ok(_) => info!("Subscribed to {}", topic),
                Err(e) => {
                    warn!("Subscription to {} failed: {}", topic, e);
                    self.status.record_error(e);
                }
            }
        }
    }

    fn publish_event(&mut self, client: &AsyncClient, event: Event) {
        let payload = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                debug!("Unable to serialize telemetry event: {}", e);
                return;
            }
        };

        match client.try_publish(
            self.config.telemetry_topic.clone(),
            QoS::AtMostOnce,
            false,
            payload,
        ) {
            Ok(_) => self.status.messages_sent += 1,
            Err(e) => debug!("Telemetry event dropped: {}", e),
        }
    }

    /// Läuft bis `cancel` ausgelöst wird; Verbindungsfehler führen zu Reconnects
    pub async fn run(mut self, cancel: CancellationToken) -> MqttStatus {
        info!(
            "Connecting to MQTT broker {}:{}",
            self.config.host, self.config.port
        );

        let (client, mut eventloop) = AsyncClient::new(self.options(), self.config.channel_capacity);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("MQTT bridge shutting down");
                    break;
                }

                notification = eventloop.poll() => {
                    match notification {
                        Ok(MqttEvent::Incoming(Packet::ConnAck(_))) => {
                            info!("Connected to MQTT broker");
                            self.subscribe_all(&client);
                        }
                        Ok(MqttEvent::Incoming(Packet::Publish(publish))) => {
                            self.handle_publish(&publish.topic, &publish.payload);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("MQTT connection error: {}", e);
                            self.status.record_error(e);
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }

                Some(event) = self.msg_manager.telemetry_rx.recv() => {
                    self.publish_event(&client, event);
                }
            }
        }

        if let Err(e) = client.try_disconnect() {
            debug!("Disconnect request failed: {}", e);
        }
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> (MqttBridge, mpsc::Receiver<ChatCommand>) {
        let (command_tx, command_rx) = mpsc::channel(10);
        let (_telemetry_tx, telemetry_rx) = mpsc::channel(10);
        (
            MqttBridge::new(MqttConfig::default(), command_tx, telemetry_rx),
            command_rx,
        )
    }

    #[test]
    fn topics_map_to_player_slots() {
        let (bridge, _rx) = bridge();
        assert_eq!(
            bridge.slot_for_topic("crowdpad/commands/1"),
            Some(PlayerSlot::One)
        );
        assert_eq!(
            bridge.slot_for_topic("crowdpad/commands/2"),
            Some(PlayerSlot::Two)
        );
        assert_eq!(bridge.slot_for_topic("crowdpad/telemetry"), None);
    }

    #[test]
    fn publish_on_command_topic_is_forwarded() {
        let (mut bridge, mut rx) = bridge();
        bridge.handle_publish("crowdpad/commands/2", br#"{"user":"eve","command":"MOM"}"#);
        bridge.handle_publish("other/topic", b"UP");

        let command = rx.try_recv().unwrap();
        assert_eq!(command.player, PlayerSlot::Two);
        assert_eq!(command.text, "MOM");
        assert!(rx.try_recv().is_err());
        assert_eq!(bridge.status().messages_received, 1);
        assert!(bridge.status().last_activity.is_some());
    }

    #[test]
    fn only_the_latest_error_is_kept() {
        let mut status = MqttStatus::default();
        for attempt in 0..1000 {
            status.record_error(format!("connection refused ({attempt})"));
        }
        assert_eq!(status.error_count, 1000);
        assert_eq!(
            status.last_error.as_deref(),
            Some("connection refused (999)")
        );
    }
}
