use crate::mapping::{ChatCommand, PlayerSlot};
use crate::telemetry::Event;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::trace;

/// JSON-Payload eines Chat-Bridges: `{"user": "...", "command": "..."}`
#[derive(Debug, Deserialize)]
struct ChatPayload {
    #[serde(default, alias = "author")]
    user: Option<String>,
    #[serde(alias = "message", alias = "text")]
    command: String,
}

/// Wandelt einen MQTT-Payload in einen Befehl um.
///
/// JSON mit Autor wird bevorzugt, sonst gilt der ganze Payload als Befehlstext.
pub fn parse_payload(player: PlayerSlot, payload: &[u8]) -> Option<ChatCommand> {
    let text = std::str::from_utf8(payload).ok()?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(chat) = serde_json::from_str::<ChatPayload>(text) {
        let author = chat.user.filter(|u| !u.is_empty());
        return Some(ChatCommand::new(player, author, chat.command));
    }

    trace!("Payload is not JSON, using it as plain command text");
    Some(ChatCommand::new(player, None, text))
}

/// Kanäle zwischen Bridge und Engine
pub struct MsgManager {
    /// Eingehende Befehle Richtung Engine
    pub command_tx: mpsc::Sender<ChatCommand>,
    /// Telemetrie-Events vom Sink
    pub telemetry_rx: mpsc::Receiver<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_payload_carries_author() {
        let cmd = parse_payload(PlayerSlot::One, br#"{"user":"alice","command":"UP15"}"#).unwrap();
        assert_eq!(cmd.author.as_deref(), Some("alice"));
        assert_eq!(cmd.text, "UP15");
        assert_eq!(cmd.player, PlayerSlot::One);
    }

    #[test]
    fn json_aliases_are_accepted() {
        let cmd =
            parse_payload(PlayerSlot::Two, br#"{"author":"bob","message":"a,b"}"#).unwrap();
        assert_eq!(cmd.author.as_deref(), Some("bob"));
        assert_eq!(cmd.text, "a,b");
    }

    #[test]
    fn plain_text_has_no_author() {
        let cmd = parse_payload(PlayerSlot::Two, b"down+right+x").unwrap();
        assert_eq!(cmd.author, None);
        assert_eq!(cmd.text, "down+right+x");
    }

    #[test]
    fn empty_author_becomes_none() {
        let cmd = parse_payload(PlayerSlot::One, br#"{"user":"","command":"A"}"#).unwrap();
        assert_eq!(cmd.author, None);
    }

    #[test]
    fn empty_or_binary_payload_is_ignored() {
        assert!(parse_payload(PlayerSlot::One, b"   ").is_none());
        assert!(parse_payload(PlayerSlot::One, &[0xff, 0xfe]).is_none());
    }
}
