//! Befehle von stdin, hauptsächlich zum Testen ohne Chat-Bridge
//!
//! Zeilenformat: `spieler|autor|befehl` oder `spieler|befehl`, z.B.
//! `1|alice|LEFT15,A` oder `2|MOM`.

use crate::mapping::{ChatCommand, PlayerSlot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub fn parse_line(line: &str) -> Option<ChatCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.splitn(3, '|');
    let player = parts.next()?.trim().parse::<u8>().ok()?;
    let player = PlayerSlot::try_from(player).ok()?;

    let (author, text) = match (parts.next(), parts.next()) {
        (Some(author), Some(text)) => {
            let author = author.trim();
            let author = (!author.is_empty()).then(|| author.to_string());
            (author, text)
        }
        (Some(text), None) => (None, text),
        _ => return None,
    };

    Some(ChatCommand::new(player, author, text.trim()))
}

/// Liest stdin zeilenweise, bis EOF oder `cancel`
pub async fn run(command_tx: mpsc::Sender<ChatCommand>, cancel: CancellationToken) {
    info!("Reading commands from stdin (format: player|author|command)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match parse_line(&line) {
                        Some(command) => {
                            if command_tx.send(command).await.is_err() {
                                debug!("Engine stopped, console intake ends");
                                break;
                            }
                        }
                        None => warn!("Ignoring malformed console line: {:?}", line),
                    },
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_with_author() {
        let command = parse_line("2|alice|LEFT15,A").unwrap();
        assert_eq!(command.player, PlayerSlot::Two);
        assert_eq!(command.author.as_deref(), Some("alice"));
        assert_eq!(command.text, "LEFT15,A");
    }

    #[test]
    fn line_without_author() {
        let command = parse_line(" 1|MOM ").unwrap();
        assert_eq!(command.player, PlayerSlot::One);
        assert_eq!(command.author, None);
        assert_eq!(command.text, "MOM");
    }

    #[test]
    fn commands_may_contain_separators() {
        let command = parse_line("1|bob|UP+A|B").unwrap();
        assert_eq!(command.text, "UP+A|B");
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_line("").is_none());
        assert!(parse_line("UP").is_none());
        assert!(parse_line("3|UP").is_none());
        assert!(parse_line("x|bob|UP").is_none());
    }
}
