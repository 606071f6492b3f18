//! Einstiegspunkt: zerlegt rohe Chat-Befehle und reicht sie an den Dispatcher

use crate::actuator::BatchGuard;
use crate::mapping::modifier::{split_batch, split_modifier};
use crate::mapping::{Dispatcher, ParsedAction, PlayerSlot};
use tracing::debug;

/// Übersetzt kommagetrennte Befehle Segment für Segment
pub struct BatchTranslator {
    dispatcher: Dispatcher,
}

impl BatchTranslator {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Zerlegt `raw` in Aktionen, ohne etwas auszuführen
    pub fn parse(raw: &str, author: Option<&str>, player: PlayerSlot) -> Vec<ParsedAction> {
        split_batch(raw)
            .map(|segment| {
                let (token, modifier) = split_modifier(segment);
                ParsedAction {
                    token: token.to_string(),
                    modifier,
                    author: author.map(str::to_string),
                    player,
                }
            })
            .collect()
    }

    /// Führt alle Segmente in Reihenfolge aus.
    ///
    /// Ein unbekanntes Segment bricht die folgenden nicht ab. Der ganze Befehl
    /// landet als ein Batch beim Actuator.
    pub fn translate(&self, raw: &str, author: Option<&str>, player: PlayerSlot) {
        debug!("Translating {:?} from {:?} for player {}", raw, author, player);
        let _batch = BatchGuard::open(self.dispatcher.actuator());

        for action in Self::parse(raw, author, player) {
            self.dispatcher.dispatch(
                &action.token,
                action.modifier,
                action.author.as_deref(),
                action.player,
            );
        }
    }
}
