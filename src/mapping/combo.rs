//! Kombo-Auflösung und überlappende Tastenfolgen
//!
//! `DOWN+RIGHT+X` wird gefiltert, zu Codes aufgelöst und anschließend so
//! gedrückt, dass benachbarte Tasten sich überlappen (Hadoken in SF2).

use crate::actuator::Actuator;
use crate::mapping::{find_first_digit, AliasResolver, PlayerSlot};
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Trennzeichen zwischen Kombo-Tokens
pub const COMBO_SEPARATOR: char = '+';

/// Art, wie eine aufgelöste Kombo gedrückt wird
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboMode {
    /// Gleitendes Fenster von höchstens zwei gehaltenen Tasten
    #[default]
    Overlapping,
    /// Erste Taste bleibt gehalten, alle weiteren werden getippt
    FirstHeld,
}

/// Löst Kombo-Tokens gegen Allow-Liste und Profil auf
#[derive(Debug, Clone)]
pub struct ComboResolver {
    aliases: AliasResolver,
}

impl ComboResolver {
    pub fn new(aliases: AliasResolver) -> Self {
        Self { aliases }
    }

    /// Gefilterte, flach aufgelöste Codes in Eingabereihenfolge.
    ///
    /// Tokens außerhalb der Allow-Liste und Tokens mit Ziffern werden verworfen.
    /// Das Ergebnis kann kürzer als die Eingabe oder leer sein.
    pub fn resolve<S: AsRef<str>>(
        &self,
        tokens: &[S],
        profile: &Profile,
        player: PlayerSlot,
    ) -> Vec<String> {
        tokens
            .iter()
            .map(|token| token.as_ref())
            .filter(|token| self.aliases.is_combo_token(token))
            .filter(|token| find_first_digit(token).is_none())
            .filter_map(|token| {
                let resolution = self.aliases.resolve(token)?;
                let codes = profile.lookup(player, resolution.action);
                if codes.is_none() {
                    trace!("No codes for combo token {} ({})", token, resolution.action);
                }
                codes
            })
            .flat_map(|codes| codes.iter().cloned())
            .collect()
    }
}

/// Drückt die aufgelösten Codes nach `mode`. Leere Listen erzeugen keine Aufrufe.
pub fn emit_combo(actuator: &dyn Actuator, codes: &[String], mode: ComboMode, pace_ms: u64) {
    let Some((first, rest)) = codes.split_first() else {
        return;
    };

    actuator.set_pace_delay(pace_ms);

    match mode {
        ComboMode::Overlapping => {
            actuator.key_down(first);
            let mut previous = first;
            for code in rest {
                actuator.key_down(code);
                actuator.key_up(previous);
                previous = code;
            }
            actuator.key_up(previous);
        }
        ComboMode::FirstHeld => {
            actuator.key_down(first);
            for code in rest {
                actuator.key_down(code);
                actuator.key_up(code);
            }
            actuator.key_up(first);
        }
    }
}
