//! Modul für die Übersetzung von Chat-Befehlen in Controller-Eingaben.
//!
//! Ein roher Befehl wie `LEFT15,DOWN+RIGHT+X` durchläuft folgende Stufen:
//!
//! ```text
//! RawCommand ──► BatchTranslator ──► Modifier-Parser ──► Dispatcher
//!   (", ")         (Segmente)         (Zahl am Ende)        │
//!                                                           ├─► AliasResolver ──► Profile ──► Actuator
//!                                                           ├─► ComboResolver ──► Profile ──► Actuator
//!                                                           └─► Lockout (unplug)
//! ```
//!
//! Der Übersetzungspfad selbst erzeugt keine Fehler: unbekannte Befehle,
//! gesperrte Spieler und kaputte Modifier werden still verworfen. Fehler gibt
//! es nur beim Start, wenn ein Profil unvollständig ist.

pub mod alias;
pub mod combo;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod lockout;
pub mod modifier;
pub mod translator;

// Re-exports für einfacheren Zugriff
pub use alias::{AliasResolver, CanonicalAction, EmissionKind, ProfileFamily, Resolution};
pub use combo::{ComboMode, ComboResolver};
pub use dispatcher::{DispatchSettings, Dispatcher};
pub use engine::{
    EngineComponents, TranslationEngine, TranslationEngineHandle, TranslationEngineState,
};
pub use error::MappingError;
pub use lockout::{Clock, Lockout, LockoutState, ManualClock, SystemClock};
pub use modifier::find_first_digit;
pub use translator::BatchTranslator;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Spielerplatz, also einer der beiden virtuellen Controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    /// Der jeweils andere Spieler, Ziel eines Unplugs
    pub fn other(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    /// Index für Arrays mit einem Eintrag pro Spieler
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl TryFrom<u8> for PlayerSlot {
    type Error = MappingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerSlot::One),
            2 => Ok(PlayerSlot::Two),
            other => Err(MappingError::UnknownPlayer(other.to_string())),
        }
    }
}

impl From<PlayerSlot> for u8 {
    fn from(slot: PlayerSlot) -> Self {
        slot.number()
    }
}

impl Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Ein einzelnes, geparstes Segment eines Befehls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    /// Aktionstext ohne Modifier, unverändert aus dem Chat
    pub token: String,
    /// Wiederholungen bzw. Haltedauer, `None` bedeutet einfache Ausführung
    pub modifier: Option<u32>,
    pub author: Option<String>,
    pub player: PlayerSlot,
}

/// Ein eingehender Chat-Befehl, wie er von einer Quelle geliefert wird
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCommand {
    pub player: PlayerSlot,
    pub author: Option<String>,
    /// Roher Befehlstext, z.B. `LEFT15,DOWN+RIGHT+X`
    pub text: String,
    pub received_at: DateTime<Local>,
}

impl ChatCommand {
    pub fn new(player: PlayerSlot, author: Option<String>, text: impl Into<String>) -> Self {
        Self {
            player,
            author,
            text: text.into(),
            received_at: Local::now(),
        }
    }
}

impl Display for ChatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.author {
            Some(author) => write!(f, "{} - P{} {}: {}", self.received_at, self.player, author, self.text),
            None => write!(f, "{} - P{}: {}", self.received_at, self.player, self.text),
        }
    }
}
