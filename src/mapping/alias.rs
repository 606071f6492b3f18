//! Alias-Tabellen und Auflösung von Chat-Text zu kanonischen Aktionen
//!
//! Jede Profilfamilie besitzt eine statische Tabelle `kanonische Aktion → Synonyme`.
//! Beim Erstellen eines [`AliasResolver`] wird sie zu `Synonym → Aktion` invertiert.

use crate::actuator::{Direction, MouseButton, ScrollAxis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display};
use tracing::trace;

/// Qualifier vor Zeigerbewegungen, halbiert die Distanz
pub const PRECISION_QUALIFIER: &str = "PRECISION";

/// Wörter, mit denen ein Spieler den Controller des Gegners "aussteckt"
const UNPLUG_WORDS: &[&str] = &["QUIT-IT", "IM-CALLING-MOM", "STOP-IT", "MOM", "MOOOOOOOOOOM"];

/// Feste Ansage für `DAD`
pub const DAD_ANNOUNCEMENT: &str = "ARE YA WINNIN'? - 👨‍🦳";

/// Profilfamilie, bestimmt Vokabular und Alias-Tabelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFamily {
    /// Klassisches Gamepad mit Steuerkreuz und Buttons
    Gamepad,
    /// Point-and-Click-RPG mit Maussteuerung
    PointAndClick,
}

impl Display for ProfileFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileFamily::Gamepad => write!(f, "Gamepad"),
            ProfileFamily::PointAndClick => write!(f, "PointAndClick"),
        }
    }
}

/// Kanonischer Aktionsname innerhalb einer Profilfamilie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalAction(pub &'static str);

impl CanonicalAction {
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl Display for CanonicalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Wie eine aufgelöste Aktion ausgegeben wird
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionKind {
    /// Bewegung, Taste wird `modifier + 1` mal gedrückt
    Hold,
    /// Taste wird `modifier` mal getippt
    Tap,
    /// Zeiger bewegen, optional danach klicken
    Pointer {
        direction: Direction,
        click: Option<MouseButton>,
    },
    Click(MouseButton),
    /// Scrollen, `sign` gibt die Richtung auf der Achse an
    Scroll { axis: ScrollAxis, sign: i32 },
    /// Gegnerischen Controller aussperren
    Unplug,
    /// Feste Nachricht an den Sink, keine Eingabe
    Announce(&'static str),
}

impl EmissionKind {
    /// Nur Tasten-Aktionen brauchen Codes aus dem Profil
    pub fn needs_codes(&self) -> bool {
        matches!(self, EmissionKind::Hold | EmissionKind::Tap)
    }
}

/// Ein Eintrag der Alias-Tabelle
#[derive(Debug)]
pub struct ActionSpec {
    pub action: CanonicalAction,
    pub synonyms: &'static [&'static str],
    pub kind: EmissionKind,
}

macro_rules! action {
    ($name:expr, $kind:expr, [$($syn:expr),* $(,)?]) => {
        ActionSpec {
            action: CanonicalAction($name),
            synonyms: &[$($syn),*],
            kind: $kind,
        }
    };
}

use EmissionKind::{Hold, Tap};

static GAMEPAD_ACTIONS: &[ActionSpec] = &[
    action!("UP", Hold, ["UP", "U"]),
    action!("DOWN", Hold, ["DOWN", "D"]),
    action!("LEFT", Hold, ["LEFT", "L"]),
    action!("RIGHT", Hold, ["RIGHT", "R"]),
    action!("A", Tap, ["A"]),
    action!("B", Tap, ["B"]),
    action!("X", Tap, ["X"]),
    action!("Y", Tap, ["Y"]),
    action!("START", Tap, ["START"]),
    action!("SELECT", Tap, ["SELECT"]),
    action!("LTRIG", Tap, ["LTRIG"]),
    action!("RTRIG", Tap, ["RTRIG"]),
    action!("ZTRIG", Tap, ["ZTRIG", "Z"]),
    action!("CENTERCAM", Tap, ["CENTERCAM"]),
    action!("UNPLUG", EmissionKind::Unplug, []),
    action!("DAD", EmissionKind::Announce(DAD_ANNOUNCEMENT), ["DAD"]),
];

const fn pointer(direction: Direction) -> EmissionKind {
    EmissionKind::Pointer {
        direction,
        click: None,
    }
}

const fn walk(direction: Direction) -> EmissionKind {
    EmissionKind::Pointer {
        direction,
        click: Some(MouseButton::Left),
    }
}

static POINT_AND_CLICK_ACTIONS: &[ActionSpec] = &[
    action!("ATTACK", Tap, ["A", "ATTACK"]),
    action!("CHARACTER", Tap, ["C", "CHARACTER"]),
    action!("INVENTORY", Tap, ["I", "INVENTORY"]),
    action!("PIPBOY", Tap, ["P", "PIP", "PIPBOY", "PIPBOY2000"]),
    action!("Z", Tap, ["Z"]),
    action!("OPTIONS", Tap, ["O", "OPTIONS"]),
    action!("ACTIVE", Tap, ["B", "ACTIVE"]),
    action!("TOGGLE_MOUSE", Tap, ["M", "TOGGLE_MOUSE"]),
    action!("TOGGLE_ITEM", Tap, ["N", "TOGGLE_ITEM"]),
    action!("SKILLDEX", Tap, ["S", "SKILL", "SKILLS", "SKILLDEX"]),
    action!("SNEAK", Tap, ["1", "SNEAK"]),
    action!("LOCKPICK", Tap, ["2", "LOCK", "LOCKPICK", "PICK"]),
    action!("STEAL", Tap, ["3", "STEAL"]),
    action!("TRAP", Tap, ["4", "TRAP"]),
    action!("FIRST_AID", Tap, ["5", "AID", "STIM", "STIMPACK"]),
    action!("DOCTOR", Tap, ["6", "DR", "DOCTOR"]),
    action!("SCIENCE", Tap, ["7", "SCIENCE"]),
    action!("REPAIR", Tap, ["8", "FIX", "REPAIR"]),
    action!("TIME", Tap, ["?", "TIME", "CLOCK"]),
    action!("ROTATE", Tap, ["<", "ROTATE"]),
    action!("ROTATE_BACK", Tap, [">"]),
    action!("SPACE", Tap, ["SPACE", "END"]),
    action!("ENTER", Tap, ["ENTER", "DONE"]),
    action!("ESC", Tap, ["ESC", "CLOSE"]),
    action!("TAB", Tap, ["TAB", "MAP"]),
    action!("HOME", Tap, ["HOME"]),
    action!("PAGE_UP", Tap, ["PGUP"]),
    action!("PAGE_DOWN", Tap, ["PGDN"]),
    action!("HELP", Tap, ["HELP"]),
    action!("SAVE", Tap, ["SAVE"]),
    action!("LOAD", Tap, ["LOAD"]),
    action!(
        "POINTER_LEFT",
        pointer(Direction::Left),
        ["MOUSE LEFT", "POINTER LEFT", "CURSOR LEFT", "MOUSELEFT", "MSL"]
    ),
    action!(
        "POINTER_RIGHT",
        pointer(Direction::Right),
        ["MOUSE RIGHT", "POINTER RIGHT", "CURSOR RIGHT", "MOUSERIGHT", "MSR"]
    ),
    action!(
        "POINTER_UP",
        pointer(Direction::Up),
        ["MOUSE UP", "POINTER UP", "CURSOR UP", "MOUSEUP", "MSU"]
    ),
    action!(
        "POINTER_DOWN",
        pointer(Direction::Down),
        ["MOUSE DOWN", "POINTER DOWN", "CURSOR DOWN", "MOUSEDOWN", "MSD"]
    ),
    action!(
        "WALK_LEFT",
        walk(Direction::Left),
        ["LEFT", "MVL", "WEST", "MOVE WEST", "MOVE LEFT"]
    ),
    action!(
        "WALK_RIGHT",
        walk(Direction::Right),
        ["RIGHT", "MVR", "EAST", "MOVE EAST", "MOVE RIGHT"]
    ),
    action!(
        "WALK_UP",
        walk(Direction::Up),
        ["UP", "MVU", "NORTH", "MOVE NORTH", "MOVE UP"]
    ),
    action!(
        "WALK_DOWN",
        walk(Direction::Down),
        ["DOWN", "MVD", "SOUTH", "MOVE SOUTH", "MOVE DOWN"]
    ),
    action!(
        "LEFT_CLICK",
        EmissionKind::Click(MouseButton::Left),
        ["LEFT CLICK", "L CLICK", "LCLICK", "LCL"]
    ),
    action!(
        "RIGHT_CLICK",
        EmissionKind::Click(MouseButton::Right),
        ["RIGHT CLICK", "R CLICK", "RCLICK", "RCL"]
    ),
    action!(
        "SCROLL_LEFT",
        EmissionKind::Scroll { axis: ScrollAxis::Horizontal, sign: -1 },
        ["SCROLL LEFT", "SCRLL"]
    ),
    action!(
        "SCROLL_RIGHT",
        EmissionKind::Scroll { axis: ScrollAxis::Horizontal, sign: 1 },
        ["SCROLL RIGHT", "SCRLR"]
    ),
    action!(
        "SCROLL_UP",
        EmissionKind::Scroll { axis: ScrollAxis::Vertical, sign: 1 },
        ["SCROLL UP", "SCRLU"]
    ),
    action!(
        "SCROLL_DOWN",
        EmissionKind::Scroll { axis: ScrollAxis::Vertical, sign: -1 },
        ["SCROLL DOWN", "SCRLD"]
    ),
    action!("UNPLUG", EmissionKind::Unplug, []),
    action!("DAD", EmissionKind::Announce(DAD_ANNOUNCEMENT), ["DAD"]),
];

/// Tokens, die in einer Kombo (`A+B`) erlaubt sind
static GAMEPAD_COMBO_TOKENS: &[&str] = &[
    "U", "UP", "D", "DOWN", "L", "LEFT", "R", "RIGHT", "A", "B", "X", "Y", "START", "SELECT",
    "LTRIG", "RTRIG", "Z", "ZTRIG", "CENTERCAM",
];

static POINT_AND_CLICK_COMBO_TOKENS: &[&str] = &[
    "A", "C", "I", "P", "Z", "O", "B", "M", "N", "S", "1", "2", "3", "4", "5", "6", "7", "8", "?",
    "<", ">", "SPACE", "ENTER", "TAB", "HOME", "END", "PGUP", "PGDN", "HELP", "SAVE", "LOAD",
];

impl ProfileFamily {
    /// Vokabular dieser Familie
    pub fn actions(&self) -> &'static [ActionSpec] {
        match self {
            ProfileFamily::Gamepad => GAMEPAD_ACTIONS,
            ProfileFamily::PointAndClick => POINT_AND_CLICK_ACTIONS,
        }
    }

    /// Erlaubte Kombo-Tokens dieser Familie
    pub fn combo_tokens(&self) -> &'static [&'static str] {
        match self {
            ProfileFamily::Gamepad => GAMEPAD_COMBO_TOKENS,
            ProfileFamily::PointAndClick => POINT_AND_CLICK_COMBO_TOKENS,
        }
    }

    /// Sucht eine Aktion über ihren kanonischen Namen
    pub fn spec(&self, name: &str) -> Option<&'static ActionSpec> {
        self.actions().iter().find(|spec| spec.action.0 == name)
    }
}

/// Ergebnis einer erfolgreichen Alias-Auflösung
#[derive(Debug, Clone, Copy)]
pub struct Resolution {
    pub action: CanonicalAction,
    pub kind: EmissionKind,
    /// `PRECISION` war vorangestellt
    pub precision: bool,
}

/// Löst Chat-Text case-insensitiv zu kanonischen Aktionen auf
#[derive(Debug, Clone)]
pub struct AliasResolver {
    family: ProfileFamily,
    synonyms: HashMap<&'static str, &'static ActionSpec>,
}

impl AliasResolver {
    pub fn new(family: ProfileFamily) -> Self {
        let mut synonyms = HashMap::new();
        for spec in family.actions() {
            for synonym in spec.synonyms {
                synonyms.insert(*synonym, spec);
            }
            if spec.kind == EmissionKind::Unplug {
                for word in UNPLUG_WORDS {
                    synonyms.insert(*word, spec);
                }
            }
        }

        Self { family, synonyms }
    }

    pub fn family(&self) -> ProfileFamily {
        self.family
    }

    /// Löst ein rohes Token auf. Unbekannte Tokens ergeben `None`.
    pub fn resolve(&self, raw_token: &str) -> Option<Resolution> {
        let upper = raw_token.trim().to_uppercase();

        let (token, precision) = match upper.strip_prefix(PRECISION_QUALIFIER) {
            Some(rest) if rest.starts_with(char::is_whitespace) && !rest.trim().is_empty() => {
                (rest.trim(), true)
            }
            _ => (upper.as_str(), false),
        };

        let spec = self.synonyms.get(token)?;
        trace!("Resolved {:?} to {}", raw_token, spec.action);

        Some(Resolution {
            action: spec.action,
            kind: spec.kind,
            precision,
        })
    }

    /// Prüft, ob ein Token in einer Kombo verwendet werden darf
    pub fn is_combo_token(&self, raw_token: &str) -> bool {
        let upper = raw_token.trim().to_uppercase();
        self.family.combo_tokens().contains(&upper.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn synonyms_are_unique_per_family() {
        for family in [ProfileFamily::Gamepad, ProfileFamily::PointAndClick] {
            let mut seen = HashSet::new();
            for spec in family.actions() {
                for synonym in spec.synonyms {
                    assert!(seen.insert(*synonym), "duplicate synonym {synonym} in {family}");
                }
            }
            for word in UNPLUG_WORDS {
                assert!(seen.insert(*word), "unplug word {word} shadows an action in {family}");
            }
        }
    }

    #[test]
    fn resolution_is_case_insensitive() {
        let resolver = AliasResolver::new(ProfileFamily::Gamepad);
        let lower = resolver.resolve("up").map(|r| r.action);
        let upper = resolver.resolve("UP").map(|r| r.action);
        let short = resolver.resolve("u").map(|r| r.action);
        assert_eq!(lower, Some(CanonicalAction("UP")));
        assert_eq!(lower, upper);
        assert_eq!(lower, short);
    }

    #[test]
    fn unknown_token_is_none() {
        let resolver = AliasResolver::new(ProfileFamily::PointAndClick);
        assert!(resolver.resolve("FROB").is_none());
        assert!(resolver.resolve("").is_none());
        assert!(resolver.resolve("ATTAC").is_none());
    }

    #[test]
    fn precision_prefix_is_stripped() {
        let resolver = AliasResolver::new(ProfileFamily::PointAndClick);
        let resolution = resolver.resolve("precision mouse left").unwrap();
        assert_eq!(resolution.action, CanonicalAction("POINTER_LEFT"));
        assert!(resolution.precision);

        let plain = resolver.resolve("mouse left").unwrap();
        assert!(!plain.precision);
    }

    #[test]
    fn bare_precision_is_unknown() {
        let resolver = AliasResolver::new(ProfileFamily::PointAndClick);
        assert!(resolver.resolve("PRECISION").is_none());
    }

    #[test]
    fn precision_must_be_a_separate_word() {
        let resolver = AliasResolver::new(ProfileFamily::PointAndClick);
        assert!(resolver.resolve("PRECISIONMSL").is_none());
        assert!(resolver.resolve("precision\tmsl").unwrap().precision);
    }

    #[test]
    fn unplug_words_resolve_in_every_family() {
        for family in [ProfileFamily::Gamepad, ProfileFamily::PointAndClick] {
            let resolver = AliasResolver::new(family);
            for word in UNPLUG_WORDS {
                let resolution = resolver.resolve(&word.to_lowercase()).unwrap();
                assert_eq!(resolution.kind, EmissionKind::Unplug);
            }
        }
    }

    #[test]
    fn families_disagree_on_directions() {
        let gamepad = AliasResolver::new(ProfileFamily::Gamepad);
        let rpg = AliasResolver::new(ProfileFamily::PointAndClick);
        assert_eq!(gamepad.resolve("LEFT").unwrap().kind, EmissionKind::Hold);
        assert!(matches!(
            rpg.resolve("LEFT").unwrap().kind,
            EmissionKind::Pointer { click: Some(MouseButton::Left), .. }
        ));
    }

    #[test]
    fn combo_tokens_resolve_to_key_actions() {
        for family in [ProfileFamily::Gamepad, ProfileFamily::PointAndClick] {
            let resolver = AliasResolver::new(family);
            for token in family.combo_tokens() {
                let resolution = resolver.resolve(token).unwrap();
                assert!(resolution.kind.needs_codes(), "{token} in {family}");
            }
        }
    }
}
