//! Eingebaute Standard-Profile

use super::{ActuatorCodes, Profile};
use crate::mapping::{ComboMode, PlayerSlot, ProfileFamily};

macro_rules! codes_insert {
    ($profile:expr, $player:expr, $action:expr, $code:expr) => {
        $profile
            .codes_for_mut($player)
            .insert($action.to_string(), ActuatorCodes::from($code));
    };
}

/// Gamepad-Profil für einen Emulator mit zwei Keyboard-Belegungen
pub fn gamepad_profile() -> Profile {
    let mut profile = Profile::new("gamepad", ProfileFamily::Gamepad, ComboMode::Overlapping);

    // Spieler 1: Pfeiltasten und linke Tastaturhälfte
    let one = PlayerSlot::One;
    codes_insert!(profile, one, "UP", "up");
    codes_insert!(profile, one, "DOWN", "down");
    codes_insert!(profile, one, "LEFT", "left");
    codes_insert!(profile, one, "RIGHT", "right");
    codes_insert!(profile, one, "A", "x");
    codes_insert!(profile, one, "B", "c");
    codes_insert!(profile, one, "X", "s");
    codes_insert!(profile, one, "Y", "d");
    codes_insert!(profile, one, "START", "enter");
    codes_insert!(profile, one, "SELECT", "backspace");
    codes_insert!(profile, one, "LTRIG", "q");
    codes_insert!(profile, one, "RTRIG", "w");
    codes_insert!(profile, one, "ZTRIG", "z");
    codes_insert!(profile, one, "CENTERCAM", &["w", "e"][..]);

    // Spieler 2: IJKL und rechte Tastaturhälfte
    let two = PlayerSlot::Two;
    codes_insert!(profile, two, "UP", "i");
    codes_insert!(profile, two, "DOWN", "k");
    codes_insert!(profile, two, "LEFT", "j");
    codes_insert!(profile, two, "RIGHT", "l");
    codes_insert!(profile, two, "A", "n");
    codes_insert!(profile, two, "B", "m");
    codes_insert!(profile, two, "X", "h");
    codes_insert!(profile, two, "Y", "u");
    codes_insert!(profile, two, "START", "p");
    codes_insert!(profile, two, "SELECT", "o");
    codes_insert!(profile, two, "LTRIG", "y");
    codes_insert!(profile, two, "RTRIG", "t");
    codes_insert!(profile, two, "ZTRIG", "b");
    codes_insert!(profile, two, "CENTERCAM", &["t", "g"][..]);

    profile
}

/// Point-and-Click-Profil für Fallout, beide Spieler steuern dasselbe Spiel
pub fn fallout_profile() -> Profile {
    let mut profile = Profile::new(
        "fallout",
        ProfileFamily::PointAndClick,
        ComboMode::Overlapping,
    );

    let shared: &[(&str, &str)] = &[
        ("ATTACK", "a"),
        ("CHARACTER", "c"),
        ("INVENTORY", "i"),
        ("PIPBOY", "p"),
        ("Z", "z"),
        ("OPTIONS", "o"),
        ("ACTIVE", "b"),
        ("TOGGLE_MOUSE", "m"),
        ("TOGGLE_ITEM", "n"),
        ("SKILLDEX", "s"),
        ("SNEAK", "1"),
        ("LOCKPICK", "2"),
        ("STEAL", "3"),
        ("TRAP", "4"),
        ("FIRST_AID", "5"),
        ("DOCTOR", "6"),
        ("SCIENCE", "7"),
        ("REPAIR", "8"),
        ("TIME", "/"),
        ("ROTATE", ","),
        ("ROTATE_BACK", "."),
        ("SPACE", "space"),
        ("ENTER", "enter"),
        ("ESC", "escape"),
        ("TAB", "tab"),
        ("HOME", "home"),
        ("PAGE_UP", "pageup"),
        ("PAGE_DOWN", "pagedown"),
        ("HELP", "f1"),
        ("SAVE", "f4"),
        ("LOAD", "f5"),
    ];
    for (action, code) in shared {
        profile.insert_shared(action, *code);
    }

    profile
}
