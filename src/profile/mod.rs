//! Profile-Tabellen: kanonische Aktion → Actuator-Codes, pro Spieler
//!
//! Ein Profil beschreibt ein Spiel: welche Profilfamilie (Vokabular und Aliase)
//! gilt, wie Kombos gedrückt werden und welche Codes der Actuator pro Spieler
//! für jede Aktion bekommt. Profile werden beim Start validiert; fehlende
//! Einträge sind ein Konfigurationsfehler, kein Laufzeitfehler.

pub mod defaults;

use crate::mapping::{CanonicalAction, ComboMode, MappingError, PlayerSlot, ProfileFamily};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Ein Code oder eine geordnete Folge von Codes
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum ActuatorCodes {
    Single(String),
    Sequence(Vec<String>),
}

impl ActuatorCodes {
    pub fn as_slice(&self) -> &[String] {
        match self {
            ActuatorCodes::Single(code) => std::slice::from_ref(code),
            ActuatorCodes::Sequence(codes) => codes,
        }
    }
}

impl From<&str> for ActuatorCodes {
    fn from(code: &str) -> Self {
        ActuatorCodes::Single(code.to_string())
    }
}

impl From<&[&str]> for ActuatorCodes {
    fn from(codes: &[&str]) -> Self {
        ActuatorCodes::Sequence(codes.iter().map(|c| c.to_string()).collect())
    }
}

/// Konfiguration eines Spiels
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Profile {
    /// Eindeutiger Name, über den das Profil ausgewählt wird
    pub id: String,

    pub family: ProfileFamily,

    #[serde(default)]
    pub combo_mode: ComboMode,

    /// Codes für Spieler 1, indexiert nach kanonischem Aktionsnamen
    #[serde(default)]
    pub player_one: BTreeMap<String, ActuatorCodes>,

    /// Codes für Spieler 2
    #[serde(default)]
    pub player_two: BTreeMap<String, ActuatorCodes>,
}

impl Profile {
    pub fn new(id: impl Into<String>, family: ProfileFamily, combo_mode: ComboMode) -> Self {
        Self {
            id: id.into(),
            family,
            combo_mode,
            player_one: BTreeMap::new(),
            player_two: BTreeMap::new(),
        }
    }

    pub fn codes_for(&self, player: PlayerSlot) -> &BTreeMap<String, ActuatorCodes> {
        match player {
            PlayerSlot::One => &self.player_one,
            PlayerSlot::Two => &self.player_two,
        }
    }

    pub fn codes_for_mut(&mut self, player: PlayerSlot) -> &mut BTreeMap<String, ActuatorCodes> {
        match player {
            PlayerSlot::One => &mut self.player_one,
            PlayerSlot::Two => &mut self.player_two,
        }
    }

    /// Setzt dieselben Codes für beide Spieler
    pub fn insert_shared(&mut self, action: &str, codes: impl Into<ActuatorCodes>) {
        let codes = codes.into();
        self.player_one.insert(action.to_string(), codes.clone());
        self.player_two.insert(action.to_string(), codes);
    }

    /// Codes einer Aktion für einen Spieler
    pub fn lookup(&self, player: PlayerSlot, action: CanonicalAction) -> Option<&[String]> {
        self.codes_for(player)
            .get(action.name())
            .map(ActuatorCodes::as_slice)
    }

    /// Prüft, dass jede Tasten-Aktion der Familie für beide Spieler Codes hat
    /// und keine unbekannten Aktionen eingetragen sind.
    pub fn validate(&self) -> Result<(), MappingError> {
        debug!("Validating profile {} ({})", self.id, self.family);

        for player in PlayerSlot::ALL {
            let codes = self.codes_for(player);

            for spec in self.family.actions() {
                if !spec.kind.needs_codes() {
                    continue;
                }
                let entry = codes.get(spec.action.name()).map(ActuatorCodes::as_slice);
                match entry {
                    Some(list) if !list.is_empty() && list.iter().all(|c| !c.trim().is_empty()) => {}
                    Some(_) => {
                        return Err(MappingError::ConfigError(format!(
                            "Profile '{}': empty code for action {} (player {})",
                            self.id, spec.action, player
                        )))
                    }
                    None => {
                        return Err(MappingError::ConfigError(format!(
                            "Profile '{}': missing code for action {} (player {})",
                            self.id, spec.action, player
                        )))
                    }
                }
            }

            for name in codes.keys() {
                let known = self
                    .family
                    .spec(name)
                    .is_some_and(|spec| spec.kind.needs_codes());
                if !known {
                    return Err(MappingError::ConfigError(format!(
                        "Profile '{}': unknown action {} for family {} (player {})",
                        self.id, name, self.family, player
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Alle bekannten Profile, statisch für die Laufzeit des Prozesses
#[derive(Clone, Debug, Default)]
pub struct ProfileTable {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileTable {
    /// Eingebaute Profile
    pub fn builtin() -> Self {
        let mut table = Self::default();
        table.insert(defaults::gamepad_profile());
        table.insert(defaults::fallout_profile());
        table
    }

    /// Eingebaute Profile, ergänzt bzw. überschrieben durch `extra`
    pub fn with_overrides(extra: impl IntoIterator<Item = Profile>) -> Self {
        let mut table = Self::builtin();
        for profile in extra {
            info!("Registering profile from configuration: {}", profile.id);
            table.insert(profile);
        }
        table
    }

    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    pub fn get(&self, profile_id: &str) -> Result<&Profile, MappingError> {
        self.profiles
            .get(profile_id)
            .ok_or_else(|| MappingError::UnknownProfile(profile_id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// `(profil, spieler, aktion) → codes`
    pub fn lookup(
        &self,
        profile_id: &str,
        player: PlayerSlot,
        action: CanonicalAction,
    ) -> Option<&[String]> {
        self.profiles.get(profile_id)?.lookup(player, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_validate() {
        let table = ProfileTable::builtin();
        for id in table.ids() {
            table.get(id).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn missing_action_fails_validation() {
        let mut profile = defaults::gamepad_profile();
        profile.player_two.remove("START");
        let err = profile.validate().unwrap_err().to_string();
        assert!(err.contains("START"), "{err}");
        assert!(err.contains("player 2"), "{err}");
    }

    #[test]
    fn unknown_action_fails_validation() {
        let mut profile = defaults::gamepad_profile();
        profile.insert_shared("JUMP", "space");
        assert!(profile.validate().is_err());
    }

    #[test]
    fn empty_sequence_fails_validation() {
        let mut profile = defaults::gamepad_profile();
        profile
            .player_one
            .insert("A".to_string(), ActuatorCodes::Sequence(vec![]));
        assert!(profile.validate().is_err());
    }

    #[test]
    fn pointer_actions_need_no_codes() {
        let profile = defaults::fallout_profile();
        assert!(profile.player_one.get("POINTER_LEFT").is_none());
        profile.validate().unwrap();
    }

    #[test]
    fn table_lookup_by_profile_and_player() {
        let table = ProfileTable::builtin();
        let one = table.lookup("gamepad", PlayerSlot::One, CanonicalAction("UP"));
        let two = table.lookup("gamepad", PlayerSlot::Two, CanonicalAction("UP"));
        assert!(one.is_some());
        assert_ne!(one, two);
        assert!(table.lookup("nope", PlayerSlot::One, CanonicalAction("UP")).is_none());
    }

    #[test]
    fn profile_round_trips_through_toml() {
        let profile = defaults::gamepad_profile();
        let text = toml::to_string_pretty(&profile).unwrap();
        let parsed: Profile = toml::from_str(&text).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let table = ProfileTable::builtin();
        assert!(matches!(
            table.get("street-fighter"),
            Err(MappingError::UnknownProfile(_))
        ));
    }
}
