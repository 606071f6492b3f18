//! Konfiguration aus `config.toml`
//!
//! Suchreihenfolge: `CROWDPAD_CONFIG`, sonst `<config_dir>/crowdpad/config.toml`.
//! Fehlende Felder fallen auf die Standardwerte zurück.

use crate::actuator::PacingSettings;
use crate::mapping::DispatchSettings;
use crate::mqtt::MqttConfig;
use crate::profile::Profile;
use crate::telemetry::Platforms;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const CONFIG_DIR: &str = "crowdpad";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_ENV: &str = "CROWDPAD_CONFIG";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    pub step: i32,
    pub scroll_step: i32,
    /// Fenstergröße `[breite, höhe]`
    pub bounds: Option<(i32, i32)>,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            step: 100,
            scroll_step: 200,
            bounds: None,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Aktives Profil
    pub profile: String,
    pub combos_enabled: bool,
    pub max_modifier: Option<u32>,
    pub lockout_window_ms: u64,
    pub platforms: Platforms,
    pub pacing: PacingSettings,
    pub pointer: PointerConfig,
    pub mqtt: MqttConfig,
    /// Befehle zusätzlich von stdin lesen
    pub console: bool,
    /// Eigene Profile, überschreiben eingebaute mit gleicher ID
    pub profiles: Vec<Profile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: "fallout".to_string(),
            combos_enabled: true,
            max_modifier: None,
            lockout_window_ms: 7000,
            platforms: Platforms::default(),
            pacing: PacingSettings::default(),
            pointer: PointerConfig::default(),
            mqtt: MqttConfig::default(),
            console: true,
            profiles: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| eyre!("Failed to parse config file: {}", e))
    }

    /// Lädt die Datei, fehlt sie, gelten die Standardwerte
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            warn!("Config file {} does not exist, using default", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file: {}", e))?;

        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize config: {}", e))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file: {}", e))
    }

    pub fn to_dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            combos_enabled: self.combos_enabled,
            max_modifier: self.max_modifier,
            pacing: self.pacing.clone(),
            pointer_step: self.pointer.step,
            scroll_step: self.pointer.scroll_step,
            pointer_bounds: self.pointer.bounds,
            platforms: self.platforms.clone(),
            lockout_window: Duration::from_millis(self.lockout_window_ms),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }

    let mut path = dirs::config_dir().unwrap_or_else(|| {
        warn!("Could not determine config directory, using current directory");
        PathBuf::from(".")
    });
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}

/// Schreibt eine Standardkonfiguration, falls noch keine existiert
pub async fn ensure_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    info!("Creating default configuration at {}", path.display());
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
    }

    AppConfig::default().save(path).await
}
