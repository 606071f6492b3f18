//! Fehlerdefinitionen für das Mapping-Modul

use thiserror::Error;

/// Fehlertypen für die Übersetzungs-Engine
///
/// Der Übersetzungspfad selbst kennt keine Fehler. Diese Typen betreffen nur
/// Konfiguration, Start und Herunterfahren.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Fehler bei der Konfiguration eines Profils
    #[error("Konfigurationsfehler: {0}")]
    ConfigError(String),

    /// Fehler bei der Initialisierung der Engine
    #[error("Initialisierungsfehler: {0}")]
    InitializationError(String),

    /// Fehler bei der Task-Verwaltung
    #[error("Thread-Fehler: {0}")]
    ThreadError(String),

    /// Das angeforderte Profil existiert nicht
    #[error("Unbekanntes Profil: {0}")]
    UnknownProfile(String),

    /// Spielernummer außerhalb von 1 und 2
    #[error("Unbekannter Spieler: {0}")]
    UnknownPlayer(String),
}
