//! Dispatcher: führt eine einzelne, geparste Aktion aus
//!
//! Reihenfolge pro Aufruf:
//!
//! 1. Sperre prüfen, gesperrte Spieler werden still verworfen
//! 2. Kombo (`A+B`): Kombo drücken und zusätzlich jedes Token einzeln ausführen
//! 3. Alias auflösen, unbekannt → nichts tun
//! 4. Unplug/Ansage → nur Sink, sonst Event an den Sink und Ausgabe am Actuator

use crate::actuator::{Actuator, BatchGuard, Direction, MouseButton, PacingSettings, ScrollAxis};
use crate::mapping::combo::{emit_combo, COMBO_SEPARATOR};
use crate::mapping::lockout::{Clock, Lockout, DEFAULT_LOCKOUT_WINDOW};
use crate::mapping::{
    AliasResolver, CanonicalAction, ComboResolver, EmissionKind, MappingError, PlayerSlot,
    Resolution,
};
use crate::profile::Profile;
use crate::telemetry::{Event, Platforms, Sink};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Laufzeit-Einstellungen des Dispatchers
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchSettings {
    /// Kombos drücken; ohne werden nur die einzelnen Tokens ausgeführt
    pub combos_enabled: bool,
    /// Optionale Obergrenze für Modifier, ohne werden sie unverändert genutzt
    pub max_modifier: Option<u32>,
    pub pacing: PacingSettings,
    /// Zeigerbewegung in Pixeln, mit `PRECISION` halbiert
    pub pointer_step: i32,
    pub scroll_step: i32,
    /// Fenstergröße, innerhalb der der Zeiger bleiben muss
    pub pointer_bounds: Option<(i32, i32)>,
    pub platforms: Platforms,
    pub lockout_window: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            combos_enabled: true,
            max_modifier: None,
            pacing: PacingSettings::default(),
            pointer_step: 100,
            scroll_step: 200,
            pointer_bounds: None,
            platforms: Platforms::default(),
            lockout_window: DEFAULT_LOCKOUT_WINDOW,
        }
    }
}

/// Führt Aktionen eines Profils aus
pub struct Dispatcher {
    profile: Profile,
    aliases: AliasResolver,
    combos: ComboResolver,
    lockout: Lockout,
    actuator: Arc<dyn Actuator>,
    sink: Arc<dyn Sink>,
    settings: DispatchSettings,
}

impl Dispatcher {
    /// Erstellt einen Dispatcher. Schlägt fehl, wenn das Profil unvollständig ist.
    pub fn new(
        profile: Profile,
        actuator: Arc<dyn Actuator>,
        sink: Arc<dyn Sink>,
        clock: Arc<dyn Clock>,
        settings: DispatchSettings,
    ) -> Result<Self, MappingError> {
        profile.validate()?;

        let aliases = AliasResolver::new(profile.family);
        let combos = ComboResolver::new(aliases.clone());
        let lockout = Lockout::new(settings.lockout_window, clock);

        info!(
            "Dispatcher ready for profile {} ({}, combos: {:?})",
            profile.id, profile.family, profile.combo_mode
        );

        Ok(Self {
            profile,
            aliases,
            combos,
            lockout,
            actuator,
            sink,
            settings,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn lockout(&self) -> &Lockout {
        &self.lockout
    }

    pub fn actuator(&self) -> &dyn Actuator {
        self.actuator.as_ref()
    }

    /// Führt eine Aktion aus. Fehler gibt es nicht, nur stille No-Ops.
    ///
    /// Alle Actuator-Aufrufe der Aktion bilden einen Batch.
    pub fn dispatch(
        &self,
        action_text: &str,
        modifier: Option<u32>,
        author: Option<&str>,
        player: PlayerSlot,
    ) {
        let _batch = BatchGuard::open(self.actuator.as_ref());
        self.dispatch_action(action_text, modifier, author, player);
    }

    fn dispatch_action(
        &self,
        action_text: &str,
        modifier: Option<u32>,
        author: Option<&str>,
        player: PlayerSlot,
    ) {
        if !self.lockout.is_usable(player) {
            debug!("Player {} is unplugged, dropping {:?}", player, action_text);
            return;
        }

        let modifier = match (modifier, self.settings.max_modifier) {
            (Some(m), Some(max)) => Some(m.min(max)),
            (modifier, _) => modifier,
        };

        if action_text.contains(COMBO_SEPARATOR) {
            let tokens: Vec<&str> = action_text.split(COMBO_SEPARATOR).collect();
            if self.settings.combos_enabled {
                self.dispatch_combo(action_text, &tokens, author, player);
            }
            for token in tokens {
                self.dispatch_action(token, modifier, author, player);
            }
            return;
        }

        let Some(resolution) = self.aliases.resolve(action_text) else {
            trace!("Unrecognized action {:?}", action_text);
            return;
        };

        self.dispatch_resolved(action_text, resolution, modifier, author, player);
    }

    fn dispatch_combo(
        &self,
        action_text: &str,
        tokens: &[&str],
        author: Option<&str>,
        player: PlayerSlot,
    ) {
        let codes = self.combos.resolve(tokens, &self.profile, player);
        if codes.is_empty() {
            debug!("Combo {:?} has no legal tokens", action_text);
            return;
        }

        // Ungefilterte Eingabe melden, damit die Filterung nicht auffällt
        self.notify(author, action_text, player);
        debug!("Combo {:?} resolved to {:?}", action_text, codes);
        emit_combo(
            self.actuator.as_ref(),
            &codes,
            self.profile.combo_mode,
            self.settings.pacing.combo_delay_ms,
        );
    }

    fn dispatch_resolved(
        &self,
        action_text: &str,
        resolution: Resolution,
        modifier: Option<u32>,
        author: Option<&str>,
        player: PlayerSlot,
    ) {
        match resolution.kind {
            EmissionKind::Unplug => self.unplug(player),
            EmissionKind::Announce(message) => self.notify(None, message, player),
            EmissionKind::Hold => {
                if let Some(codes) = self.codes(player, resolution.action) {
                    self.notify(author, action_text, player);
                    let cycles = modifier.map_or(1, |m| m.saturating_add(1));
                    self.press(codes, cycles);
                }
            }
            EmissionKind::Tap => {
                if let Some(codes) = self.codes(player, resolution.action) {
                    self.notify(author, action_text, player);
                    self.press(codes, modifier.unwrap_or(1));
                }
            }
            EmissionKind::Pointer { direction, click } => {
                self.notify(author, action_text, player);
                self.move_pointer(direction, resolution.precision);
                if let Some(button) = click {
                    self.actuator.click(button, true);
                }
            }
            EmissionKind::Click(button) => {
                self.notify(author, action_text, player);
                self.click(button);
            }
            EmissionKind::Scroll { axis, sign } => {
                self.notify(author, action_text, player);
                self.scroll(axis, sign);
            }
        }
    }

    fn codes(&self, player: PlayerSlot, action: CanonicalAction) -> Option<&[String]> {
        let codes = self.profile.lookup(player, action);
        if codes.is_none() {
            warn!(
                "Profile {} has no codes for {} (player {})",
                self.profile.id, action, player
            );
        }
        codes
    }

    /// `cycles` volle Down/Up-Zyklen über alle Codes
    fn press(&self, codes: &[String], cycles: u32) {
        self.actuator
            .set_pace_delay(self.settings.pacing.tap_delay_ms);
        for _ in 0..cycles {
            for code in codes {
                self.actuator.key_down(code);
                self.actuator.key_up(code);
            }
        }
    }

    fn move_pointer(&self, direction: Direction, precision: bool) {
        let step = if precision {
            self.settings.pointer_step / 2
        } else {
            self.settings.pointer_step
        };
        let (mut dx, mut dy) = direction.delta(step);

        if let Some((width, height)) = self.settings.pointer_bounds {
            let (x, y) = self.actuator.cursor_position();
            dx = (x + dx).clamp(0, (width - 1).max(0)) - x;
            dy = (y + dy).clamp(0, (height - 1).max(0)) - y;
        }

        self.actuator.move_cursor(dx, dy);
    }

    fn click(&self, button: MouseButton) {
        self.actuator.click(button, false);
    }

    fn scroll(&self, axis: ScrollAxis, sign: i32) {
        self.actuator.scroll(axis, sign * self.settings.scroll_step);
    }

    fn unplug(&self, requester: PlayerSlot) {
        let outcome = self.lockout.unplug(requester);
        let target = self.settings.platforms.label(outcome.target).to_uppercase();

        self.notify(
            None,
            format!("{}'S CONTROLLER UNPLUGGED! - 🎮", target),
            requester,
        );
        self.notify(
            None,
            format!(
                "WAIT {} SECONDS OR CALL MOM - 🎮",
                self.settings.lockout_window.as_secs()
            ),
            requester,
        );
    }

    fn notify(&self, author: Option<&str>, action: impl Into<String>, player: PlayerSlot) {
        let platform = self.settings.platforms.label(player);
        self.sink.notify(Event::new(author, action, platform));
    }
}
