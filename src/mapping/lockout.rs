//! Unplug-Sperre zwischen den beiden Spielern
//!
//! Ein Spieler kann den Controller des anderen "ausstecken". Wieder
//! eingesteckt wird nie explizit: ein Platz gilt als nutzbar, sobald das
//! gemeinsame Sperrfenster seit dem letzten Unplug abgelaufen ist.
//!
//! ```text
//!              unplug(anderer)
//! Connected ───────────────────► Disconnected
//!     ▲                               │
//!     └──── now >= last_unplug + Fenster (nur Prüfung, Flag bleibt)
//! ```
//!
//! Es gibt genau einen Zeitstempel für beide Plätze. Zwei schnelle Unplugs
//! verschiedener Plätze teilen sich deshalb ein Fenster ab dem letzten Aufruf.

use crate::mapping::PlayerSlot;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Standard-Sperrfenster nach einem Unplug
pub const DEFAULT_LOCKOUT_WINDOW: Duration = Duration::from_millis(7000);

/// Monotone Uhr, austauschbar für Tests
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manuell vorzustellende Uhr für deterministische Tests
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self
            .offset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self
            .offset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.base + offset
    }
}

/// Ergebnis eines Unplug-Aufrufs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnplugOutcome {
    /// Der ausgesteckte Platz
    pub target: PlayerSlot,
    /// `false`, wenn der Platz schon ausgesteckt war und der Timer unverändert blieb
    pub newly_disconnected: bool,
}

/// Reiner Zustand der Sperre, ohne Uhr und ohne Lock
#[derive(Debug, Clone)]
pub struct LockoutState {
    connected: [bool; 2],
    last_unplug_at: Option<Instant>,
    window: Duration,
}

impl Default for LockoutState {
    fn default() -> Self {
        Self::new(DEFAULT_LOCKOUT_WINDOW)
    }
}

impl LockoutState {
    pub fn new(window: Duration) -> Self {
        Self {
            connected: [true, true],
            last_unplug_at: None,
            window,
        }
    }

    pub fn is_connected(&self, slot: PlayerSlot) -> bool {
        self.connected[slot.index()]
    }

    pub fn last_unplug_at(&self) -> Option<Instant> {
        self.last_unplug_at
    }

    /// Nutzbar, wenn verbunden oder das Sperrfenster abgelaufen ist
    pub fn is_usable(&self, slot: PlayerSlot, now: Instant) -> bool {
        if self.connected[slot.index()] {
            return true;
        }
        match self.last_unplug_at {
            Some(at) => now >= at + self.window,
            None => true,
        }
    }

    /// Steckt den Controller des anderen Spielers aus
    pub fn unplug(&mut self, requester: PlayerSlot, now: Instant) -> UnplugOutcome {
        let target = requester.other();
        let newly_disconnected = self.connected[target.index()];

        if newly_disconnected {
            self.connected[target.index()] = false;
            self.last_unplug_at = Some(now);
        }

        UnplugOutcome {
            target,
            newly_disconnected,
        }
    }
}

/// Thread-sichere Sperre mit eingebauter Uhr
pub struct Lockout {
    state: Mutex<LockoutState>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Lockout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lockout")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Lockout {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(LockoutState::new(window)),
            clock,
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LockoutState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_usable(&self, slot: PlayerSlot) -> bool {
        let now = self.clock.now();
        self.state().is_usable(slot, now)
    }

    pub fn unplug(&self, requester: PlayerSlot) -> UnplugOutcome {
        let now = self.clock.now();
        let outcome = self.state().unplug(requester, now);
        if outcome.newly_disconnected {
            info!("Player {} unplugged player {}", requester, outcome.target);
        } else {
            debug!(
                "Player {} already unplugged, timer unchanged",
                outcome.target
            );
        }
        outcome
    }

    /// Kopie des aktuellen Zustands
    pub fn snapshot(&self) -> LockoutState {
        self.state().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lockout() -> (Lockout, ManualClock) {
        let clock = ManualClock::new();
        (
            Lockout::new(DEFAULT_LOCKOUT_WINDOW, Arc::new(clock.clone())),
            clock,
        )
    }

    #[test]
    fn both_slots_start_usable() {
        let (lockout, _) = lockout();
        assert!(lockout.is_usable(PlayerSlot::One));
        assert!(lockout.is_usable(PlayerSlot::Two));
    }

    #[test]
    fn unplug_disables_the_other_slot() {
        let (lockout, _) = lockout();
        let outcome = lockout.unplug(PlayerSlot::One);
        assert_eq!(outcome.target, PlayerSlot::Two);
        assert!(outcome.newly_disconnected);
        assert!(lockout.is_usable(PlayerSlot::One));
        assert!(!lockout.is_usable(PlayerSlot::Two));
    }

    #[test]
    fn window_expires_without_reconnecting() {
        let (lockout, clock) = lockout();
        lockout.unplug(PlayerSlot::One);

        clock.advance(Duration::from_millis(6999));
        assert!(!lockout.is_usable(PlayerSlot::Two));

        clock.advance(Duration::from_millis(1));
        assert!(lockout.is_usable(PlayerSlot::Two));
        assert!(!lockout.snapshot().is_connected(PlayerSlot::Two));
    }

    #[test]
    fn repeated_unplug_keeps_the_timer() {
        let (lockout, clock) = lockout();
        lockout.unplug(PlayerSlot::One);
        let first = lockout.snapshot().last_unplug_at();

        clock.advance(Duration::from_millis(3000));
        let outcome = lockout.unplug(PlayerSlot::One);
        assert!(!outcome.newly_disconnected);
        assert_eq!(lockout.snapshot().last_unplug_at(), first);

        clock.advance(Duration::from_millis(4000));
        assert!(lockout.is_usable(PlayerSlot::Two));
    }

    #[test]
    fn unplugs_of_both_slots_share_one_window() {
        let (lockout, clock) = lockout();
        lockout.unplug(PlayerSlot::One);
        clock.advance(Duration::from_millis(5000));
        lockout.unplug(PlayerSlot::Two);

        // Das Fenster von Spieler 2 wurde durch den zweiten Unplug verlängert
        clock.advance(Duration::from_millis(2500));
        assert!(!lockout.is_usable(PlayerSlot::One));
        assert!(!lockout.is_usable(PlayerSlot::Two));

        clock.advance(Duration::from_millis(4500));
        assert!(lockout.is_usable(PlayerSlot::One));
        assert!(lockout.is_usable(PlayerSlot::Two));
    }
}
