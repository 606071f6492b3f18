//! Actuator subsystem: the seam to the keyboard/mouse emulation backend
//!
//! The translation core only talks to the [`Actuator`] trait. Pacing between key
//! toggles is part of the contract: the core announces the delay through
//! [`Actuator::set_pace_delay`] and the adapter keeps consecutive toggles at
//! least that far apart.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher ──► PacedActuator ──(mpsc)──► pacing worker ──► backend
//!                (non-blocking)            (sleeps between toggles)
//! ```
//!
//! Calls made between [`Actuator::begin_batch`] and [`Actuator::end_batch`]
//! belong to one command and reach the backend completely or not at all, so an
//! accepted key-down is always followed by its key-up.
//!
//! 1. [`paced`] - Channel-backed adapter with a tokio pacing worker
//! 2. [`dry_run`] - Backend that only logs, used when no OS backend is wired in
//! 3. [`recording`] - Backend that records every call, used by tests

pub mod dry_run;
pub mod paced;
pub mod recording;

pub use dry_run::DryRunActuator;
pub use paced::{PacedActuator, PacingSettings};
pub use recording::RecordingActuator;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
}

/// Pointer movement direction in screen coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Relative pointer offset for a step of `step` pixels
    pub fn delta(self, step: i32) -> (i32, i32) {
        match self {
            Direction::Up => (0, -step),
            Direction::Down => (0, step),
            Direction::Left => (-step, 0),
            Direction::Right => (step, 0),
        }
    }
}

/// A single actuator call, used wherever calls have to be queued or recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorOp {
    KeyDown(String),
    KeyUp(String),
    SetPaceDelay(u64),
    MoveCursor { dx: i32, dy: i32 },
    Click { button: MouseButton, double: bool },
    Scroll { axis: ScrollAxis, amount: i32 },
}

impl ActuatorOp {
    /// Key toggles are the operations that get paced
    pub fn is_toggle(&self) -> bool {
        matches!(self, ActuatorOp::KeyDown(_) | ActuatorOp::KeyUp(_))
    }
}

impl Display for ActuatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorOp::KeyDown(code) => write!(f, "down({code})"),
            ActuatorOp::KeyUp(code) => write!(f, "up({code})"),
            ActuatorOp::SetPaceDelay(ms) => write!(f, "pace({ms}ms)"),
            ActuatorOp::MoveCursor { dx, dy } => write!(f, "move({dx}, {dy})"),
            ActuatorOp::Click { button, double } => write!(f, "click({button:?}, double={double})"),
            ActuatorOp::Scroll { axis, amount } => write!(f, "scroll({axis:?}, {amount})"),
        }
    }
}

/// Keyboard/mouse emulation capability consumed by the dispatcher
///
/// Implementations must not block the caller for longer than it takes to
/// enqueue the operation.
pub trait Actuator: Send + Sync + 'static {
    fn key_down(&self, code: &str);

    fn key_up(&self, code: &str);

    /// Minimum spacing between the following key toggles
    fn set_pace_delay(&self, delay_ms: u64);

    fn move_cursor(&self, dx: i32, dy: i32);

    fn click(&self, button: MouseButton, double: bool);

    fn scroll(&self, axis: ScrollAxis, amount: i32);

    fn cursor_position(&self) -> (i32, i32);

    /// Opens a batch; batches may nest, only the outermost one counts
    fn begin_batch(&self) {}

    /// Closes the batch opened by the matching [`Actuator::begin_batch`]
    fn end_batch(&self) {}

    /// Replays a recorded or queued operation
    fn apply(&self, op: &ActuatorOp) {
        match op {
            ActuatorOp::KeyDown(code) => self.key_down(code),
            ActuatorOp::KeyUp(code) => self.key_up(code),
            ActuatorOp::SetPaceDelay(ms) => self.set_pace_delay(*ms),
            ActuatorOp::MoveCursor { dx, dy } => self.move_cursor(*dx, *dy),
            ActuatorOp::Click { button, double } => self.click(*button, *double),
            ActuatorOp::Scroll { axis, amount } => self.scroll(*axis, *amount),
        }
    }
}

/// Keeps a batch open on `actuator` until dropped
pub struct BatchGuard<'a> {
    actuator: &'a dyn Actuator,
}

impl<'a> BatchGuard<'a> {
    pub fn open(actuator: &'a dyn Actuator) -> Self {
        actuator.begin_batch();
        Self { actuator }
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.actuator.end_batch();
    }
}
