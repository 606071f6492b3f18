use super::{Actuator, ActuatorOp, MouseButton, ScrollAxis};
use std::sync::{Arc, Mutex};

/// Backend that records every call in order
///
/// Clones share the same log, so a test can hand one clone to the dispatcher
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    ops: Arc<Mutex<Vec<ActuatorOp>>>,
    cursor: Arc<Mutex<(i32, i32)>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the cursor at the given position
    pub fn with_cursor(x: i32, y: i32) -> Self {
        let actuator = Self::default();
        *lock(&actuator.cursor) = (x, y);
        actuator
    }

    pub fn ops(&self) -> Vec<ActuatorOp> {
        lock(&self.ops).clone()
    }

    /// Only key toggles, without pacing hints or mouse operations
    pub fn toggles(&self) -> Vec<ActuatorOp> {
        lock(&self.ops)
            .iter()
            .filter(|op| op.is_toggle())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.ops).clear();
    }

    fn push(&self, op: ActuatorOp) {
        lock(&self.ops).push(op);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Actuator for RecordingActuator {
    fn key_down(&self, code: &str) {
        self.push(ActuatorOp::KeyDown(code.to_string()));
    }

    fn key_up(&self, code: &str) {
        self.push(ActuatorOp::KeyUp(code.to_string()));
    }

    fn set_pace_delay(&self, delay_ms: u64) {
        self.push(ActuatorOp::SetPaceDelay(delay_ms));
    }

    fn move_cursor(&self, dx: i32, dy: i32) {
        let mut cursor = lock(&self.cursor);
        cursor.0 += dx;
        cursor.1 += dy;
        drop(cursor);
        self.push(ActuatorOp::MoveCursor { dx, dy });
    }

    fn click(&self, button: MouseButton, double: bool) {
        self.push(ActuatorOp::Click { button, double });
    }

    fn scroll(&self, axis: ScrollAxis, amount: i32) {
        self.push(ActuatorOp::Scroll { axis, amount });
    }

    fn cursor_position(&self) -> (i32, i32) {
        *lock(&self.cursor)
    }
}
