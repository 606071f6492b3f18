use super::{Actuator, MouseButton, ScrollAxis};
use std::sync::Mutex;
use tracing::info;

/// Backend without side effects, logs every operation
///
/// Keeps a virtual cursor so pointer bounds behave as they would against a
/// real screen.
#[derive(Debug, Default)]
pub struct DryRunActuator {
    cursor: Mutex<(i32, i32)>,
}

impl DryRunActuator {
    pub fn new(start: (i32, i32)) -> Self {
        Self {
            cursor: Mutex::new(start),
        }
    }
}

impl Actuator for DryRunActuator {
    fn key_down(&self, code: &str) {
        info!("key down: {}", code);
    }

    fn key_up(&self, code: &str) {
        info!("key up: {}", code);
    }

    fn set_pace_delay(&self, _delay_ms: u64) {}

    fn move_cursor(&self, dx: i32, dy: i32) {
        let mut cursor = self
            .cursor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cursor.0 += dx;
        cursor.1 += dy;
        info!("cursor moved by ({}, {}) to {:?}", dx, dy, *cursor);
    }

    fn click(&self, button: MouseButton, double: bool) {
        info!("click {:?} (double: {})", button, double);
    }

    fn scroll(&self, axis: ScrollAxis, amount: i32) {
        info!("scroll {:?} by {}", axis, amount);
    }

    fn cursor_position(&self) -> (i32, i32) {
        *self
            .cursor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
