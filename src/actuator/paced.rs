//! Channel-backed actuator adapter that enforces spacing between key toggles
//!
//! The dispatcher never waits: every command is queued as one batch and a
//! tokio worker replays the queue against the real backend, sleeping for the
//! current pace delay after each key toggle. A batch that does not fit into the
//! queue is dropped as a whole.

use super::{Actuator, ActuatorOp, MouseButton, ScrollAxis};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Pacing settings for key emission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    /// Delay between toggles of taps and holds
    pub tap_delay_ms: u64,
    /// Delay between toggles inside a combo
    pub combo_delay_ms: u64,
    /// Number of commands that may wait for the pacing worker
    pub queue_capacity: usize,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            tap_delay_ms: 60,
            combo_delay_ms: 75,
            queue_capacity: 256,
        }
    }
}

#[derive(Debug, Default)]
struct PendingBatch {
    depth: usize,
    ops: Vec<ActuatorOp>,
}

/// Non-blocking [`Actuator`] that forwards to a pacing worker
#[derive(Debug)]
pub struct PacedActuator {
    batch_sender: mpsc::Sender<Vec<ActuatorOp>>,
    pending: Mutex<PendingBatch>,
    /// Cursor position including moves that are still queued
    predicted_cursor: Mutex<(i32, i32)>,
}

impl PacedActuator {
    /// Spawns the pacing worker in front of `backend`
    ///
    /// The worker stops once every clone of the sender is gone, i.e. when the
    /// returned actuator is dropped and the queue has drained.
    pub fn spawn(backend: Arc<dyn Actuator>, settings: &PacingSettings) -> (Self, JoinHandle<()>) {
        info!("Spawning pacing worker with settings: {:?}", settings);

        let (batch_sender, batch_receiver) = mpsc::channel(settings.queue_capacity.max(1));
        let start = backend.cursor_position();
        let initial_pace = Duration::from_millis(settings.tap_delay_ms);

        let handle = tokio::spawn(run_pacing_worker(batch_receiver, backend, initial_pace));

        (
            Self {
                batch_sender,
                pending: Mutex::new(PendingBatch::default()),
                predicted_cursor: Mutex::new(start),
            },
            handle,
        )
    }

    fn pending(&self) -> MutexGuard<'_, PendingBatch> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn predicted_cursor(&self) -> MutexGuard<'_, (i32, i32)> {
        self.predicted_cursor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enqueue(&self, op: ActuatorOp) {
        let mut pending = self.pending();
        if pending.depth > 0 {
            pending.ops.push(op);
        } else {
            drop(pending);
            self.submit(vec![op]);
        }
    }

    fn submit(&self, batch: Vec<ActuatorOp>) {
        if let Err(e) = self.batch_sender.try_send(batch) {
            let batch = match e {
                mpsc::error::TrySendError::Full(batch) => {
                    warn!("Pacing queue is full, dropping {} operations", batch.len());
                    batch
                }
                mpsc::error::TrySendError::Closed(batch) => {
                    warn!("Pacing worker is gone, dropping {} operations", batch.len());
                    batch
                }
            };
            self.forget_moves(&batch);
        }
    }

    /// Nimmt Zeigerbewegungen eines verworfenen Batches aus der Vorhersage
    fn forget_moves(&self, batch: &[ActuatorOp]) {
        let mut cursor = self.predicted_cursor();
        for op in batch {
            if let ActuatorOp::MoveCursor { dx, dy } = op {
                cursor.0 -= dx;
                cursor.1 -= dy;
            }
        }
    }
}

async fn run_pacing_worker(
    mut batch_receiver: mpsc::Receiver<Vec<ActuatorOp>>,
    backend: Arc<dyn Actuator>,
    mut pace: Duration,
) {
    debug!("Pacing worker started with {:?} between toggles", pace);

    while let Some(batch) = batch_receiver.recv().await {
        for op in batch {
            trace!("Applying {}", op);
            if let ActuatorOp::SetPaceDelay(ms) = op {
                pace = Duration::from_millis(ms);
            }

            backend.apply(&op);

            if op.is_toggle() && !pace.is_zero() {
                tokio::time::sleep(pace).await;
            }
        }
    }

    info!("Pacing worker stopped, queue closed");
}

impl Actuator for PacedActuator {
    fn key_down(&self, code: &str) {
        self.enqueue(ActuatorOp::KeyDown(code.to_string()));
    }

    fn key_up(&self, code: &str) {
        self.enqueue(ActuatorOp::KeyUp(code.to_string()));
    }

    fn set_pace_delay(&self, delay_ms: u64) {
        self.enqueue(ActuatorOp::SetPaceDelay(delay_ms));
    }

    fn move_cursor(&self, dx: i32, dy: i32) {
        {
            let mut cursor = self.predicted_cursor();
            cursor.0 += dx;
            cursor.1 += dy;
        }
        self.enqueue(ActuatorOp::MoveCursor { dx, dy });
    }

    fn click(&self, button: MouseButton, double: bool) {
        self.enqueue(ActuatorOp::Click { button, double });
    }

    fn scroll(&self, axis: ScrollAxis, amount: i32) {
        self.enqueue(ActuatorOp::Scroll { axis, amount });
    }

    fn cursor_position(&self) -> (i32, i32) {
        *self.predicted_cursor()
    }

    fn begin_batch(&self) {
        self.pending().depth += 1;
    }

    fn end_batch(&self) {
        let batch = {
            let mut pending = self.pending();
            pending.depth = pending.depth.saturating_sub(1);
            if pending.depth > 0 || pending.ops.is_empty() {
                return;
            }
            std::mem::take(&mut pending.ops)
        };
        self.submit(batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{BatchGuard, RecordingActuator};
    use std::time::Instant;

    #[tokio::test]
    async fn worker_replays_in_order() {
        let backend = RecordingActuator::new();
        let settings = PacingSettings {
            tap_delay_ms: 1,
            ..PacingSettings::default()
        };
        let (paced, handle) = PacedActuator::spawn(Arc::new(backend.clone()), &settings);

        paced.key_down("a");
        paced.key_up("a");
        paced.click(MouseButton::Right, false);
        drop(paced);
        handle.await.unwrap();

        assert_eq!(
            backend.ops(),
            vec![
                ActuatorOp::KeyDown("a".into()),
                ActuatorOp::KeyUp("a".into()),
                ActuatorOp::Click {
                    button: MouseButton::Right,
                    double: false
                },
            ]
        );
    }

    #[tokio::test]
    async fn toggles_are_spaced_by_pace_delay() {
        let backend = RecordingActuator::new();
        let (paced, handle) =
            PacedActuator::spawn(Arc::new(backend.clone()), &PacingSettings::default());

        let started = Instant::now();
        paced.set_pace_delay(20);
        paced.key_down("x");
        paced.key_up("x");
        paced.key_down("x");
        drop(paced);
        handle.await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(60));
        assert_eq!(backend.toggles().len(), 3);
    }

    #[tokio::test]
    async fn cursor_prediction_includes_queued_moves() {
        let backend = RecordingActuator::with_cursor(100, 100);
        let (paced, _handle) =
            PacedActuator::spawn(Arc::new(backend), &PacingSettings::default());

        paced.move_cursor(10, -5);
        paced.move_cursor(10, 0);
        assert_eq!(paced.cursor_position(), (120, 95));
    }

    #[tokio::test]
    async fn full_queue_drops_whole_batches() {
        let backend = RecordingActuator::new();
        let settings = PacingSettings {
            tap_delay_ms: 0,
            queue_capacity: 1,
            ..PacingSettings::default()
        };
        let (paced, handle) = PacedActuator::spawn(Arc::new(backend.clone()), &settings);

        // Der Worker läuft erst beim nächsten await, die Queue fasst einen Batch
        for code in ["a", "b", "c"] {
            let _batch = BatchGuard::open(&paced);
            paced.key_down(code);
            paced.key_down("shift");
            paced.key_up(code);
            paced.key_up("shift");
        }
        drop(paced);
        handle.await.unwrap();

        assert_eq!(
            backend.toggles(),
            vec![
                ActuatorOp::KeyDown("a".into()),
                ActuatorOp::KeyDown("shift".into()),
                ActuatorOp::KeyUp("a".into()),
                ActuatorOp::KeyUp("shift".into()),
            ]
        );
    }

    #[tokio::test]
    async fn nested_batches_are_sent_once() {
        let backend = RecordingActuator::new();
        let settings = PacingSettings {
            tap_delay_ms: 0,
            queue_capacity: 1,
            ..PacingSettings::default()
        };
        let (paced, handle) = PacedActuator::spawn(Arc::new(backend.clone()), &settings);

        {
            let _outer = BatchGuard::open(&paced);
            for code in ["a", "b"] {
                let _inner = BatchGuard::open(&paced);
                paced.key_down(code);
                paced.key_up(code);
            }
        }
        drop(paced);
        handle.await.unwrap();

        assert_eq!(backend.toggles().len(), 4);
    }

    #[tokio::test]
    async fn dropped_moves_leave_the_prediction_alone() {
        let backend = RecordingActuator::with_cursor(50, 50);
        let settings = PacingSettings {
            queue_capacity: 1,
            ..PacingSettings::default()
        };
        let (paced, _handle) = PacedActuator::spawn(Arc::new(backend), &settings);

        paced.move_cursor(10, 0);
        paced.move_cursor(0, 10);
        assert_eq!(paced.cursor_position(), (60, 50));
    }
}
