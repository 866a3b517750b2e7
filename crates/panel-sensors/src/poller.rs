//! Per-field polling tasks feeding the sync pipeline.
//!
//! Each field gets its own periodic task. On every tick the task reads the
//! field's latest raw value from the board and runs one pipeline cycle with
//! it. Fields are never batched: concurrent ticks become separate cycles,
//! serialized by the pipeline's lock.

use std::sync::Arc;
use std::time::Duration;

use panel_core::SyncPipeline;
use panel_types::{ChangeEvent, Field};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::board::Board;

/// Handles of the running pollers. Dropping it stops them.
#[derive(Debug)]
pub struct SensorPollers {
    handles: Vec<(Field, JoinHandle<()>)>,
}

impl SensorPollers {
    /// Fields with a running poller, in spawn order.
    pub fn fields(&self) -> Vec<Field> {
        self.handles.iter().map(|(field, _)| *field).collect()
    }

    /// Stop every poller.
    pub fn abort_all(&self) {
        for (_, handle) in &self.handles {
            handle.abort();
        }
    }
}

impl Drop for SensorPollers {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Run one cycle for `field` with the board's latest value.
///
/// Returns the published event, if any. A field the board has not reported
/// yet is skipped; a rejected reading is logged and dropped.
pub fn poll_once(board: &Board, pipeline: &SyncPipeline, field: Field) -> Option<ChangeEvent> {
    let value = board.read(field)?;
    match pipeline.mutate(field, value) {
        Ok(event) => event,
        Err(e) => {
            warn!(%field, %value, error = %e, "board produced an unusable reading");
            None
        }
    }
}

/// Spawn one polling task per field.
///
/// Must be called from within a Tokio runtime. A zero interval is treated
/// as one millisecond.
pub fn spawn_pollers(
    board: Arc<Board>,
    pipeline: Arc<SyncPipeline>,
    sampling_interval: Duration,
) -> SensorPollers {
    let period = sampling_interval.max(Duration::from_millis(1));
    let handles = Field::ALL
        .into_iter()
        .map(|field| {
            let board = Arc::clone(&board);
            let pipeline = Arc::clone(&pipeline);
            let handle = tokio::spawn(async move {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    poll_once(&board, &pipeline, field);
                }
            });
            (field, handle)
        })
        .collect();

    info!(
        board = board.name(),
        interval_ms = period.as_millis(),
        "sensor pollers started"
    );
    SensorPollers { handles }
}
