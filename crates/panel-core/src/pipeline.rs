//! The serialized mutate -> diff -> publish cycle.
//!
//! [`SyncPipeline`] keeps the [`StateStore`] and the [`ChangeDetector`]
//! behind one mutex so that a cycle is atomic with respect to every other
//! cycle, no matter how many polling tasks call into it concurrently. The
//! pipeline knows nothing about viewers: it hands each event to a
//! [`ChangeSink`], which must not block.

use std::sync::{Arc, Mutex, PoisonError};

use panel_types::{ChangeEvent, Field, FieldValue, PanelState};
use tracing::debug;

use crate::detector::ChangeDetector;
use crate::store::{StateStore, StoreError};

/// Receiver of change events, invoked inside the cycle's critical section.
///
/// Implementations must return promptly: a sink that blocks stalls every
/// sensor poller.
pub trait ChangeSink: Send + Sync {
    /// Called once per cycle that produced a change.
    fn publish(&self, event: &ChangeEvent);
}

/// A sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ChangeSink for NoOpSink {
    fn publish(&self, _event: &ChangeEvent) {}
}

struct Cycle {
    store: StateStore,
    detector: ChangeDetector,
}

/// Owner of the live panel state and of the cycle that publishes it.
///
/// Created once at startup and shared by handle (`Arc<SyncPipeline>`) with
/// every sensor poller.
pub struct SyncPipeline {
    cycle: Mutex<Cycle>,
    sink: Arc<dyn ChangeSink>,
}

impl SyncPipeline {
    /// Create a pipeline whose store and prior snapshot both start at `initial`.
    pub fn new(initial: PanelState, sink: Arc<dyn ChangeSink>) -> Self {
        Self {
            cycle: Mutex::new(Cycle {
                store: StateStore::new(initial),
                detector: ChangeDetector::new(initial),
            }),
            sink,
        }
    }

    /// Run one cycle for a single sensor reading.
    ///
    /// Returns the event that was published, if the reading changed anything.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the value's kind does not match the field.
    pub fn mutate(
        &self,
        field: Field,
        value: FieldValue,
    ) -> Result<Option<ChangeEvent>, StoreError> {
        self.apply(&[(field, value)])
    }

    /// Run one cycle that applies several readings before diffing.
    ///
    /// All readings are checked before any is stored, so a rejected batch
    /// leaves the state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for the first reading whose kind does not match
    /// its field.
    pub fn apply(
        &self,
        readings: &[(Field, FieldValue)],
    ) -> Result<Option<ChangeEvent>, StoreError> {
        let mut cycle = self.cycle.lock().unwrap_or_else(PoisonError::into_inner);

        let mut staged = cycle.store.clone();
        for &(field, value) in readings {
            staged.mutate(field, value)?;
        }
        cycle.store = staged;

        let snapshot = cycle.store.snapshot();
        let event = cycle.detector.detect(&snapshot);
        if let Some(event) = &event {
            debug!(
                cycle = event.cycle,
                channel = %event.channel,
                changed = ?event.changed,
                "panel state changed"
            );
            self.sink.publish(event);
        }
        Ok(event)
    }

    /// Copy of the current panel state.
    pub fn snapshot(&self) -> PanelState {
        self.cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .store
            .snapshot()
    }
}

impl core::fmt::Debug for SyncPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncPipeline")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}
