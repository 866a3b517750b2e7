//! The State Store: sole owner of the live [`PanelState`].
//!
//! [`StateStore::mutate`] is the only way panel state changes. It performs no
//! range validation; analog magnitudes outside the ADC domain are stored as
//! given.

use panel_types::{Field, FieldValue, KindMismatch, PanelState};

/// Errors that can occur when mutating the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The value's kind does not match the field's kind.
    #[error("rejected mutation: {source}")]
    KindMismatch {
        /// The underlying mismatch.
        #[from]
        source: KindMismatch,
    },
}

/// Holds the single current panel snapshot.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    state: PanelState,
}

impl StateStore {
    /// Create a store seeded with `initial`.
    pub const fn new(initial: PanelState) -> Self {
        Self { state: initial }
    }

    /// Set one field in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if `value` is of the wrong kind
    /// for `field`; the store is unchanged.
    pub fn mutate(&mut self, field: Field, value: FieldValue) -> Result<(), StoreError> {
        self.state.set(field, value)?;
        Ok(())
    }

    /// Immutable copy of the current state, taken at commit time.
    pub const fn snapshot(&self) -> PanelState {
        self.state
    }
}
