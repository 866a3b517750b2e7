//! Board acquisition and enum dispatch over board implementations.
//!
//! Boards fill a [`LatestReadings`] table from their own background task;
//! pollers only ever read the table. [`Board`] uses enum dispatch, the same
//! way the rest of the workspace avoids async trait objects.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use panel_core::config::{BoardKind, PanelConfig};
use panel_types::{Field, FieldValue};
use tracing::info;

use crate::error::SensorError;
use crate::firmata::FirmataBoard;
use crate::simulated::SimulatedBoard;

/// Most recent raw value reported for each field.
///
/// A field is absent until the board reports it for the first time.
#[derive(Debug, Default)]
pub struct LatestReadings {
    values: RwLock<BTreeMap<Field, FieldValue>>,
}

impl LatestReadings {
    /// Latest value of `field`.
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&field)
            .copied()
    }

    /// Record a new value for `field`.
    pub fn set(&self, field: Field, value: FieldValue) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(field, value);
    }
}

/// An acquired hardware channel.
#[derive(Debug)]
pub enum Board {
    /// A `StandardFirmata` board on a serial device.
    Firmata(FirmataBoard),
    /// Generated readings.
    Simulated(SimulatedBoard),
}

impl Board {
    /// Latest raw value of `field`, if one has been reported.
    pub fn read(&self, field: Field) -> Option<FieldValue> {
        match self {
            Self::Firmata(board) => board.read(field),
            Self::Simulated(board) => board.read(field),
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Firmata(_) => "firmata",
            Self::Simulated(_) => "simulated",
        }
    }
}

/// Acquire the board selected by the configuration.
///
/// Called once at startup. There is no retry: the first failure is returned
/// and the caller decides whether to carry on without sensor input.
///
/// # Errors
///
/// Returns [`SensorError::Disabled`] when the board kind is `disabled`, or
/// whatever the `Firmata` handshake fails with.
pub async fn acquire(config: &PanelConfig) -> Result<Board, SensorError> {
    let board = match config.sensors.board {
        BoardKind::Firmata => Board::Firmata(FirmataBoard::open(&config.sensors).await?),
        BoardKind::Simulated => Board::Simulated(SimulatedBoard::start(&config.simulation)),
        BoardKind::Disabled => return Err(SensorError::Disabled),
    };
    info!(board = board.name(), "sensor board acquired");
    Ok(board)
}
