//! Sensor source adapter for the panel bridge.
//!
//! Acquires exactly one board, then samples each of the five panel inputs
//! with its own periodic task, pushing every reading through the shared
//! [`SyncPipeline`](panel_core::SyncPipeline).
//!
//! # Modules
//!
//! - [`board`] -- [`Board`] dispatch, acquisition, latest-value table.
//! - [`firmata`] -- `Firmata` codec and serial board driver.
//! - [`simulated`] -- Generated readings for running without hardware.
//! - [`poller`] -- Per-field polling tasks.
//! - [`error`] -- [`SensorError`].
//!
//! # Failure model
//!
//! Acquisition is attempted once. A failure is returned to the caller
//! unchanged; nothing reconnects.

pub mod board;
pub mod error;
pub mod firmata;
pub mod poller;
pub mod simulated;

pub use board::{Board, acquire};
pub use error::SensorError;
pub use poller::{SensorPollers, poll_once, spawn_pollers};
