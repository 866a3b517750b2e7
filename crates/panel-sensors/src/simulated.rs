//! Simulated board for running viewers without hardware.
//!
//! The accelerator sweeps upward by `accelerator_step` every step and wraps
//! at `accelerator_wrap`; the brake follows at half the accelerator; each
//! switch flips with `toggle_probability` per step.

use std::sync::Arc;

use panel_core::config::SimulationConfig;
use panel_types::{Field, FieldKind, FieldValue};
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::debug;

use crate::board::LatestReadings;

/// Advances the simulated readings one step at a time.
#[derive(Debug, Clone)]
pub struct SimulationStepper {
    config: SimulationConfig,
    step: i64,
}

impl SimulationStepper {
    /// Create a stepper at step zero.
    pub const fn new(config: SimulationConfig) -> Self {
        Self { config, step: 0 }
    }

    /// Write the power-on values of every field into `latest`.
    pub fn seed(latest: &LatestReadings) {
        for field in Field::ALL {
            let value = match field.kind() {
                FieldKind::Analog => FieldValue::Analog(0),
                FieldKind::Digital => FieldValue::Digital(false),
            };
            latest.set(field, value);
        }
    }

    /// Advance one step and write the new readings into `latest`.
    pub fn advance<R: Rng>(&mut self, latest: &LatestReadings, rng: &mut R) {
        self.step = self.step.wrapping_add(1);

        let raw = self.step.wrapping_mul(i64::from(self.config.accelerator_step));
        let wrapped = if self.config.accelerator_wrap > 0 {
            raw.rem_euclid(i64::from(self.config.accelerator_wrap))
        } else {
            raw
        };
        let accelerator = i32::try_from(wrapped).unwrap_or(i32::MAX);
        latest.set(Field::Accelerator, FieldValue::Analog(accelerator));
        latest.set(Field::Brake, FieldValue::Analog(accelerator / 2));

        let p = if self.config.toggle_probability.is_nan() {
            0.0
        } else {
            self.config.toggle_probability.clamp(0.0, 1.0)
        };
        for field in [Field::Drs, Field::RollBar, Field::Glv] {
            if rng.random_bool(p) {
                let current = matches!(latest.get(field), Some(FieldValue::Digital(true)));
                latest.set(field, FieldValue::Digital(!current));
            }
        }
    }
}

/// A board whose readings are generated on a timer.
#[derive(Debug)]
pub struct SimulatedBoard {
    latest: Arc<LatestReadings>,
    stepper: JoinHandle<()>,
}

impl SimulatedBoard {
    /// Seed the readings and start the stepping task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: &SimulationConfig) -> Self {
        let latest = Arc::new(LatestReadings::default());
        SimulationStepper::seed(&latest);

        let period = config.step_interval().max(Duration::from_millis(1));
        let mut stepper = SimulationStepper::new(config.clone());
        let table = Arc::clone(&latest);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; readings start at the seed.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                stepper.advance(&table, &mut rand::rng());
                debug!(accelerator = ?table.get(Field::Accelerator), "simulation step");
            }
        });

        Self {
            latest,
            stepper: handle,
        }
    }

    /// Latest simulated value of `field`.
    pub fn read(&self, field: Field) -> Option<FieldValue> {
        self.latest.get(field)
    }
}

impl Drop for SimulatedBoard {
    fn drop(&mut self) {
        self.stepper.abort();
    }
}
