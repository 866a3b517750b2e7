//! Wire types for the viewer start-up sequence.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One visual stage of the viewer start-up sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum RevealStage {
    /// Animate the gauge border and zero the speed readout.
    RevealPrimary,
    /// Start the opacity animation on the secondary indicator group.
    FadeInSecondary,
    /// Pin the secondary group at full opacity.
    ShowSecondary,
    /// Bind the per-field animations (speed, battery, drs, rollBar, glv).
    BindAnimations,
    /// Apply the final gauge stroke geometry.
    ApplyGaugeGeometry,
}

impl RevealStage {
    /// Every stage, in execution order.
    pub const ALL: [Self; 5] = [
        Self::RevealPrimary,
        Self::FadeInSecondary,
        Self::ShowSecondary,
        Self::BindAnimations,
        Self::ApplyGaugeGeometry,
    ];
}

/// A stage together with the delay that must elapse after the previous stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RevealStep {
    /// The stage to run.
    pub stage: RevealStage,
    /// Milliseconds to wait after the previous stage (or the trigger).
    pub delay_ms: u64,
}
