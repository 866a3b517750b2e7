//! One-shot staged reveal sequencer for viewers.
//!
//! A viewer runs its start-up animation once, on the first channel message it
//! receives. The stages form a strict chain: each stage is scheduled only
//! after the previous one has fired, so the start time of stage `i` is the
//! sum of the delays of stages `0..=i`.
//!
//! ```text
//! Idle --trigger--> Pending(0) --timer--> Pending(1) --timer--> ... --timer--> Done
//! ```
//!
//! Later messages never re-arm the sequencer; live values are rendered by the
//! per-field bindings established in [`RevealStage::BindAnimations`].
//!
//! The bridge itself never animates anything. This is the reference runner
//! for viewer clients: browser viewers fetch the same step list from
//! `GET /api/reveal-plan` and must reproduce the timing [`RevealSequencer::run`]
//! produces here. Native viewers can embed it directly.

use std::time::Duration;

use panel_types::{RevealStage, RevealStep};

/// Where the sequencer is in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Waiting for the first message.
    Idle,
    /// The timer for stage `n` is running.
    Pending(usize),
    /// Every stage has fired. Terminal.
    Done,
}

/// A stage whose timer expired, plus the delay before the next stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageFired {
    /// The stage to execute now.
    pub stage: RevealStage,
    /// Delay before the following stage, `None` after the last one.
    pub next_delay: Option<Duration>,
}

/// Drives an ordered list of `(delay, stage)` pairs exactly once.
#[derive(Debug, Clone)]
pub struct RevealSequencer {
    steps: Vec<RevealStep>,
    state: SequencerState,
}

impl RevealSequencer {
    /// Create an idle sequencer for `steps`.
    pub const fn new(steps: Vec<RevealStep>) -> Self {
        Self {
            steps,
            state: SequencerState::Idle,
        }
    }

    /// Current state.
    pub const fn state(&self) -> SequencerState {
        self.state
    }

    /// The configured chain.
    pub fn steps(&self) -> &[RevealStep] {
        &self.steps
    }

    /// Arm the sequencer on a received message.
    ///
    /// Returns the delay before the first stage the first time it is called.
    /// Every later call returns `None` and changes nothing. An empty chain
    /// goes straight to [`SequencerState::Done`].
    pub fn trigger(&mut self) -> Option<Duration> {
        if self.state != SequencerState::Idle {
            return None;
        }
        match self.steps.first() {
            Some(step) => {
                self.state = SequencerState::Pending(0);
                Some(Duration::from_millis(step.delay_ms))
            }
            None => {
                self.state = SequencerState::Done;
                None
            }
        }
    }

    /// The pending stage's timer expired: fire it and move on.
    ///
    /// Returns `None` when no stage is pending.
    pub fn advance(&mut self) -> Option<StageFired> {
        let SequencerState::Pending(index) = self.state else {
            return None;
        };
        let stage = self.steps.get(index)?.stage;
        let next = index.saturating_add(1);
        let next_delay = match self.steps.get(next) {
            Some(step) => {
                self.state = SequencerState::Pending(next);
                Some(Duration::from_millis(step.delay_ms))
            }
            None => {
                self.state = SequencerState::Done;
                None
            }
        };
        Some(StageFired { stage, next_delay })
    }

    /// Trigger the sequencer and run the whole chain, sleeping between stages
    /// and calling `on_stage` as each one fires.
    ///
    /// Returns immediately if the sequencer was already triggered.
    pub async fn run<F>(&mut self, mut on_stage: F)
    where
        F: FnMut(RevealStage),
    {
        let Some(mut delay) = self.trigger() else {
            return;
        };
        loop {
            tokio::time::sleep(delay).await;
            let Some(fired) = self.advance() else {
                return;
            };
            on_stage(fired.stage);
            match fired.next_delay {
                Some(next) => delay = next,
                None => return,
            }
        }
    }
}
