//! The Change Detector: decides whether a cycle broadcasts and on which channel.
//!
//! # Channel resolution
//!
//! Fields are walked once per cycle in [`Field::ALL`] order. Every changed
//! field overwrites the cycle's channel with its own category, so when a
//! cycle changes fields of both categories the *last* changed field decides.
//! A cycle that moves the accelerator and flips DRS therefore goes out on
//! [`Channel::Alert`] only, and the accelerator value reaches viewers on the
//! next `state` cycle. This routing is relied upon by viewers and is kept
//! as-is.

use panel_types::{ChangeEvent, Channel, Field, PanelState};

/// Compares each committed snapshot with a private prior copy.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    /// Last values seen per field. Only this detector reads or writes it.
    prior: PanelState,
    /// Number of cycles run so far.
    cycles: u64,
}

impl ChangeDetector {
    /// Create a detector whose prior snapshot is `initial`.
    pub const fn new(initial: PanelState) -> Self {
        Self {
            prior: initial,
            cycles: 0,
        }
    }

    /// Run one detection cycle against `current`.
    ///
    /// Returns `None` when no field differs from the prior snapshot.
    /// Otherwise the prior copy is brought up to date and a single
    /// [`ChangeEvent`] carrying the whole of `current` is returned.
    pub fn detect(&mut self, current: &PanelState) -> Option<ChangeEvent> {
        self.cycles = self.cycles.wrapping_add(1);

        let mut channel: Option<Channel> = None;
        let mut changed = Vec::new();

        for field in Field::ALL {
            if current.get(field) != self.prior.get(field) {
                self.prior.copy_field(field, current);
                changed.push(field);
                channel = Some(field.channel());
            }
        }

        let channel = channel?;
        Some(ChangeEvent {
            cycle: self.cycles,
            channel,
            changed,
            snapshot: *current,
        })
    }

    /// The prior snapshot as of the last cycle.
    pub const fn prior(&self) -> &PanelState {
        &self.prior
    }

    /// Number of cycles run, including those that emitted nothing.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use panel_types::FieldValue;

    use super::*;

    fn with(field: Field, value: FieldValue) -> PanelState {
        let mut state = PanelState::default();
        assert!(state.set(field, value).is_ok());
        state
    }

    #[test]
    fn single_field_routes_by_category() {
        let cases = [
            (Field::Accelerator, FieldValue::Analog(1), Channel::State),
            (Field::Brake, FieldValue::Analog(1), Channel::State),
            (Field::Drs, FieldValue::Digital(true), Channel::Alert),
            (Field::RollBar, FieldValue::Digital(true), Channel::Alert),
            (Field::Glv, FieldValue::Digital(true), Channel::Alert),
        ];
        for (field, value, expected) in cases {
            let mut detector = ChangeDetector::default();
            let event = detector.detect(&with(field, value));
            assert_eq!(event.as_ref().map(|e| e.channel), Some(expected), "{field}");
            assert_eq!(event.map(|e| e.changed), Some(vec![field]));
        }
    }

    #[test]
    fn unchanged_cycle_emits_nothing() {
        let mut detector = ChangeDetector::default();
        assert!(detector.detect(&PanelState::default()).is_none());
        assert_eq!(detector.cycles(), 1);
    }

    #[test]
    fn same_value_twice_emits_once() {
        let mut detector = ChangeDetector::default();
        let state = with(Field::Accelerator, FieldValue::Analog(512));
        assert!(detector.detect(&state).is_some());
        assert!(detector.detect(&state).is_none());
    }

    #[test]
    fn last_changed_field_decides_channel() {
        let mut detector = ChangeDetector::default();
        let state = PanelState {
            accelerator: 700,
            drs: true,
            ..PanelState::default()
        };
        let event = detector.detect(&state);
        assert_eq!(event.as_ref().map(|e| e.channel), Some(Channel::Alert));
        assert_eq!(
            event.map(|e| e.changed),
            Some(vec![Field::Accelerator, Field::Drs])
        );
    }

    #[test]
    fn prior_tracks_every_changed_field() {
        let mut detector = ChangeDetector::default();
        let state = PanelState {
            brake: 100,
            glv: true,
            ..PanelState::default()
        };
        let _ = detector.detect(&state);
        assert_eq!(detector.prior(), &state);
    }

    #[test]
    fn event_carries_full_snapshot() {
        let mut detector = ChangeDetector::default();
        let first = with(Field::Accelerator, FieldValue::Analog(512));
        let _ = detector.detect(&first);

        let mut second = first;
        second.drs = true;
        let event = detector.detect(&second);
        assert_eq!(event.map(|e| e.snapshot), Some(second));
    }
}
