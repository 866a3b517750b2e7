//! Channels, change events and the messages pushed to viewers.
//!
//! A [`ChangeEvent`] always carries the whole snapshot. Viewers never see it
//! directly: the hub projects it into a [`ChannelMessage`], a flat object
//! holding only the fields of the resolved channel.
//!
//! ```json
//! {"channel":"state","accelerator":512,"brake":0}
//! {"channel":"alert","drs":true,"rollBar":false,"glv":false}
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::field::Field;
use crate::state::PanelState;

/// Logical category of a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Channel {
    /// Pedal telemetry (accelerator, brake).
    State,
    /// Switch changes (drs, rollBar, glv).
    Alert,
}

impl Channel {
    /// Wire name of the channel.
    pub const fn name(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Alert => "alert",
        }
    }

    /// The fields a viewer reads from messages on this channel.
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::State => &[Field::Accelerator, Field::Brake],
            Self::Alert => &[Field::Drs, Field::RollBar, Field::Glv],
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one change-detection cycle that found at least one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Sequence number of the cycle that produced the event.
    pub cycle: u64,
    /// Channel resolved for the cycle (last changed field wins).
    pub channel: Channel,
    /// Fields that differed from the prior snapshot, in detection order.
    pub changed: Vec<Field>,
    /// The full snapshot at commit time.
    pub snapshot: PanelState,
}

impl ChangeEvent {
    /// Project the event onto the message viewers receive.
    pub const fn message(&self) -> ChannelMessage {
        ChannelMessage::project(self.channel, &self.snapshot)
    }
}

/// A message pushed to every connected viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "channel", rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ChannelMessage {
    /// Pedal telemetry.
    State {
        /// Accelerator magnitude.
        accelerator: i32,
        /// Brake magnitude.
        brake: i32,
    },
    /// Switch levels.
    Alert {
        /// DRS switch level.
        drs: bool,
        /// Roll bar switch level.
        #[serde(rename = "rollBar")]
        roll_bar: bool,
        /// GLV switch level.
        glv: bool,
    },
}

impl ChannelMessage {
    /// Build the payload of `channel` from a snapshot.
    pub const fn project(channel: Channel, snapshot: &PanelState) -> Self {
        match channel {
            Channel::State => Self::State {
                accelerator: snapshot.accelerator,
                brake: snapshot.brake,
            },
            Channel::Alert => Self::Alert {
                drs: snapshot.drs,
                roll_bar: snapshot.roll_bar,
                glv: snapshot.glv,
            },
        }
    }

    /// The channel this message travels on.
    pub const fn channel(&self) -> Channel {
        match self {
            Self::State { .. } => Channel::State,
            Self::Alert { .. } => Channel::Alert,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn state_message_is_flat() {
        let snapshot = PanelState {
            accelerator: 512,
            ..PanelState::default()
        };
        let msg = ChannelMessage::project(Channel::State, &snapshot);
        let value = serde_json::to_value(msg).unwrap_or_default();
        assert_eq!(
            value,
            json!({"channel": "state", "accelerator": 512, "brake": 0})
        );
    }

    #[test]
    fn alert_message_uses_wire_names() {
        let snapshot = PanelState {
            accelerator: 300,
            drs: true,
            ..PanelState::default()
        };
        let msg = ChannelMessage::project(Channel::Alert, &snapshot);
        let value = serde_json::to_value(msg).unwrap_or_default();
        assert_eq!(
            value,
            json!({"channel": "alert", "drs": true, "rollBar": false, "glv": false})
        );
    }

    #[test]
    fn message_parses_back_from_wire() {
        let parsed: Result<ChannelMessage, _> =
            serde_json::from_str(r#"{"channel":"alert","drs":false,"rollBar":true,"glv":true}"#);
        assert!(matches!(
            parsed,
            Ok(ChannelMessage::Alert {
                drs: false,
                roll_bar: true,
                glv: true
            })
        ));
    }

    #[test]
    fn event_projects_its_own_channel() {
        let event = ChangeEvent {
            cycle: 3,
            channel: Channel::Alert,
            changed: vec![Field::Brake, Field::Glv],
            snapshot: PanelState {
                brake: 100,
                glv: true,
                ..PanelState::default()
            },
        };
        assert_eq!(event.message().channel(), Channel::Alert);
    }

    #[test]
    fn channel_fields_cover_every_field_once() {
        let mut all: Vec<Field> = Channel::State
            .fields()
            .iter()
            .chain(Channel::Alert.fields())
            .copied()
            .collect();
        all.sort();
        assert_eq!(all, Field::ALL);
    }
}
