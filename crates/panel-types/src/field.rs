//! Panel field identifiers and raw field values.
//!
//! The panel exposes exactly five inputs. [`Field::ALL`] fixes the order in
//! which change detection walks them; that order is part of the routing
//! contract (see [`Channel`] and the change detector in `panel-core`).

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::channel::Channel;

/// One logical input line of the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Field {
    /// Accelerator pedal position (analog).
    Accelerator,
    /// Brake pedal pressure (analog).
    Brake,
    /// Drag reduction system switch (digital).
    Drs,
    /// Roll bar switch (digital).
    RollBar,
    /// Grounded low voltage master switch (digital).
    Glv,
}

impl Field {
    /// Every field, in change-detection order.
    pub const ALL: [Self; 5] = [
        Self::Accelerator,
        Self::Brake,
        Self::Drs,
        Self::RollBar,
        Self::Glv,
    ];

    /// Whether the field is sampled as an analog magnitude or a digital level.
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Accelerator | Self::Brake => FieldKind::Analog,
            Self::Drs | Self::RollBar | Self::Glv => FieldKind::Digital,
        }
    }

    /// The channel a change to this field routes to.
    pub const fn channel(self) -> Channel {
        match self {
            Self::Accelerator | Self::Brake => Channel::State,
            Self::Drs | Self::RollBar | Self::Glv => Channel::Alert,
        }
    }

    /// Stable wire name of the field.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Accelerator => "accelerator",
            Self::Brake => "brake",
            Self::Drs => "drs",
            Self::RollBar => "rollBar",
            Self::Glv => "glv",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a panel field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown panel field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    /// Accepts the wire name (`rollBar`) as well as the snake-case form used
    /// in configuration files (`roll_bar`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accelerator" => Ok(Self::Accelerator),
            "brake" => Ok(Self::Brake),
            "drs" => Ok(Self::Drs),
            "rollBar" | "roll_bar" => Ok(Self::RollBar),
            "glv" => Ok(Self::Glv),
            other => Err(UnknownField(other.to_owned())),
        }
    }
}

/// Sampling category of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Continuous magnitude read from an ADC channel.
    Analog,
    /// HIGH/LOW level read from a digital pin.
    Digital,
}

/// A raw reading for one field.
///
/// Analog magnitudes are not range-checked anywhere in the pipeline; the
/// hardware adapter owns the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Analog magnitude (typically 0-1023).
    Analog(i32),
    /// Digital level, `true` for HIGH.
    Digital(bool),
}

impl FieldValue {
    /// The kind of field this value can be stored in.
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Analog(_) => FieldKind::Analog,
            Self::Digital(_) => FieldKind::Digital,
        }
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Analog(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Digital(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analog(v) => write!(f, "{v}"),
            Self::Digital(v) => write!(f, "{v}"),
        }
    }
}
