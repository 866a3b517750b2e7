//! The authoritative panel snapshot.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::field::{Field, FieldKind, FieldValue};

/// Current values of every panel input.
///
/// The default value is the power-on state: both pedals at zero and all
/// switches LOW.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PanelState {
    /// Accelerator magnitude.
    pub accelerator: i32,
    /// Brake magnitude.
    pub brake: i32,
    /// DRS switch level.
    pub drs: bool,
    /// Roll bar switch level.
    pub roll_bar: bool,
    /// GLV switch level.
    pub glv: bool,
}

/// A value of the wrong kind was offered for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("field {field} is {expected:?}, got {value}")]
pub struct KindMismatch {
    /// The field that was targeted.
    pub field: Field,
    /// The kind the field stores.
    pub expected: FieldKind,
    /// The rejected value.
    pub value: FieldValue,
}

impl PanelState {
    /// Read one field.
    pub const fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Accelerator => FieldValue::Analog(self.accelerator),
            Field::Brake => FieldValue::Analog(self.brake),
            Field::Drs => FieldValue::Digital(self.drs),
            Field::RollBar => FieldValue::Digital(self.roll_bar),
            Field::Glv => FieldValue::Digital(self.glv),
        }
    }

    /// Write one field in place.
    ///
    /// # Errors
    ///
    /// Returns [`KindMismatch`] if `value` is analog for a digital field or
    /// digital for an analog one. The state is left untouched in that case.
    pub const fn set(&mut self, field: Field, value: FieldValue) -> Result<(), KindMismatch> {
        match (field, value) {
            (Field::Accelerator, FieldValue::Analog(v)) => self.accelerator = v,
            (Field::Brake, FieldValue::Analog(v)) => self.brake = v,
            (Field::Drs, FieldValue::Digital(v)) => self.drs = v,
            (Field::RollBar, FieldValue::Digital(v)) => self.roll_bar = v,
            (Field::Glv, FieldValue::Digital(v)) => self.glv = v,
            _ => {
                return Err(KindMismatch {
                    field,
                    expected: field.kind(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Copy one field's value from `other` into `self`.
    pub const fn copy_field(&mut self, field: Field, other: &Self) {
        match field {
            Field::Accelerator => self.accelerator = other.accelerator,
            Field::Brake => self.brake = other.brake,
            Field::Drs => self.drs = other.drs,
            Field::RollBar => self.roll_bar = other.roll_bar,
            Field::Glv => self.glv = other.glv,
        }
    }
}
