//! Shared type definitions for the panel bridge.
//!
//! Every crate in the workspace speaks in these types: the sensor adapter
//! produces [`FieldValue`]s, the sync pipeline owns a [`PanelState`] and
//! emits [`ChangeEvent`]s, and the observer pushes [`ChannelMessage`]s to
//! viewers. Wire types derive `ts_rs::TS` so the viewer front-end can import
//! matching `TypeScript` definitions.
//!
//! # Modules
//!
//! - [`field`] -- the five panel inputs and their raw values
//! - [`state`] -- the authoritative [`PanelState`] snapshot
//! - [`channel`] -- channels, change events and viewer messages
//! - [`reveal`] -- viewer start-up stage descriptors
//! - [`ids`] -- viewer connection identifiers

pub mod channel;
pub mod field;
pub mod ids;
pub mod reveal;
pub mod state;

pub use channel::{ChangeEvent, Channel, ChannelMessage};
pub use field::{Field, FieldKind, FieldValue, UnknownField};
pub use ids::ViewerId;
pub use reveal::{RevealStage, RevealStep};
pub use state::{KindMismatch, PanelState};
