//! State synchronization engine for the panel bridge.
//!
//! This crate owns the cycle that turns one sensor reading into at most one
//! viewer broadcast:
//!
//! ```text
//! reading --> StateStore::mutate --> ChangeDetector::detect --> ChangeSink::publish
//! ```
//!
//! The three steps run under a single lock in [`SyncPipeline`], so cycles
//! from independent pollers never interleave.
//!
//! # Modules
//!
//! - [`store`] -- [`StateStore`], sole owner of the live panel state.
//! - [`detector`] -- [`ChangeDetector`] and the last-changed-field-wins
//!   channel resolution.
//! - [`pipeline`] -- [`SyncPipeline`] and the [`ChangeSink`] seam.
//! - [`config`] -- Configuration loading from `panel-config.yaml`.
//! - [`reveal`] -- The viewer start-up [`RevealSequencer`], the reference
//!   runner for the chain viewers fetch from `/api/reveal-plan`.
//!
//! [`StateStore`]: store::StateStore
//! [`ChangeDetector`]: detector::ChangeDetector
//! [`SyncPipeline`]: pipeline::SyncPipeline
//! [`ChangeSink`]: pipeline::ChangeSink
//! [`RevealSequencer`]: reveal::RevealSequencer

pub mod config;
pub mod detector;
pub mod pipeline;
pub mod reveal;
pub mod store;

pub use config::PanelConfig;
pub use pipeline::{ChangeSink, NoOpSink, SyncPipeline};
