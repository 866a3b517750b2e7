//! Viewer-facing server for the panel bridge.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/panel`) pushing one JSON channel
//!   message per change event to every connected viewer
//! - **Reveal plan** (`/api/reveal-plan`) describing the staged start-up
//!   sequence viewers run
//! - **Static assets** for every other path, read from the asset root
//!
//! # Architecture
//!
//! The [`BroadcastHub`] keeps one bounded queue per viewer and implements
//! [`panel_core::ChangeSink`], so it plugs straight into the sync pipeline.
//! Publishing never waits on a viewer: full queues drop the message for
//! that viewer, closed ones are pruned.
//!
//! [`BroadcastHub`]: hub::BroadcastHub

pub mod assets;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use hub::{BroadcastHub, PublishReport, ViewerConnection};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{RunningObserver, StartupError, spawn_observer};
pub use state::AppState;
