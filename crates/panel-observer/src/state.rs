//! Shared application state for the viewer-facing server.
//!
//! [`AppState`] holds the broadcast hub that WebSocket connections register
//! with, where static assets live, and the reveal plan handed to viewers.

use std::path::PathBuf;
use std::sync::Arc;

use panel_core::PanelConfig;
use panel_types::RevealStep;

use crate::hub::BroadcastHub;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry of connected viewers.
    pub hub: Arc<BroadcastHub>,
    /// Directory static assets are served from.
    pub asset_root: PathBuf,
    /// File served for `/`.
    pub index_document: String,
    /// Reveal stage chain served at `/api/reveal-plan`.
    pub reveal_plan: Vec<RevealStep>,
}

impl AppState {
    /// Build the state from configuration, sharing an existing hub.
    pub fn from_config(config: &PanelConfig, hub: Arc<BroadcastHub>) -> Self {
        Self {
            hub,
            asset_root: PathBuf::from(&config.server.asset_root),
            index_document: config.server.index_document.clone(),
            reveal_plan: config.viewer.reveal.steps(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&PanelConfig::default(), Arc::new(BroadcastHub::default()))
    }
}
