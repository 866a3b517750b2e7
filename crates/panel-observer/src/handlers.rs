//! REST endpoint handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/reveal-plan` | Configured reveal stage chain |
//!
//! Static files are served by [`crate::assets::serve_asset`].

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use panel_types::RevealStep;

use crate::state::AppState;

/// Return the reveal stage chain viewers should run on load.
pub async fn reveal_plan(State(state): State<Arc<AppState>>) -> Json<Vec<RevealStep>> {
    Json(state.reveal_plan.clone())
}
