//! Axum router construction.
//!
//! Assembles the `WebSocket` route, the REST route and the static asset
//! fallback into a single [`Router`].

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::assets;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete router.
///
/// - `GET /ws/panel` -- live channel messages
/// - `GET /api/reveal-plan` -- reveal stage chain
/// - anything else, any method -- a file under the asset root
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws/panel", get(ws::ws_panel))
        .route("/api/reveal-plan", get(handlers::reveal_plan))
        .fallback(assets::serve_asset)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
