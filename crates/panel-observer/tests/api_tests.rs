//! Integration tests for the viewer-facing HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use panel_core::PanelConfig;
use panel_core::reveal::RevealSequencer;
use panel_observer::hub::BroadcastHub;
use panel_observer::router::build_router;
use panel_observer::state::AppState;
use panel_types::RevealStep;
use serde_json::Value;
use tower::ServiceExt;

fn asset_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>panel</h1>").unwrap();
    std::fs::create_dir(dir.path().join("js")).unwrap();
    std::fs::write(dir.path().join("js").join("gauge.js"), "export {};").unwrap();
    std::fs::write(dir.path().join("font.xyz"), [0_u8, 1, 2]).unwrap();
    dir
}

fn make_state(assets: &tempfile::TempDir) -> Arc<AppState> {
    let mut config = PanelConfig::default();
    config.server.asset_root = assets.path().to_string_lossy().into_owned();
    Arc::new(AppState::from_config(
        &config,
        Arc::new(BroadcastHub::default()),
    ))
}

async fn get(state: Arc<AppState>, uri: &str) -> axum::response::Response {
    build_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

fn content_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn root_serves_index_document() {
    let assets = asset_dir();
    let response = get(make_state(&assets), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
    assert_eq!(body_bytes(response).await, b"<h1>panel</h1>");
}

#[tokio::test]
async fn nested_asset_gets_its_mime_type() {
    let assets = asset_dir();
    let response = get(make_state(&assets), "/js/gauge.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/javascript");
}

#[tokio::test]
async fn unknown_extension_is_octet_stream() {
    let assets = asset_dir();
    let response = get(make_state(&assets), "/font.xyz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/octet-stream");
    assert_eq!(body_bytes(response).await, [0_u8, 1, 2]);
}

#[tokio::test]
async fn missing_asset_is_500_with_path() {
    let assets = asset_dir();
    let response = get(make_state(&assets), "/missing.js").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, b"Error loading './missing.js'");
}

#[tokio::test]
async fn missing_index_is_500() {
    let assets = tempfile::tempdir().unwrap();
    let response = get(make_state(&assets), "/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, b"Error loading './index.html'");
}

#[tokio::test]
async fn server_keeps_serving_after_a_failure() {
    let assets = asset_dir();
    let state = make_state(&assets);
    let failed = get(Arc::clone(&state), "/nope.css").await;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let ok = get(state, "/").await;
    assert_eq!(ok.status(), StatusCode::OK);
}

#[tokio::test]
async fn assets_are_served_for_any_method() {
    let assets = asset_dir();
    let response = build_router(make_state(&assets))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/js/gauge.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/javascript");
    assert_eq!(body_bytes(response).await, b"export {};");
}

#[tokio::test]
async fn query_string_is_ignored() {
    let assets = asset_dir();
    let response = get(make_state(&assets), "/js/gauge.js?v=3").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reveal_plan_lists_configured_stages() {
    let assets = asset_dir();
    let response = get(make_state(&assets), "/api/reveal-plan").await;
    assert_eq!(response.status(), StatusCode::OK);

    let plan: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let steps = plan.as_array().unwrap();
    assert_eq!(steps.len(), 5);
    assert_eq!(steps.first().unwrap()["stage"], "revealPrimary");
    assert_eq!(steps.first().unwrap()["delayMs"], 50);
    assert_eq!(steps.last().unwrap()["stage"], "applyGaugeGeometry");
    assert_eq!(steps.last().unwrap()["delayMs"], 3000);
}

#[tokio::test]
async fn reveal_plan_matches_the_reference_runner() {
    let assets = asset_dir();
    let response = get(make_state(&assets), "/api/reveal-plan").await;
    let served: Vec<RevealStep> = serde_json::from_slice(&body_bytes(response).await).unwrap();

    let runner = RevealSequencer::new(PanelConfig::default().viewer.reveal.steps());
    assert_eq!(served.as_slice(), runner.steps());
}

#[tokio::test]
async fn ws_route_requires_upgrade() {
    let assets = asset_dir();
    let response = get(make_state(&assets), "/ws/panel").await;
    assert!(response.status().is_client_error());
}
