//! Error types for the viewer-facing server.
//!
//! [`ObserverError`] is converted into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur while answering a viewer request.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// A static asset could not be resolved or read.
    #[error("error loading '{path}': {reason}")]
    AssetRead {
        /// The requested path, relative to the asset root.
        path: String,
        /// Why the read failed.
        reason: String,
    },
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        match self {
            Self::AssetRead { path, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error loading '{path}'"),
            )
                .into_response(),
        }
    }
}
