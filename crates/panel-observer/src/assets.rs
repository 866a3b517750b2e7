//! Static asset serving for the viewer front-end.
//!
//! Any path not claimed by another route is resolved against the configured
//! asset root, whatever the request method. `/` maps to the index document.
//! Paths that would leave the root are treated the same as missing files.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::error::ObserverError;
use crate::state::AppState;

/// Fallback content type for unknown extensions.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Content type for a file, from its extension.
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html" | "htm") => "text/html",
        Some("js" | "mjs") => "text/javascript",
        Some("css") => "text/css",
        Some("json" | "map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("txt") => "text/plain",
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => DEFAULT_MIME,
    }
}

/// Map a request path onto a file under `root`.
///
/// Returns `None` when the path contains anything other than plain names
/// (`..`, a root, a drive prefix).
pub fn resolve(root: &Path, index_document: &str, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() {
        index_document
    } else {
        relative
    };

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Path as reported back to the client on failure, e.g. `./index.html`.
fn display_path(index_document: &str, request_path: &str) -> String {
    if request_path == "/" || request_path.is_empty() {
        format!("./{index_document}")
    } else {
        format!(".{request_path}")
    }
}

/// Fallback handler: serve the file the request path names.
///
/// # Errors
///
/// Returns [`ObserverError::AssetRead`] (a `500`) when the file is missing,
/// unreadable, or outside the asset root.
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ObserverError> {
    let request_path = uri.path();
    let shown = display_path(&state.index_document, request_path);

    let Some(file) = resolve(&state.asset_root, &state.index_document, request_path) else {
        warn!(path = %shown, "asset path escapes the asset root");
        return Err(ObserverError::AssetRead {
            path: shown,
            reason: String::from("path escapes the asset root"),
        });
    };

    match tokio::fs::read(&file).await {
        Ok(bytes) => {
            debug!(file = %file.display(), bytes = bytes.len(), "asset served");
            Ok(([(header::CONTENT_TYPE, mime_type(&file))], bytes).into_response())
        }
        Err(e) => {
            warn!(path = %shown, file = %file.display(), error = %e, "asset read failed");
            Err(ObserverError::AssetRead {
                path: shown,
                reason: e.to_string(),
            })
        }
    }
}
