//! Startup helper for embedding the viewer server in the bridge binary.
//!
//! [`spawn_observer`] binds the listen address before returning, so a port
//! already in use is reported to the caller instead of being logged from a
//! background task.
//!
//! ```rust,ignore
//! let state = Arc::new(AppState::from_config(&config, Arc::clone(&hub)));
//! let observer = spawn_observer(&ServerConfig::from(&config.server), state).await?;
//! info!(addr = %observer.addr, "viewers can connect");
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A server running on a background task.
#[derive(Debug)]
pub struct RunningObserver {
    /// The bound address (useful when port `0` was requested).
    pub addr: SocketAddr,
    /// The serving task. Abort it to stop the server.
    pub handle: JoinHandle<()>,
}

/// Bind the server and serve on a background Tokio task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<RunningObserver, StartupError> {
    let listener = crate::server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::serve(listener, state).await {
            tracing::error!(error = %e, "viewer server exited with error");
        }
    });

    tracing::info!(%addr, "viewer server spawned on background task");
    Ok(RunningObserver { addr, handle })
}
