//! Error types for the bridge binary.
//!
//! [`BridgeError`] wraps the startup failures that stop the process.
//! Hardware acquisition failures are deliberately absent: they are logged
//! and the bridge keeps serving viewers.

/// Top-level startup error.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: panel_core::config::ConfigError,
    },

    /// The viewer server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: panel_observer::StartupError,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
