//! Error types for the sensor source adapter.
//!
//! Every variant is a hardware acquisition failure: the adapter gives up on
//! the first one and reports it upward. Nothing here is retried.

/// Errors that can occur while acquiring or talking to the board.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// The serial device could not be opened.
    #[error("failed to open board device {device}: {source}")]
    Open {
        /// Path of the device.
        device: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The board never reported its protocol version.
    #[error("board on {device} did not report a protocol version within {timeout_ms}ms")]
    NotReady {
        /// Path of the device.
        device: String,
        /// How long we waited.
        timeout_ms: u64,
    },

    /// The device reached end-of-file during the handshake.
    #[error("board on {device} closed the connection during handshake")]
    Closed {
        /// Path of the device.
        device: String,
    },

    /// Reading from or writing to the device failed during the handshake.
    #[error("I/O error on board {device}: {source}")]
    Io {
        /// Path of the device.
        device: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Sensor input is turned off in the configuration.
    #[error("sensor input is disabled by configuration")]
    Disabled,
}
