//! Bridge binary: hardware panel to browser viewers.
//!
//! Wires the sensor board, the sync pipeline and the viewer server together
//! and runs until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `panel-config.yaml` (or `$PANEL_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the broadcast hub and the sync pipeline feeding it
//! 4. Start the viewer server
//! 5. Acquire the sensor board and start one poller per field
//! 6. Wait for Ctrl-C, then stop pollers and server

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use panel_core::{ChangeSink, PanelConfig, SyncPipeline};
use panel_observer::{AppState, BroadcastHub, ServerConfig};
use panel_sensors::SensorPollers;
use panel_types::PanelState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::BridgeError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "panel-config.yaml";

/// Environment variable naming an alternative configuration file.
const ENV_CONFIG_PATH: &str = "PANEL_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the viewer server cannot
/// bind. A missing or unusable sensor board is not an error.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = PanelConfig::load(&config_path).map_err(BridgeError::from)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_target(true)
        .init();

    info!(
        path = %config_path.display(),
        host = config.server.host,
        port = config.server.port,
        asset_root = config.server.asset_root,
        board = ?config.sensors.board,
        sampling_interval_ms = config.sensors.sampling_interval_ms,
        "Configuration loaded"
    );

    // 3. Hub and pipeline.
    let hub = Arc::new(BroadcastHub::new(config.server.viewer_queue_capacity));
    let pipeline = Arc::new(SyncPipeline::new(
        PanelState::default(),
        Arc::clone(&hub) as Arc<dyn ChangeSink>,
    ));

    // 4. Viewer server.
    let app_state = Arc::new(AppState::from_config(&config, Arc::clone(&hub)));
    let observer = panel_observer::spawn_observer(&ServerConfig::from(&config.server), app_state)
        .await
        .map_err(BridgeError::from)?;
    info!(addr = %observer.addr, "Viewer server started");

    // 5. Sensor board and pollers.
    let pollers = start_sensors(&config, Arc::clone(&pipeline)).await;

    // 6. Run until interrupted.
    tokio::signal::ctrl_c()
        .await
        .map_err(|source| BridgeError::Signal { source })?;
    info!("Ctrl-C received, shutting down");

    if let Some(pollers) = pollers {
        pollers.abort_all();
    }
    observer.handle.abort();

    let last = pipeline.snapshot();
    info!(
        accelerator = last.accelerator,
        brake = last.brake,
        drs = last.drs,
        roll_bar = last.roll_bar,
        glv = last.glv,
        viewers = hub.viewer_count(),
        "panel-bridge stopped"
    );
    Ok(())
}

/// Resolve the configuration file path.
fn config_path() -> PathBuf {
    std::env::var_os(ENV_CONFIG_PATH)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Acquire the board and start polling it.
///
/// Acquisition failure is fatal to sensor input only: it is logged and the
/// bridge keeps serving viewers with the initial state.
async fn start_sensors(config: &PanelConfig, pipeline: Arc<SyncPipeline>) -> Option<SensorPollers> {
    match panel_sensors::acquire(config).await {
        Ok(board) => Some(panel_sensors::spawn_pollers(
            Arc::new(board),
            pipeline,
            config.sensors.sampling_interval(),
        )),
        Err(e) => {
            error!(
                error = %e,
                device = config.sensors.device,
                "sensor board unavailable, serving viewers without sensor input"
            );
            None
        }
    }
}
