//! Configuration loading and typed config structures for the panel bridge.
//!
//! The configuration lives in `panel-config.yaml`. Every section and field
//! has a default, so an empty (or absent) file yields a working setup that
//! listens on `127.0.0.1:8127`, serves `app/`, and talks `Firmata` on
//! `/dev/ttyACM0` with a 50 ms sampling interval.

use std::path::Path;
use std::time::Duration;

use panel_types::{Field, RevealStage, RevealStep};
use serde::Deserialize;

/// Environment variable overriding `sensors.device`.
pub const ENV_DEVICE: &str = "PANEL_DEVICE";
/// Environment variable overriding `server.asset_root`.
pub const ENV_ASSET_ROOT: &str = "PANEL_ASSET_ROOT";
/// Environment variable overriding `server.port`.
pub const ENV_PORT: &str = "PANEL_PORT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid value for {key}: {value}")]
    InvalidOverride {
        /// The environment variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bridge configuration, mirroring `panel-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PanelConfig {
    /// HTTP / `WebSocket` server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Hardware board and sampling settings.
    #[serde(default)]
    pub sensors: SensorConfig,

    /// Parameters of the simulated board.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Viewer-facing settings.
    #[serde(default)]
    pub viewer: ViewerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PanelConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// defaults (still subject to environment overrides).
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file), except for `NotFound`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::Io { source }) if source.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_overrides(|key| std::env::var(key).ok())?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides looked up through `lookup` (normally the process
    /// environment).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `PANEL_PORT` is not a
    /// valid port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_DEVICE) {
            self.sensors.device = val;
        }
        if let Some(val) = lookup(ENV_ASSET_ROOT) {
            self.server.asset_root = val;
        }
        if let Some(val) = lookup(ENV_PORT) {
            self.server.port = val.parse().map_err(|_parse_err| ConfigError::InvalidOverride {
                key: ENV_PORT,
                value: val.clone(),
            })?;
        }
        Ok(())
    }
}

/// HTTP / `WebSocket` server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the viewer's static assets.
    #[serde(default = "default_asset_root")]
    pub asset_root: String,

    /// Document served for `/`.
    #[serde(default = "default_index_document")]
    pub index_document: String,

    /// Outbound messages buffered per viewer before new ones are dropped.
    #[serde(default = "default_viewer_queue_capacity")]
    pub viewer_queue_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            asset_root: default_asset_root(),
            index_document: default_index_document(),
            viewer_queue_capacity: default_viewer_queue_capacity(),
        }
    }
}

/// Which board implementation the sensor adapter acquires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    /// A `StandardFirmata` board on a serial device.
    #[default]
    Firmata,
    /// Generated readings, no hardware required.
    Simulated,
    /// No sensor input at all.
    Disabled,
}

/// Hardware board and sampling settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SensorConfig {
    /// Board implementation to use.
    #[serde(default)]
    pub board: BoardKind,

    /// Serial device of the `Firmata` board.
    #[serde(default = "default_device")]
    pub device: String,

    /// Per-field polling interval in milliseconds.
    #[serde(default = "default_sampling_interval_ms")]
    pub sampling_interval_ms: u64,

    /// How long to wait for the board's version report after opening.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Pin assignment of each field.
    #[serde(default)]
    pub pins: PinMap,
}

impl SensorConfig {
    /// Polling interval as a [`Duration`].
    pub const fn sampling_interval(&self) -> Duration {
        Duration::from_millis(self.sampling_interval_ms)
    }

    /// Ready timeout as a [`Duration`].
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            board: BoardKind::default(),
            device: default_device(),
            sampling_interval_ms: default_sampling_interval_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
            pins: PinMap::default(),
        }
    }
}

/// Pin assignment. Pedals are analog channel numbers, switches are digital
/// pin numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PinMap {
    /// Analog channel of the accelerator.
    pub accelerator: u8,
    /// Analog channel of the brake.
    pub brake: u8,
    /// Digital pin of the DRS switch.
    pub drs: u8,
    /// Digital pin of the roll bar switch.
    pub roll_bar: u8,
    /// Digital pin of the GLV switch.
    pub glv: u8,
}

impl PinMap {
    /// The pin (or analog channel) wired to `field`.
    pub const fn pin(&self, field: Field) -> u8 {
        match field {
            Field::Accelerator => self.accelerator,
            Field::Brake => self.brake,
            Field::Drs => self.drs,
            Field::RollBar => self.roll_bar,
            Field::Glv => self.glv,
        }
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            accelerator: 0,
            brake: 1,
            drs: 3,
            roll_bar: 4,
            glv: 5,
        }
    }
}

/// Parameters of the simulated board.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Milliseconds between simulated accelerator steps.
    pub step_interval_ms: u64,
    /// Accelerator increment per step.
    pub accelerator_step: i32,
    /// The accelerator wraps back to zero at this value.
    pub accelerator_wrap: i32,
    /// Chance per step that each switch flips (0.0 - 1.0).
    pub toggle_probability: f64,
}

impl SimulationConfig {
    /// Step interval as a [`Duration`].
    pub const fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: 1000,
            accelerator_step: 10,
            accelerator_wrap: 770,
            toggle_probability: 0.05,
        }
    }
}

/// Viewer-facing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ViewerConfig {
    /// Delays of the start-up reveal sequence.
    #[serde(default)]
    pub reveal: RevealConfig,
}

/// Delay before each reveal stage, relative to the previous stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Delay before [`RevealStage::RevealPrimary`].
    pub reveal_primary_ms: u64,
    /// Delay before [`RevealStage::FadeInSecondary`].
    pub fade_in_secondary_ms: u64,
    /// Delay before [`RevealStage::ShowSecondary`].
    pub show_secondary_ms: u64,
    /// Delay before [`RevealStage::BindAnimations`].
    pub bind_animations_ms: u64,
    /// Delay before [`RevealStage::ApplyGaugeGeometry`].
    pub apply_gauge_geometry_ms: u64,
}

impl RevealConfig {
    /// The ordered stage chain described by this configuration.
    pub fn steps(&self) -> Vec<RevealStep> {
        RevealStage::ALL
            .into_iter()
            .map(|stage| RevealStep {
                stage,
                delay_ms: self.delay_ms(stage),
            })
            .collect()
    }

    const fn delay_ms(&self, stage: RevealStage) -> u64 {
        match stage {
            RevealStage::RevealPrimary => self.reveal_primary_ms,
            RevealStage::FadeInSecondary => self.fade_in_secondary_ms,
            RevealStage::ShowSecondary => self.show_secondary_ms,
            RevealStage::BindAnimations => self.bind_animations_ms,
            RevealStage::ApplyGaugeGeometry => self.apply_gauge_geometry_ms,
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            reveal_primary_ms: 50,
            fade_in_secondary_ms: 1500,
            show_secondary_ms: 1000,
            bind_animations_ms: 1000,
            apply_gauge_geometry_ms: 3000,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_host() -> String {
    String::from("127.0.0.1")
}

const fn default_port() -> u16 {
    8127
}

fn default_asset_root() -> String {
    String::from("app")
}

fn default_index_document() -> String {
    String::from("index.html")
}

const fn default_viewer_queue_capacity() -> usize {
    64
}

fn default_device() -> String {
    String::from("/dev/ttyACM0")
}

const fn default_sampling_interval_ms() -> u64 {
    50
}

const fn default_ready_timeout_ms() -> u64 {
    10_000
}

fn default_log_filter() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_matches_panel_wiring() {
        let config = PanelConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8127);
        assert_eq!(config.server.asset_root, "app");
        assert_eq!(config.sensors.board, BoardKind::Firmata);
        assert_eq!(config.sensors.sampling_interval(), Duration::from_millis(50));
        assert_eq!(config.sensors.pins.pin(Field::Brake), 1);
        assert_eq!(config.sensors.pins.pin(Field::Glv), 5);
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = PanelConfig::parse("").unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
server:
  port: 9000
sensors:
  board: simulated
  sampling_interval_ms: 20
  pins:
    roll_bar: 7
viewer:
  reveal:
    apply_gauge_geometry_ms: 10
";
        let config = PanelConfig::parse(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.sensors.board, BoardKind::Simulated);
        assert_eq!(config.sensors.sampling_interval_ms, 20);
        assert_eq!(config.sensors.pins.roll_bar, 7);
        assert_eq!(config.sensors.pins.drs, 3);
        assert_eq!(config.viewer.reveal.apply_gauge_geometry_ms, 10);
        assert_eq!(config.viewer.reveal.reveal_primary_ms, 50);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = PanelConfig::parse("server: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overrides_replace_values() {
        let env: BTreeMap<&str, &str> = [
            (ENV_DEVICE, "/dev/ttyUSB1"),
            (ENV_ASSET_ROOT, "/srv/panel"),
            (ENV_PORT, "8200"),
        ]
        .into_iter()
        .collect();
        let mut config = PanelConfig::default();
        let result = config.apply_overrides(|key| env.get(key).map(|v| (*v).to_owned()));
        assert!(result.is_ok());
        assert_eq!(config.sensors.device, "/dev/ttyUSB1");
        assert_eq!(config.server.asset_root, "/srv/panel");
        assert_eq!(config.server.port, 8200);
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = PanelConfig::default();
        let result = config.apply_overrides(|key| (key == ENV_PORT).then(|| String::from("http")));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidOverride { key: ENV_PORT, .. })
        ));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("panel-config-does-not-exist.yaml");
        let config = PanelConfig::load(&path);
        assert!(config.is_ok());
    }

    #[test]
    fn reveal_steps_follow_stage_order() {
        let steps = RevealConfig::default().steps();
        let delays: Vec<u64> = steps.iter().map(|s| s.delay_ms).collect();
        assert_eq!(delays, [50, 1500, 1000, 1000, 3000]);
        assert_eq!(steps.first().map(|s| s.stage), Some(RevealStage::RevealPrimary));
    }
}
