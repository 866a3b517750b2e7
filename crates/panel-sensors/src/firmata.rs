//! Minimal `Firmata` codec and board driver.
//!
//! Only the subset `StandardFirmata` needs for input sampling is spoken:
//!
//! | Direction | Message | Bytes |
//! |-----------|---------|-------|
//! | in  | `ANALOG_MESSAGE`  | `0xE0 \| ch`, lsb, msb |
//! | in  | `DIGITAL_MESSAGE` | `0x90 \| port`, lsb, msb |
//! | in/out | `REPORT_VERSION` | `0xF9`, major, minor (query: `0xF9`) |
//! | out | `SET_PIN_MODE`    | `0xF4`, pin, mode |
//! | out | `REPORT_ANALOG`   | `0xC0 \| ch`, 1 |
//! | out | `REPORT_DIGITAL`  | `0xD0 \| port`, 1 |
//! | out | `SAMPLING_INTERVAL` | `0xF0 0x7A` lsb msb `0xF7` |
//!
//! Incoming sysex (firmware name, capability responses) is skipped. On
//! Unix the serial device is switched to raw mode at [`FIRMATA_BAUD`] when
//! it is opened, so binary frames pass through the tty untouched.

use std::sync::Arc;
use std::time::Duration;

use panel_core::config::{PinMap, SensorConfig};
use panel_types::{Field, FieldKind, FieldValue};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::board::LatestReadings;
use crate::error::SensorError;

const ANALOG_MESSAGE: u8 = 0xE0;
const DIGITAL_MESSAGE: u8 = 0x90;
const REPORT_ANALOG: u8 = 0xC0;
const REPORT_DIGITAL: u8 = 0xD0;
const SET_PIN_MODE: u8 = 0xF4;
const REPORT_VERSION: u8 = 0xF9;
const START_SYSEX: u8 = 0xF0;
const END_SYSEX: u8 = 0xF7;
const SAMPLING_INTERVAL: u8 = 0x7A;
const PIN_MODE_INPUT: u8 = 0x00;

/// Baud rate `StandardFirmata` listens on.
pub const FIRMATA_BAUD: u32 = 57_600;

/// A decoded inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmataMessage {
    /// A 14-bit analog sample.
    Analog {
        /// Analog channel number.
        channel: u8,
        /// Sample value.
        value: u16,
    },
    /// Levels of one 8-pin digital port, bit `n` is pin `port * 8 + n`.
    Digital {
        /// Port number.
        port: u8,
        /// Pin level bitmask.
        mask: u16,
    },
    /// Protocol version report; marks the board as ready.
    Version {
        /// Major protocol version.
        major: u8,
        /// Minor protocol version.
        minor: u8,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum DecodeState {
    #[default]
    Idle,
    Sysex,
    Command {
        command: u8,
        channel: u8,
        first: Option<u8>,
    },
}

/// Byte-at-a-time decoder for the inbound stream.
#[derive(Debug, Clone, Default)]
pub struct FirmataDecoder {
    state: DecodeState,
}

impl FirmataDecoder {
    /// Feed one byte, returning a message when it completes one.
    pub fn push(&mut self, byte: u8) -> Option<FirmataMessage> {
        if byte & 0x80 != 0 {
            self.state = match byte {
                START_SYSEX => DecodeState::Sysex,
                REPORT_VERSION => DecodeState::Command {
                    command: REPORT_VERSION,
                    channel: 0,
                    first: None,
                },
                b if b & 0xF0 == ANALOG_MESSAGE || b & 0xF0 == DIGITAL_MESSAGE => {
                    DecodeState::Command {
                        command: b & 0xF0,
                        channel: b & 0x0F,
                        first: None,
                    }
                }
                // END_SYSEX and anything we do not decode.
                _ => DecodeState::Idle,
            };
            return None;
        }

        match self.state {
            DecodeState::Idle | DecodeState::Sysex => None,
            DecodeState::Command {
                command,
                channel,
                first: None,
            } => {
                self.state = DecodeState::Command {
                    command,
                    channel,
                    first: Some(byte),
                };
                None
            }
            DecodeState::Command {
                command,
                channel,
                first: Some(lsb),
            } => {
                self.state = DecodeState::Idle;
                let value = u16::from(lsb) | (u16::from(byte) << 7);
                match command {
                    ANALOG_MESSAGE => Some(FirmataMessage::Analog { channel, value }),
                    DIGITAL_MESSAGE => Some(FirmataMessage::Digital {
                        port: channel,
                        mask: value,
                    }),
                    _ => Some(FirmataMessage::Version {
                        major: lsb,
                        minor: byte,
                    }),
                }
            }
        }
    }
}

/// Bytes that put every field's input into reporting mode.
///
/// Digital pins are switched to INPUT and their ports enabled; analog
/// channels are enabled with `REPORT_ANALOG`, which also selects analog
/// input mode on the channel's pin.
pub fn setup_commands(pins: &PinMap, sampling_interval: Duration) -> Vec<u8> {
    let mut out = Vec::new();
    let mut ports: Vec<u8> = Vec::new();

    for field in Field::ALL {
        let pin = pins.pin(field);
        match field.kind() {
            FieldKind::Analog => {
                out.extend_from_slice(&[REPORT_ANALOG | (pin & 0x0F), 1]);
            }
            FieldKind::Digital => {
                out.extend_from_slice(&[SET_PIN_MODE, pin & 0x7F, PIN_MODE_INPUT]);
                let port = pin / 8;
                if !ports.contains(&port) {
                    ports.push(port);
                }
            }
        }
    }
    for port in ports {
        out.extend_from_slice(&[REPORT_DIGITAL | (port & 0x0F), 1]);
    }

    let ms = u16::try_from(sampling_interval.as_millis())
        .unwrap_or(u16::MAX)
        .min(0x3FFF);
    out.extend_from_slice(&[
        START_SYSEX,
        SAMPLING_INTERVAL,
        u8::try_from(ms & 0x7F).unwrap_or_default(),
        u8::try_from(ms >> 7).unwrap_or_default(),
        END_SYSEX,
    ]);
    out
}

/// Store the fields a message carries into `latest`.
pub fn apply_message(pins: &PinMap, message: FirmataMessage, latest: &LatestReadings) {
    match message {
        FirmataMessage::Analog { channel, value } => {
            for field in Field::ALL {
                if field.kind() == FieldKind::Analog && pins.pin(field) == channel {
                    latest.set(field, FieldValue::Analog(i32::from(value)));
                }
            }
        }
        FirmataMessage::Digital { port, mask } => {
            for field in Field::ALL {
                let pin = pins.pin(field);
                if field.kind() == FieldKind::Digital && pin / 8 == port {
                    let high = (mask >> (pin % 8)) & 1 == 1;
                    latest.set(field, FieldValue::Digital(high));
                }
            }
        }
        FirmataMessage::Version { .. } => {}
    }
}

/// A `StandardFirmata` board feeding a latest-value table.
///
/// A background task owns the read half of the device and keeps decoding
/// until the device closes or the board is dropped.
#[derive(Debug)]
pub struct FirmataBoard {
    device: String,
    latest: Arc<LatestReadings>,
    reader: JoinHandle<()>,
}

impl FirmataBoard {
    /// Open the configured serial device and complete the handshake.
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect); additionally [`SensorError::Open`] if
    /// the device cannot be opened.
    pub async fn open(config: &SensorConfig) -> Result<Self, SensorError> {
        let path = config.device.clone();
        let file = tokio::task::spawn_blocking(move || open_serial(&path))
            .await
            .map_err(std::io::Error::other)
            .and_then(|opened| opened)
            .map_err(|source| SensorError::Open {
                device: config.device.clone(),
                source,
            })?;
        Self::connect(tokio::fs::File::from_std(file), config.device.clone(), config).await
    }

    /// Run the handshake over an already-open byte stream.
    ///
    /// Sends a version query, waits up to `ready_timeout_ms` for the version
    /// report, writes the input setup, then starts the reader task.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::NotReady`] on timeout, [`SensorError::Closed`]
    /// if the stream ends first, or [`SensorError::Io`] on I/O failure.
    pub async fn connect<S>(
        stream: S,
        device: String,
        config: &SensorConfig,
    ) -> Result<Self, SensorError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let io_err = |source| SensorError::Io {
            device: device.clone(),
            source,
        };
        let (mut reader, mut writer) = tokio::io::split(stream);
        let mut decoder = FirmataDecoder::default();
        let latest = Arc::new(LatestReadings::default());

        writer.write_all(&[REPORT_VERSION]).await.map_err(io_err)?;
        writer.flush().await.map_err(io_err)?;

        let (major, minor) = tokio::time::timeout(
            config.ready_timeout(),
            wait_for_version(&mut reader, &mut decoder, &config.pins, &latest),
        )
        .await
        .map_err(|_elapsed| SensorError::NotReady {
            device: device.clone(),
            timeout_ms: config.ready_timeout_ms,
        })?
        .map_err(|e| match e {
            Some(source) => io_err(source),
            None => SensorError::Closed {
                device: device.clone(),
            },
        })?;
        info!(device = %device, major, minor, "Firmata board ready");

        let setup = setup_commands(&config.pins, config.sampling_interval());
        writer.write_all(&setup).await.map_err(io_err)?;
        writer.flush().await.map_err(io_err)?;

        let reader = tokio::spawn(read_loop(
            reader,
            decoder,
            config.pins,
            Arc::clone(&latest),
            device.clone(),
        ));

        Ok(Self {
            device,
            latest,
            reader,
        })
    }

    /// Latest reported value of `field`, if the board has reported one.
    pub fn read(&self, field: Field) -> Option<FieldValue> {
        self.latest.get(field)
    }

    /// Path of the device this board was opened on.
    pub fn device(&self) -> &str {
        &self.device
    }
}

impl Drop for FirmataBoard {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Open a tty for binary I/O: no line editing, no echo, no output
/// translation, [`FIRMATA_BAUD`] in both directions.
#[cfg(unix)]
fn open_serial(path: &str) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    use nix::fcntl::OFlag;
    use nix::sys::termios::{self, BaudRate, ControlFlags, SetArg};

    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(OFlag::O_NOCTTY.bits())
        .open(path)?;

    let mut settings = termios::tcgetattr(&file)?;
    termios::cfmakeraw(&mut settings);
    termios::cfsetspeed(&mut settings, BaudRate::B57600)?;
    settings
        .control_flags
        .insert(ControlFlags::CLOCAL | ControlFlags::CREAD);
    termios::tcsetattr(&file, SetArg::TCSANOW, &settings)?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_serial(path: &str) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().read(true).write(true).open(path)
}

/// Read until a version report arrives, storing any readings that come
/// with it. `Err(None)` means end of stream.
async fn wait_for_version<R>(
    reader: &mut ReadHalf<R>,
    decoder: &mut FirmataDecoder,
    pins: &PinMap,
    latest: &LatestReadings,
) -> Result<(u8, u8), Option<std::io::Error>>
where
    R: AsyncRead,
{
    let mut buf = [0_u8; 64];
    loop {
        let n = reader.read(&mut buf).await.map_err(Some)?;
        if n == 0 {
            return Err(None);
        }
        let mut version = None;
        for &byte in buf.iter().take(n) {
            match decoder.push(byte) {
                Some(FirmataMessage::Version { major, minor }) if version.is_none() => {
                    version = Some((major, minor));
                }
                Some(message) => apply_message(pins, message, latest),
                None => {}
            }
        }
        if let Some(version) = version {
            return Ok(version);
        }
    }
}

async fn read_loop<R>(
    mut reader: ReadHalf<R>,
    mut decoder: FirmataDecoder,
    pins: PinMap,
    latest: Arc<LatestReadings>,
    device: String,
) where
    R: AsyncRead,
{
    let mut buf = [0_u8; 256];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                warn!(device, "Firmata board closed the connection");
                return;
            }
            Ok(n) => {
                for &byte in buf.iter().take(n) {
                    if let Some(message) = decoder.push(byte) {
                        apply_message(&pins, message, &latest);
                    }
                }
            }
            Err(e) => {
                warn!(device, error = %e, "Firmata read failed, sensor input stopped");
                return;
            }
        }
    }
}
