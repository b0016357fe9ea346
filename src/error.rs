use crate::framing::FramingParseError;
use std::path::PathBuf;
use thiserror::Error;

/// A request that can't be turned into a port, baud rate and payload.
/// Raised before any port is opened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Unknown device '{device}' and no overrides provided")]
    UnknownDevice { device: String },

    #[error("No port configured for device '{device}'")]
    NoPort { device: String },

    #[error("Baud rate must be positive")]
    ZeroBaudRate,

    #[error("invalid baud rate '{value}'")]
    InvalidBaudRate { value: String },

    #[error("No payload for action '{action}' on '{device}'")]
    NoPayload { device: String, action: String },

    #[error("Payload '{payload}' is not ASCII text")]
    NonAsciiPayload { payload: String },

    #[error("{0}")]
    InvalidFraming(#[from] FramingParseError),
}

/// Failure to open, write or flush the line. Displays the driver's message as is.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{0}")]
    Open(#[from] serialport::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{what} is not supported by the serial driver")]
    UnsupportedFraming { what: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file {} not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("Can't read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Resolution,
    Transport,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Config(_) => ErrorKind::Config,
            DispatchError::Resolution(_) => ErrorKind::Resolution,
            DispatchError::Transport(_) => ErrorKind::Transport,
        }
    }
}
