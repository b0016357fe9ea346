pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod framing;
pub mod transport;

pub use config::{DefaultsSource, DeviceConfig, DeviceDefaults, FileDefaults, DEFAULT_BAUD_RATE};
pub use dispatch::{dispatch, DispatchRequest, DispatchResult};
pub use error::{ConfigError, DispatchError, ErrorKind, ResolutionError, TransportError};
pub use framing::{ByteSize, Framing, FramingParseError, Parity, StopBits};
pub use transport::{Connection, LineSettings, SerialTransport, Transport};

/// Installs the stderr logger used by the binaries. `RUST_LOG` overrides the
/// default `warn` level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}
