//! Capability seam between the dispatcher and the serial line.

use crate::error::TransportError;
use crate::framing::{ByteSize, Framing, Parity, StopBits};
use log::{debug, warn};
use serialport::{DataBits, FlowControl, SerialPort, SerialPortBuilder};
use std::io::Write;
use std::time::Duration;

/// Read/write timeout of every connection.
pub const IO_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSettings {
    pub port: String,
    pub baud_rate: u32,
    pub framing: Framing,
    pub timeout: Duration,
}

impl LineSettings {
    pub fn new(port: &str, baud_rate: u32, framing: Framing) -> LineSettings {
        LineSettings {
            port: port.to_string(),
            baud_rate,
            framing,
            timeout: IO_TIMEOUT,
        }
    }
}

/// Opens connections. The connection is released when the returned box is
/// dropped.
pub trait Transport {
    fn open(&self, line: &LineSettings) -> Result<Box<dyn Connection>, TransportError>;
}

pub trait Connection {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
    fn flush(&mut self) -> Result<(), TransportError>;
}

/// Opens `line`, writes `bytes` in full and flushes. The connection is closed
/// on every path out of this function.
pub fn send<T: Transport + ?Sized>(
    transport: &T,
    line: &LineSettings,
    bytes: &[u8],
) -> Result<(), TransportError> {
    let mut conn = transport.open(line)?;
    debug!("Opened {} at {} {}", line.port, line.baud_rate, line.framing);
    conn.write(bytes)?;
    conn.flush()?;
    debug!("Wrote {} byte(s) to {}", bytes.len(), line.port);
    Ok(())
}

/// Writes `<device_id>:<action>` and returns the text sent.
pub fn send_action_tag<T: Transport + ?Sized>(
    transport: &T,
    line: &LineSettings,
    device_id: &str,
    action: &str,
) -> Result<String, TransportError> {
    let tag = format!("{}:{}", device_id, action);
    send(transport, line, tag.as_bytes())?;
    Ok(tag)
}

/// Hardware transport backed by the `serialport` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialTransport;

impl Transport for SerialTransport {
    fn open(&self, line: &LineSettings) -> Result<Box<dyn Connection>, TransportError> {
        let builder = serialport::new(line.port.as_str(), line.baud_rate)
            .data_bits(data_bits(line.framing.byte_size))
            .parity(driver_parity(line.framing.parity))
            .stop_bits(stop_bits(line.framing.stop_bits))
            .flow_control(FlowControl::None)
            .timeout(line.timeout);
        let port = open_port(builder, line.framing.parity)?;
        Ok(Box::new(SerialConnection(port)))
    }
}

/// Mark and space parity are set on the tty after opening.
#[cfg(all(target_os = "linux", not(target_arch = "mips")))]
fn open_port(
    builder: SerialPortBuilder,
    parity: Parity,
) -> Result<Box<dyn SerialPort>, TransportError> {
    match parity {
        Parity::Mark | Parity::Space => {
            let port = builder.open_native()?;
            stick_parity(&port, parity == Parity::Mark)?;
            Ok(Box::new(port))
        }
        _ => Ok(builder.open()?),
    }
}

#[cfg(not(all(target_os = "linux", not(target_arch = "mips"))))]
fn open_port(
    builder: SerialPortBuilder,
    parity: Parity,
) -> Result<Box<dyn SerialPort>, TransportError> {
    match parity {
        Parity::Mark | Parity::Space => Err(TransportError::UnsupportedFraming {
            what: format!("{:?} parity", parity),
        }),
        _ => Ok(builder.open()?),
    }
}

/// PARENB with CMSPAR makes the parity bit constant: 1 with PARODD (mark),
/// 0 without (space).
#[cfg(all(target_os = "linux", not(target_arch = "mips")))]
fn stick_parity(port: &serialport::TTYPort, mark: bool) -> Result<(), TransportError> {
    use nix::sys::termios::{tcgetattr, tcsetattr, ControlFlags, SetArg};
    use std::os::unix::io::AsRawFd;

    let fd = port.as_raw_fd();
    let mut termios = tcgetattr(fd).map_err(std::io::Error::from)?;
    termios
        .control_flags
        .insert(ControlFlags::PARENB | ControlFlags::CMSPAR);
    termios.control_flags.set(ControlFlags::PARODD, mark);
    tcsetattr(fd, SetArg::TCSANOW, &termios).map_err(std::io::Error::from)?;
    Ok(())
}

struct SerialConnection(Box<dyn SerialPort>);

impl Connection for SerialConnection {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.0.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.0.flush()?;
        Ok(())
    }
}

fn data_bits(size: ByteSize) -> DataBits {
    match size {
        ByteSize::Five => DataBits::Five,
        ByteSize::Six => DataBits::Six,
        ByteSize::Seven => DataBits::Seven,
        ByteSize::Eight => DataBits::Eight,
    }
}

/// Parity handed to the driver. Mark and space open without parity and are
/// switched on by `open_port`.
fn driver_parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
        Parity::None | Parity::Mark | Parity::Space => serialport::Parity::None,
    }
}

/// termios has no 1.5 stop bits; CSTOPB gives 1.5 on a 5-bit line and 2
/// otherwise.
fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
        StopBits::OnePointFive => {
            warn!("1.5 stop bits requested, configuring 2");
            serialport::StopBits::Two
        }
    }
}
