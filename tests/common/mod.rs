#![allow(dead_code)]

use devicectl::{Connection, LineSettings, Transport, TransportError};
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct Record {
    pub opens: Vec<LineSettings>,
    pub writes: Vec<Vec<u8>>,
    pub flushes: usize,
    pub closes: usize,
}

/// Stand-in for a serial line that remembers everything done to it.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    record: Arc<Mutex<Record>>,
    fail_open: Option<String>,
    fail_write: Option<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open(message: &str) -> Self {
        RecordingTransport {
            fail_open: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_write(message: &str) -> Self {
        RecordingTransport {
            fail_write: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn opens(&self) -> Vec<LineSettings> {
        self.record.lock().unwrap().opens.clone()
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.record.lock().unwrap().writes.clone()
    }

    pub fn flushes(&self) -> usize {
        self.record.lock().unwrap().flushes
    }

    pub fn closes(&self) -> usize {
        self.record.lock().unwrap().closes
    }
}

impl Transport for RecordingTransport {
    fn open(&self, line: &LineSettings) -> Result<Box<dyn Connection>, TransportError> {
        self.record.lock().unwrap().opens.push(line.clone());
        if let Some(message) = &self.fail_open {
            return Err(serialport::Error::new(serialport::ErrorKind::NoDevice, message.clone()).into());
        }
        Ok(Box::new(RecordingConnection {
            record: self.record.clone(),
            fail_write: self.fail_write.clone(),
        }))
    }
}

struct RecordingConnection {
    record: Arc<Mutex<Record>>,
    fail_write: Option<String>,
}

impl Connection for RecordingConnection {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if let Some(message) = &self.fail_write {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, message.clone()).into());
        }
        self.record.lock().unwrap().writes.push(bytes.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.record.lock().unwrap().flushes += 1;
        Ok(())
    }
}

impl Drop for RecordingConnection {
    fn drop(&mut self) {
        self.record.lock().unwrap().closes += 1;
    }
}

pub const LAMP_DEFAULTS: &str = r#"{
    "lamp": {"port": "/dev/ttyUSB0", "baudrate": 38400, "payloads": {"turn_on": "3101", "turn_off": "3100"}},
    "sprinkler": {"port": "/dev/ttyUSB1", "payloads": {"turn_on": "4101"}},
    "portless": {"payloads": {"turn_on": "5101"}}
}"#;

pub fn lamp_defaults() -> devicectl::DeviceDefaults {
    devicectl::DeviceDefaults::from_json(LAMP_DEFAULTS).unwrap()
}
