//! Turns a (device, action, overrides) request into one serial write.

use crate::config::{DeviceDefaults, DEFAULT_BAUD_RATE};
use crate::error::{DispatchError, ErrorKind, ResolutionError};
use crate::framing::{ByteSize, Framing, Parity, StopBits};
use crate::transport::{self, LineSettings, Transport};
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One invocation's worth of input. Any override beats the device defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchRequest {
    pub device: String,
    pub action: String,
    pub payload: Option<String>,
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub byte_size: Option<ByteSize>,
    pub parity: Option<Parity>,
    pub stop_bits: Option<StopBits>,
}

impl DispatchRequest {
    pub fn new(device: &str, action: &str) -> DispatchRequest {
        DispatchRequest {
            device: device.to_string(),
            action: action.to_string(),
            ..DispatchRequest::default()
        }
    }

    pub fn payload(mut self, payload: &str) -> Self {
        self.payload = Some(payload.to_string());
        self
    }

    pub fn port(mut self, port: &str) -> Self {
        self.port = Some(port.to_string());
        self
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    /// Framing never comes from the device defaults, only from overrides.
    pub fn framing(&self) -> Framing {
        Framing::with_overrides(self.byte_size, self.parity, self.stop_bits)
    }
}

/// Outcome of a dispatch, printed as a single JSON line.
///
/// On failure the port, baud rate and payload are present only when they were
/// resolved before the error.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub device: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baudrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip)]
    pub failure: Option<ErrorKind>,
}

impl DispatchResult {
    fn pending(request: &DispatchRequest) -> DispatchResult {
        DispatchResult {
            ok: false,
            error: None,
            device: request.device.clone(),
            action: request.action.clone(),
            port: None,
            baudrate: None,
            payload: None,
            failure: None,
        }
    }

    /// A request that failed before dispatch could start, e.g. on loading the
    /// defaults.
    pub fn rejected(request: &DispatchRequest, err: &DispatchError) -> DispatchResult {
        let mut result = DispatchResult::pending(request);
        result.fail(err);
        result
    }

    fn fail(&mut self, err: &DispatchError) {
        self.ok = false;
        self.error = Some(err.to_string());
        self.failure = Some(err.kind());
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"ok": false, "error": "{}"}}"#, e)
        })
    }
}

/// Resolves `request` against `defaults`, writes the payload through
/// `transport` and reports what happened. Never retries.
pub fn dispatch<T: Transport + ?Sized>(
    request: &DispatchRequest,
    defaults: &DeviceDefaults,
    transport: &T,
) -> DispatchResult {
    let mut result = DispatchResult::pending(request);
    match run(request, defaults, transport, &mut result) {
        Ok(()) => {
            info!(
                "Sent {:?} to {} ({}/{})",
                result.payload.as_deref().unwrap_or_default(),
                result.port.as_deref().unwrap_or_default(),
                request.device,
                request.action
            );
            result.ok = true;
        }
        Err(e) => {
            warn!("Can't dispatch {}/{}: {}", request.device, request.action, e);
            result.fail(&e);
        }
    }
    result
}

fn run<T: Transport + ?Sized>(
    request: &DispatchRequest,
    defaults: &DeviceDefaults,
    transport: &T,
    result: &mut DispatchResult,
) -> Result<(), DispatchError> {
    let device = defaults.get(&request.device);
    let port_override = non_empty(&request.port);
    let payload_override = non_empty(&request.payload);

    if device.is_none() && (port_override.is_none() || payload_override.is_none()) {
        return Err(ResolutionError::UnknownDevice {
            device: request.device.clone(),
        }
        .into());
    }

    let port = port_override
        .or_else(|| device.and_then(|d| non_empty(&d.port)))
        .ok_or_else(|| ResolutionError::NoPort {
            device: request.device.clone(),
        })?;
    result.port = Some(port.to_string());

    let baud_rate = request
        .baud_rate
        .or_else(|| device.and_then(|d| d.baudrate))
        .unwrap_or(DEFAULT_BAUD_RATE);
    result.baudrate = Some(baud_rate);
    if baud_rate == 0 {
        return Err(ResolutionError::ZeroBaudRate.into());
    }

    let payload = payload_override
        .or_else(|| {
            device
                .and_then(|d| d.payload(&request.action))
                .filter(|p| !p.is_empty())
        })
        .ok_or_else(|| ResolutionError::NoPayload {
            device: request.device.clone(),
            action: request.action.clone(),
        })?;
    result.payload = Some(payload.to_string());
    if !payload.is_ascii() {
        return Err(ResolutionError::NonAsciiPayload {
            payload: payload.to_string(),
        }
        .into());
    }

    let line = LineSettings::new(port, baud_rate, request.framing());
    transport::send(transport, &line, payload.as_bytes())?;
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Display for DispatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json())
    }
}
