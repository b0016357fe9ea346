//! Per-device defaults: which port a device sits on, its baud rate and the
//! payload behind each action.
//!
//! The defaults are a JSON document keyed by device id:
//!
//! ```json
//! {"lamp": {"port": "/dev/ttyUSB0", "baudrate": 38400, "payloads": {"turn_on": "3101"}}}
//! ```

use crate::error::ConfigError;
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULTS_FILE_NAME: &str = "device_defaults.json";

/// Baud rate used when neither the request nor the device entry names one.
pub const DEFAULT_BAUD_RATE: u32 = 38400;

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baudrate: Option<u32>,
    #[serde(default)]
    pub payloads: BTreeMap<String, String>,
}

impl DeviceConfig {
    pub fn payload(&self, action: &str) -> Option<&str> {
        self.payloads.get(action).map(String::as_str)
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct DeviceDefaults(BTreeMap<String, DeviceConfig>);

impl DeviceDefaults {
    pub fn empty() -> DeviceDefaults {
        DeviceDefaults::default()
    }

    pub fn from_json(text: &str) -> Result<DeviceDefaults, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn get(&self, device: &str) -> Option<&DeviceConfig> {
        self.0.get(device)
    }

    pub fn contains(&self, device: &str) -> bool {
        self.0.contains_key(device)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Devices and the actions each one has a payload for.
    pub fn whitelist(&self) -> BTreeMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|(device, cfg)| (device.clone(), cfg.payloads.keys().cloned().collect()))
            .collect()
    }
}

impl FromIterator<(String, DeviceConfig)> for DeviceDefaults {
    fn from_iter<I: IntoIterator<Item = (String, DeviceConfig)>>(iter: I) -> Self {
        DeviceDefaults(iter.into_iter().collect())
    }
}

/// Where the defaults come from. Loaded once by the caller and handed to the
/// dispatcher.
pub trait DefaultsSource {
    fn load(&self) -> Result<DeviceDefaults, ConfigError>;
}

impl DefaultsSource for DeviceDefaults {
    fn load(&self) -> Result<DeviceDefaults, ConfigError> {
        Ok(self.clone())
    }
}

/// Defaults read from a JSON file, either at a given path or the first one
/// found along a search path.
#[derive(Debug, Clone)]
pub struct FileDefaults {
    explicit: Option<PathBuf>,
    candidates: Vec<PathBuf>,
}

impl FileDefaults {
    /// The file must exist.
    pub fn explicit<P: Into<PathBuf>>(path: P) -> FileDefaults {
        FileDefaults {
            explicit: Some(path.into()),
            candidates: Vec::new(),
        }
    }

    /// First existing candidate wins; none at all means empty defaults.
    pub fn search(candidates: Vec<PathBuf>) -> FileDefaults {
        FileDefaults {
            explicit: None,
            candidates,
        }
    }

    pub fn discover() -> FileDefaults {
        FileDefaults::search(default_candidates())
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

/// `device_defaults.json` beside the executable, in the working directory,
/// under `./src/services` (where the web front end keeps it), then under
/// `./config`.
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(4);
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(DEFAULTS_FILE_NAME));
    }
    candidates.push(PathBuf::from(DEFAULTS_FILE_NAME));
    candidates.push(Path::new("src").join("services").join(DEFAULTS_FILE_NAME));
    candidates.push(Path::new("config").join(DEFAULTS_FILE_NAME));
    candidates
}

impl DefaultsSource for FileDefaults {
    fn load(&self) -> Result<DeviceDefaults, ConfigError> {
        if let Some(path) = &self.explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound { path: path.clone() });
            }
            return read_defaults(path);
        }
        match self.candidates.iter().find(|p| p.is_file()) {
            Some(path) => read_defaults(path),
            None => {
                debug!("No {} found in {:?}", DEFAULTS_FILE_NAME, self.candidates);
                Ok(DeviceDefaults::empty())
            }
        }
    }
}

fn read_defaults(path: &Path) -> Result<DeviceDefaults, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let defaults = DeviceDefaults::from_json(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded {} device(s) from {}", defaults.len(), path.display());
    Ok(defaults)
}
