use crate::core::{DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_SEND_TIMEOUT_MS, LOW_LATENCY_SEND_TIMEOUT_MS, MAX_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Timeouts a `StreamAdapter` applies on behalf of its callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Timeout for configuration reads and writes (milliseconds)
    pub command_timeout_ms: u32,
    /// Timeout for frame transmission (milliseconds)
    pub send_timeout_ms: u32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } => {
                write!(f, "Invalid parameter '{}' = '{}': {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => write!(f, "I/O error: {}", message),
            ConfigError::SerializationError { message } => write!(f, "Serialization error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AdapterConfig {
    /// Short transmit deadline for links that favour latency over delivery
    pub fn low_latency() -> Self {
        Self {
            send_timeout_ms: LOW_LATENCY_SEND_TIMEOUT_MS,
            ..Self::default()
        }
    }

    pub fn with_command_timeout(mut self, timeout_ms: u32) -> Self {
        self.command_timeout_ms = timeout_ms;
        self
    }

    pub fn with_send_timeout(mut self, timeout_ms: u32) -> Self {
        self.send_timeout_ms = timeout_ms;
        self
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms as u64)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms as u64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("command_timeout_ms", self.command_timeout_ms)?;
        check_timeout("send_timeout_ms", self.send_timeout_ms)?;
        Ok(())
    }

    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: AdapterConfig = serde_json::from_str(content)
            .map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse adapter config: {}", e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::IoError {
                message: format!("Failed to read config file '{}': {}", path_str, e),
            })?;

        Self::from_json(&content)
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        self.validate()?;

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            })?;

        fs::write(&path, content)
            .map_err(|e| ConfigError::IoError {
                message: format!("Failed to write config file '{}': {}", path_str, e),
            })
    }
}

fn check_timeout(parameter: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: "Timeout must be greater than zero".to_string(),
        });
    }

    if value > MAX_TIMEOUT_MS {
        return Err(ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: format!("Timeout must not exceed {} ms", MAX_TIMEOUT_MS),
        });
    }

    Ok(())
}
