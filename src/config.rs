//! Configuration management
//!
//! Config is read from the path given with `--config`, or from
//! `sim-telemetry.toml` in the working directory when present.
//! Every section and field is optional and falls back to its default.

use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_MAX_DOCUMENT_SIZE,
    DEFAULT_PORT, DEFAULT_RECONNECT_DELAY_MS, READ_BUFFER_SIZE,
};
use crate::error::{MonitorError, Result};
use crate::render::OutputFormat;
use crate::telemetry::{EventVocabulary, UnknownKindPolicy};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub framing: FramingConfig,
    pub decode: DecodeConfig,
    pub output: OutputConfig,
}

// =============================================================================
// Connection
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Simulator host
    pub host: String,
    /// Simulator telemetry port
    pub port: u16,
    /// Size of each socket read
    pub read_buffer_size: usize,
    /// Timeout for establishing the connection
    pub connect_timeout_ms: u64,
    /// TCP keepalive idle time (0 = disabled)
    pub keepalive_secs: u64,
    /// Dial again after the connection drops instead of exiting
    pub reconnect: bool,
    /// Wait between reconnection attempts
    pub reconnect_delay_ms: u64,
}

impl ConnectionConfig {
    /// `host:port` as used for dialing
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn keepalive(&self) -> Option<Duration> {
        (self.keepalive_secs > 0).then(|| Duration::from_secs(self.keepalive_secs))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            read_buffer_size: READ_BUFFER_SIZE,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            keepalive_secs: 0,
            reconnect: false,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
        }
    }
}

// =============================================================================
// Framing
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Documents larger than this are dropped with a framing error
    pub max_document_size: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

// =============================================================================
// Decode
// =============================================================================

/// What a decode failure does to the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecodeErrorPolicy {
    /// Log the failure, drop the message, keep reading
    #[default]
    Skip,
    /// Stop on the first message that fails to decode
    Abort,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Policy for messages that fail to decode
    pub on_error: DecodeErrorPolicy,
    /// Policy for `Type` tags outside the known set
    pub unknown_kind: UnknownKindPolicy,
    /// Event names recognized in addition to the built-in vocabulary
    pub extra_events: Vec<String>,
}

impl DecodeConfig {
    pub fn vocabulary(&self) -> EventVocabulary {
        EventVocabulary::with_extra(self.extra_events.iter().cloned())
    }
}

// =============================================================================
// Output
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Prefix lines with the local receive time
    pub wall_clock: bool,
}

// =============================================================================
// Loading
// =============================================================================

impl Config {
    /// Parse config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MonitorError::ConfigValidation {
            field: "config",
            reason: e.to_string(),
        })
    }

    /// Reject values the monitor cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.connection.host.trim().is_empty() {
            return Err(MonitorError::ConfigValidation {
                field: "connection.host",
                reason: "must not be empty".into(),
            });
        }
        if self.connection.port == 0 {
            return Err(MonitorError::ConfigValidation {
                field: "connection.port",
                reason: "must not be 0".into(),
            });
        }
        if self.connection.read_buffer_size == 0 {
            return Err(MonitorError::ConfigValidation {
                field: "connection.read_buffer_size",
                reason: "must be greater than 0".into(),
            });
        }
        if self.framing.max_document_size == 0 {
            return Err(MonitorError::ConfigValidation {
                field: "framing.max_document_size",
                reason: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

/// Read and parse a config file
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| MonitorError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Config::from_toml(&content)
}

/// Load config
///
/// An explicit path must exist and parse. Without one, the default file in
/// the working directory is used if present; problems with it fall back to
/// defaults with a warning.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        debug!("Loading config from {}", path.display());
        return load_from(path);
    }

    let path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }

    match load_from(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("{} in {:?}, using defaults", e, path);
            Ok(Config::default())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
