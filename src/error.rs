//! Centralized error types for the monitor
//!
//! All monitor errors are represented by the `MonitorError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, MonitorError>`.

use crate::telemetry::DecodeError;
use std::fmt;
use std::path::PathBuf;

/// All monitor errors
#[derive(Debug)]
pub enum MonitorError {
    // === Network ===
    /// Failed to connect to the simulator
    Connect {
        addr: String,
        source: std::io::Error,
    },
    /// Connection attempt did not complete in time
    ConnectTimeout { addr: String },
    /// Reading from the connection failed
    Read { source: std::io::Error },

    // === Protocol ===
    /// A message could not be decoded (only fatal with `on_error = "abort"`)
    Decode(DecodeError),

    // === Output ===
    /// Writing rendered records failed
    Output { source: std::io::Error },

    // === Config ===
    /// Config file could not be read
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },

    // === Runtime ===
    /// Tokio runtime creation failed
    Runtime { source: std::io::Error },
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect { source, .. }
            | Self::Read { source }
            | Self::Output { source }
            | Self::ConfigRead { source, .. }
            | Self::Runtime { source } => Some(source),
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect { addr, source } => write!(f, "Cannot connect to {}: {}", addr, source),
            Self::ConnectTimeout { addr } => write!(f, "Timed out connecting to {}", addr),
            Self::Read { source } => write!(f, "Connection read failed: {}", source),
            Self::Decode(err) => write!(f, "{}", err),
            Self::Output { source } => write!(f, "Cannot write output: {}", source),
            Self::ConfigRead { path, .. } => write!(f, "Cannot read config: {}", path.display()),
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::Runtime { .. } => write!(f, "Failed to create runtime"),
        }
    }
}

impl From<DecodeError> for MonitorError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

/// Alias for Result with MonitorError
pub type Result<T> = std::result::Result<T, MonitorError>;
