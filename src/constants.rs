//! Application-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Network
// =============================================================================

/// Default simulator telemetry host (loopback)
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default simulator telemetry TCP port
pub const DEFAULT_PORT: u16 = 1534;

/// Default timeout for establishing the TCP connection (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// Timing - Reconnection
// =============================================================================

/// Delay between reconnection attempts (milliseconds)
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2_000;

/// Interval at which the session polls the shutdown flag (milliseconds)
pub const SHUTDOWN_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// Buffers
// =============================================================================

/// TCP read buffer size
pub const READ_BUFFER_SIZE: usize = 1024;

/// Channel capacity for async message passing
pub const CHANNEL_CAPACITY: usize = 256;

/// Maximum size of a single JSON document before it is dropped (1 MiB)
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 1024 * 1024;

/// Number of document bytes included in decode error logs
pub const ERROR_PREVIEW_LEN: usize = 120;

// =============================================================================
// Files
// =============================================================================

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "sim-telemetry.toml";
