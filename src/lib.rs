//! Driving-simulator telemetry monitor
//!
//! Reads the simulator's undelimited JSON stream over TCP, frames it into
//! documents, decodes each into a typed [`telemetry::Record`] and renders
//! one line per record.
//!
//! ```text
//! TcpTransport ──chunks──► JsonObjectCodec ──documents──► Decoder ──records──► Renderer
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod render;
pub mod telemetry;
pub mod transport;

pub use error::{MonitorError, Result};
