//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.
//! Values given here override the config file.

use crate::config::{Config, DecodeErrorPolicy};
use crate::render::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// Print driving-simulator telemetry received over TCP
#[derive(Parser, Debug, Default)]
#[command(name = "sim-telemetry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (default: ./sim-telemetry.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Simulator host (overrides config)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Simulator telemetry port (overrides config, default: 1534)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Output line format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// What to do when a message cannot be decoded
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_error: Option<DecodeErrorPolicy>,

    /// Reconnect when the connection drops
    #[arg(long)]
    pub reconnect: bool,

    /// Prefix each line with the local receive time
    #[arg(long)]
    pub wall_clock: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = self.port {
            config.connection.port = port;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(policy) = self.on_error {
            config.decode.on_error = policy;
        }
        if self.reconnect {
            config.connection.reconnect = true;
        }
        if self.wall_clock {
            config.output.wall_clock = true;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
