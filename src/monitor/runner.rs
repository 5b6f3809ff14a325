//! Monitor runner
//!
//! Connects, runs a session, and optionally reconnects when the connection
//! drops. One session (and so one codec) lives across reconnections; the
//! session closes out the framing state whenever a connection ends.

use super::session::{MonitorSession, SessionEnd};
use super::stats::Stats;
use crate::codec::JsonObjectCodec;
use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::render::Renderer;
use crate::telemetry::Decoder;
use crate::transport::{TcpTransport, Transport};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

// =============================================================================
// Main entry point
// =============================================================================

/// Run the monitor until shutdown, end of stream, or a fatal error
///
/// Rendered lines go to `sink`, which is handed back on success.
pub async fn run<W: Write>(
    config: &Config,
    shutdown: Arc<AtomicBool>,
    stats: Arc<Stats>,
    sink: W,
) -> Result<W> {
    let mut session = build_session(config, sink, stats.clone());
    let reconnect = config.connection.reconnect;

    while !shutdown.load(Ordering::Relaxed) {
        let transport = match TcpTransport::connect(&config.connection).await {
            Ok(t) => t,
            Err(e) if reconnect => {
                warn!("{}, retrying in {:?}", e, config.connection.reconnect_delay());
                tokio::time::sleep(config.connection.reconnect_delay()).await;
                continue;
            }
            Err(e) => return Err(e),
        };
        stats.add_connection();

        let channels = transport.spawn(shutdown.clone())?;

        match session.run(channels, shutdown.clone()).await {
            Ok(SessionEnd::Shutdown) => break,
            Ok(SessionEnd::Disconnected) if reconnect => {
                warn!("Connection closed by simulator, reconnecting...");
            }
            Ok(SessionEnd::Disconnected) => {
                info!("Connection closed by simulator");
                break;
            }
            Err(e @ MonitorError::Read { .. }) if reconnect => {
                warn!("{}, reconnecting...", e);
            }
            Err(e) => {
                info!("Stopped: {}", stats.snapshot());
                return Err(e);
            }
        }

        tokio::time::sleep(config.connection.reconnect_delay()).await;
    }

    info!("Stopped: {}", stats.snapshot());
    Ok(session.into_sink())
}

// =============================================================================
// Helpers
// =============================================================================

/// Build a session from configuration
pub fn build_session<W: Write>(
    config: &Config,
    sink: W,
    stats: Arc<Stats>,
) -> MonitorSession<JsonObjectCodec, W> {
    MonitorSession::new(
        JsonObjectCodec::new(config.framing.max_document_size),
        Decoder::new(config.decode.unknown_kind, config.decode.vocabulary()),
        Renderer::new(config.output.format, config.output.wall_clock),
        config.decode.on_error,
        sink,
        stats,
    )
}
