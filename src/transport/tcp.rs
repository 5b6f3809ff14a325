//! TCP client transport
//!
//! Dials the simulator and forwards every non-empty read as one chunk.
//! Chunks carry no relation to message boundaries.

use super::{Transport, TransportChannels};
use crate::config::ConnectionConfig;
use crate::constants::{CHANNEL_CAPACITY, SHUTDOWN_POLL_INTERVAL_MS};
use crate::error::{MonitorError, Result};
use bytes::Bytes;
use socket2::{SockRef, TcpKeepalive};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outbound TCP connection to the simulator
///
/// # Example
///
/// ```ignore
/// let transport = TcpTransport::connect(&config.connection).await?;
/// let mut channels = transport.spawn(shutdown)?;
///
/// while let Some(chunk) = channels.rx.recv().await {
///     let chunk = chunk?;
///     // feed the codec
/// }
/// // Channel closed = connection ended
/// ```
pub struct TcpTransport {
    stream: TcpStream,
    read_buffer_size: usize,
}

impl TcpTransport {
    /// Connect using the connection settings
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let addr = config.address();

        let stream = match tokio::time::timeout(config.connect_timeout(), TcpStream::connect(&addr))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(MonitorError::Connect { addr, source }),
            Err(_) => return Err(MonitorError::ConnectTimeout { addr }),
        };

        if let Some(idle) = config.keepalive() {
            let keepalive = TcpKeepalive::new().with_time(idle);
            if let Err(e) = SockRef::from(&stream).set_tcp_keepalive(&keepalive) {
                warn!("Failed to enable TCP keepalive: {}", e);
            }
        }

        info!("Connected to {}", addr);
        Ok(Self::from_stream(stream, config.read_buffer_size))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, read_buffer_size: usize) -> Self {
        Self {
            stream,
            read_buffer_size: read_buffer_size.max(1),
        }
    }
}

impl Transport for TcpTransport {
    fn spawn(self, shutdown: Arc<AtomicBool>) -> Result<TransportChannels> {
        let (in_tx, in_rx) = mpsc::channel::<Result<Bytes>>(CHANNEL_CAPACITY);

        let mut stream = self.stream;
        let mut buf = vec![0u8; self.read_buffer_size];

        tokio::spawn(async move {
            while !shutdown.load(Ordering::Relaxed) {
                match tokio::time::timeout(
                    Duration::from_millis(SHUTDOWN_POLL_INTERVAL_MS),
                    stream.read(&mut buf),
                )
                .await
                {
                    Ok(Ok(0)) => {
                        debug!("Connection closed by peer");
                        break;
                    }
                    Ok(Ok(len)) => {
                        if in_tx
                            .send(Ok(Bytes::copy_from_slice(&buf[..len])))
                            .await
                            .is_err()
                        {
                            // Receiver dropped
                            break;
                        }
                    }
                    Ok(Err(source)) => {
                        let _ = in_tx.send(Err(MonitorError::Read { source })).await;
                        break;
                    }
                    Err(_) => {
                        // Timeout - expected, allows checking shutdown flag
                    }
                }
            }
        });

        Ok(TransportChannels { rx: in_rx })
    }
}
