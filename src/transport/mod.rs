//! Transport abstraction for byte-level input
//!
//! Separates I/O concerns from protocol logic:
//! - **Transport**: How bytes arrive (TCP, ...)
//! - **Codec**: How messages are framed (handled separately)
//!
//! # Adding a new transport
//!
//! 1. Create `transport/my_transport.rs`
//! 2. Implement the `Transport` trait
//! 3. Add `pub mod my_transport;` here
//! 4. No other changes needed

pub mod tcp;

pub use tcp::TcpTransport;

use bytes::Bytes;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::Result;

/// Channel end handed to the consumer of a transport
///
/// The transport owns the underlying I/O (socket, ...) and forwards what it
/// reads through this channel. When the transport stops (shutdown, end of
/// stream or error), it closes the channel.
pub struct TransportChannels {
    /// Receive raw byte chunks in arrival order
    ///
    /// An `Err` item is the read error that stopped the transport; it is
    /// always the last item. `None` means the transport has stopped.
    pub rx: mpsc::Receiver<Result<Bytes>>,
}

/// Trait for spawnable transports
///
/// A transport handles:
/// - Reading raw bytes from its connection
/// - Its own execution model (async task, thread, ...)
///
/// A transport does NOT handle:
/// - Message framing (that's the codec's job)
/// - Statistics or logging of messages (that's the session's job)
/// - Reconnection logic (that's the runner's job)
///
/// # Lifecycle
///
/// 1. Create the transport (e.g. connect)
/// 2. Call `spawn()` to start reading in background
/// 3. Consume the returned channel
/// 4. Transport runs until `shutdown` is set, the peer closes the
///    connection, or a read fails; then the channel closes
pub trait Transport: Send + 'static {
    /// Spawn the transport in background
    fn spawn(self, shutdown: Arc<AtomicBool>) -> Result<TransportChannels>;
}
