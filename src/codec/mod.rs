//! Codec abstraction for message framing
//!
//! Separates framing concerns from transport:
//! - **Codec**: How message boundaries are recovered from a byte stream
//! - **Transport**: How bytes flow (TCP, ...)
//!
//! # Adding a new codec
//!
//! 1. Create `codec/my_codec.rs`
//! 2. Implement the `Codec` trait
//! 3. Add `pub mod my_codec;` here
//! 4. No other changes needed

pub mod json_object;

pub use json_object::JsonObjectCodec;

use bytes::Bytes;
use std::fmt;

/// Item produced by a codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// One complete document, byte-identical to its span in the stream
    Document(Bytes),
    /// The stream did not follow the expected framing; the codec has
    /// already resynchronized and keeps going
    Error(FramingError),
}

/// Recoverable framing problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingError {
    /// A closing brace arrived while no document was open
    UnbalancedClose,
    /// Non-whitespace bytes between documents were discarded
    StrayBytes { count: usize },
    /// A document exceeded the size limit and was dropped
    Oversized { size: usize, limit: usize },
    /// The stream ended inside a document
    Truncated { pending: usize },
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedClose => write!(f, "unbalanced '}}' outside of a document"),
            Self::StrayBytes { count } => {
                write!(f, "discarded {} stray byte(s) between documents", count)
            }
            Self::Oversized { size, limit } => {
                write!(f, "document of {} bytes exceeds limit of {}", size, limit)
            }
            Self::Truncated { pending } => {
                write!(f, "stream ended inside a document ({} bytes dropped)", pending)
            }
        }
    }
}

impl std::error::Error for FramingError {}

/// Codec trait for recovering frames from a byte stream
pub trait Codec: Send {
    /// Decode incoming bytes
    ///
    /// Calls `on_frame` for each complete frame detected, in stream order.
    /// May buffer partial data internally.
    fn decode(&mut self, data: &[u8], on_frame: impl FnMut(Frame));

    /// Close the stream
    ///
    /// Reports whatever the stream left unfinished as `Frame::Error`, then
    /// leaves the codec as after [`Codec::reset`].
    fn finish(&mut self, on_frame: impl FnMut(Frame));

    /// Discard any partially accumulated frame
    fn reset(&mut self);
}
