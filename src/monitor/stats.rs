//! Stream statistics for the monitor
//!
//! Thread-safe counters shared between the session and whoever reports on
//! it. Uses lock-free atomics for all operations.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one monitor run (all connections)
#[derive(Debug, Default)]
pub struct Stats {
    /// Successful connections
    connections: AtomicU64,
    /// Raw bytes received
    bytes: AtomicU64,
    /// Complete documents produced by the framer
    documents: AtomicU64,
    /// Records decoded and rendered
    records: AtomicU64,
    /// Documents that failed to decode
    decode_errors: AtomicU64,
    /// Framing errors reported by the codec
    framing_errors: AtomicU64,
    /// Records decoded through the unknown-kind fallback
    unknown_kinds: AtomicU64,
    /// Events outside the vocabulary
    unknown_events: AtomicU64,
}

/// Point-in-time copy of [`Stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub connections: u64,
    pub bytes: u64,
    pub documents: u64,
    pub records: u64,
    pub decode_errors: u64,
    pub framing_errors: u64,
    pub unknown_kinds: u64,
    pub unknown_events: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_bytes(&self, bytes: usize) {
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_document(&self) {
        self.documents.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_record(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_framing_error(&self) {
        self.framing_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_unknown_kind(&self) {
        self.unknown_kinds.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_unknown_event(&self) {
        self.unknown_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            connections: self.connections.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            documents: self.documents.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            unknown_kinds: self.unknown_kinds.load(Ordering::Relaxed),
            unknown_events: self.unknown_events.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes, {} documents, {} records, {} decode errors, {} framing errors",
            self.bytes, self.documents, self.records, self.decode_errors, self.framing_errors
        )?;
        if self.unknown_kinds > 0 || self.unknown_events > 0 {
            write!(
                f,
                " ({} unknown types, {} unknown events)",
                self.unknown_kinds, self.unknown_events
            )?;
        }
        Ok(())
    }
}
