//! Monitor layer
//!
//! Ties transport, codec, decoder and renderer together into the read loop.

pub mod runner;
pub mod session;
pub mod stats;

pub use runner::run;
pub use session::{MonitorSession, SessionEnd};
pub use stats::{Snapshot, Stats};
