//! Diagnostic logging
//!
//! Records go to stdout; everything logged through `tracing` goes to stderr
//! so the two never interleave in a pipe.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for monitor diagnostics
///
/// Call early in main() before any logging occurs.
/// `verbose` raises the default level from `warn` to `debug`;
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .compact(),
        )
        .with(filter)
        .try_init();
}
