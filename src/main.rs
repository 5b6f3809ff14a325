//! Simulator telemetry monitor
//!
//! Usage:
//!   sim-telemetry                       Connect to 127.0.0.1:1534 and print records
//!   sim-telemetry --port 1600 -f json   Other port, JSON lines output
//!   sim-telemetry --reconnect           Keep dialing when the simulator restarts

use clap::Parser;
use sim_telemetry::cli::Cli;
use sim_telemetry::error::{MonitorError, Result};
use sim_telemetry::{config, logging, monitor};
use std::error::Error;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let rt = tokio::runtime::Runtime::new().map_err(|source| MonitorError::Runtime { source })?;

    rt.block_on(async {
        let shutdown = Arc::new(AtomicBool::new(false));
        spawn_signal_handler(shutdown.clone());

        let stats = Arc::new(monitor::Stats::new());
        let stdout = std::io::stdout().lock();
        monitor::run(&config, shutdown, stats, stdout)
            .await
            .map(|_| ())
    })
}

/// Set `shutdown` on Ctrl-C / SIGTERM
fn spawn_signal_handler(shutdown: Arc<AtomicBool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        use tracing::warn;

        tokio::spawn(async move {
            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Cannot install signal handlers: {}", e);
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
            shutdown.store(true, Ordering::SeqCst);
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }
}
