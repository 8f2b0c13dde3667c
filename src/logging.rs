//! Structured logging setup, mirroring this codebase's usual CLI-boundary
//! subscriber wiring: a compact stderr layer gated by an explicit verbosity
//! flag, with an `RUST_LOG` env filter able to override it.
use tracing_subscriber::{filter, prelude::*};

/// Initializes the global tracing subscriber.
///
/// `verbose` selects `DEBUG` as the default level; otherwise `INFO`. Set
/// `RUST_LOG` to override the default filter entirely.
pub fn setup(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = filter::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter::EnvFilter::new(default_level));

    let terminal_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(terminal_log.with_filter(filter))
        .init();
}
