//! logging
//!
//! Diagnostic logging setup.
//!
//! Library code emits `tracing` events; the binary installs a `fmt`
//! subscriber writing to stderr. `RUST_LOG` selects what is shown, and
//! `--debug` forces debug output for this crate.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor `--debug` is given.
const DEFAULT_FILTER: &str = "warn";

/// Build the event filter for the given flags.
pub fn filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("ruledesk=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Calling it twice keeps the first one.
pub fn init(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_writer(std::io::stderr)
        .with_target(debug)
        .try_init();
}
