// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Default directive when `RUST_LOG` is unset; dependency crates stay at warn.
const DEFAULT_DIRECTIVE: &str = "warn,pharmacy_report_extractor=info,pharmacy_extract=info";
const VERBOSE_DIRECTIVE: &str = "warn,pharmacy_report_extractor=debug,pharmacy_extract=debug";

/// Installs the global subscriber. `RUST_LOG` always wins over `verbose`.
///
/// Logs go to stderr so stdout stays usable for piping.
pub fn setup_logging(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();

    tracing::debug!("Logging setup complete (verbose: {}).", verbose);
}
