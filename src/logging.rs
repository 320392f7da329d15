//! Logging initialization
//!
//! Installs a `tracing` subscriber that writes to stderr, so diagnostics never
//! mix with the report on stdout.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::cli::VerbosityLevel;

static INIT_ONCE: Once = Once::new();

/// Default filter directive for a verbosity level
pub fn default_directive(verbosity: VerbosityLevel) -> &'static str {
    match verbosity {
        VerbosityLevel::Quiet => "xml_compare=error",
        VerbosityLevel::Normal => "xml_compare=warn",
        VerbosityLevel::Verbose => "xml_compare=info",
        VerbosityLevel::Debug => "xml_compare=debug",
    }
}

/// Initialize the logging facility
///
/// `RUST_LOG` takes precedence over the verbosity-derived default. Calling
/// this more than once has no further effect.
pub fn init(verbosity: VerbosityLevel) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        // A subscriber installed elsewhere (e.g. by a test harness) wins.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
