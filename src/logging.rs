/// Logging setup
///
/// `RUST_LOG` controls verbosity; without it this crate logs at `info`
/// and everything else at `warn`.
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,timetable_viewer=info";

/// Install the global subscriber. Calling it again is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
