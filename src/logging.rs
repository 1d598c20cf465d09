// logging.rs

use tracing_subscriber::EnvFilter;

/// Default filter; the interactive output stays clean unless `RUST_LOG`
/// asks for more.
pub const DEFAULT_FILTER: &str = "warn";

/// Send `tracing` events to stderr. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
