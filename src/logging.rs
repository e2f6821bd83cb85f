use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `tracing` subscriber. An unparsable filter falls back
/// to `info`.
pub fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = fmt().with_env_filter(env_filter).with_target(false).try_init();
}
