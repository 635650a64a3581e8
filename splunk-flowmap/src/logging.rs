use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. An invalid filter falls back to `warn`.
pub fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
