use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `level` is an env-filter
/// directive (e.g. "info", "pageforge=debug"); `RUST_LOG` wins when set.
/// Safe to call more than once; later calls are no-ops.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
