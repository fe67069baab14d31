use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes logging to stderr. The level can be controlled via the
/// `--log-level` flag or the `RUST_LOG` environment variable, which always
/// wins when set.
pub fn init_logging(level: &str) {
    let default_filter = format!("retire_cli={level},retire_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}
