use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// Diagnostics go to stderr so stdout carries only the per-file report.
/// `RUST_LOG` takes precedence over `verbose`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
