use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Level comes from `RUST_LOG` (default `info`). Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}
