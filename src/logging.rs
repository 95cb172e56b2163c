use tracing_subscriber::EnvFilter;

// Install a stderr fmt subscriber. RUST_LOG wins over `default_directive`.
// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
