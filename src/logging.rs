// ./src/logging.rs

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Only the first call has any
/// effect; later calls (e.g. from several tests) are no-ops.
pub fn init(level: &str) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        install(filter);
    });
}

/// Installs the fmt subscriber. Returns `false` when another global
/// subscriber was already set; that one stays in charge.
fn install(filter: EnvFilter) -> bool {
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(target: "proofpack::logging", error = %e, "keeping existing global subscriber");
            false
        }
    }
}
