//! Diagnostic logging for the pipeline itself.
//!
//! Queue and transport diagnostics (retries, abandoned batches) are emitted
//! through `tracing`. Hosts that already install a subscriber need nothing
//! from here; standalone tools call [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

/// Initialize a compact stderr subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Does nothing if a global
/// subscriber is already installed.
///
/// ```ignore
/// telemetry_client::init_logging("info");
/// tracing::info!("ready");
/// ```
pub fn init_logging(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
