//! Structured logging setup.
//!
//! The engine itself only emits `tracing` events; hosts that want output on
//! stderr can call [`init`] once at startup. Respects `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install a global stderr subscriber with env-filter support.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
