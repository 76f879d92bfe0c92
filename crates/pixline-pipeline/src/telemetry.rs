//! Tracing initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging with an env-controlled filter.
///
/// Safe to call more than once; later calls are no-ops, which keeps test
/// binaries that share a process happy.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "pixline=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
