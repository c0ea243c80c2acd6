//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`; the operator log printed by
//! the commands is separate and always goes to stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(filter))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn build_env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"))
}
