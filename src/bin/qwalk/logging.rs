//! Diagnostic tracing for `qwalk`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`).
///
/// ```bash
/// RUST_LOG=nestqueue=trace qwalk --script show.json --steps next,next
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
