//! Log output for the demo

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "panelview=debug,panelview_webview=debug";

/// Install the global subscriber. `RUST_LOG` overrides the defaults.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}
