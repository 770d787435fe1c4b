//! panelview - embedded webview panel demo
//!
//! Drives a webview panel through a scripted host session using the
//! simulated host and native layer, logging every lifecycle decision.
//! Set `PANELVIEW_PLATFORM` to replay the session with another platform's
//! parenting and scheduling policy.

use panelview_config::EmbedConfig;
use panelview_webview::sim::NativeCall;
use tokio::task::LocalSet;

mod logging;
mod scenario;

fn main() {
    logging::init();

    let config = EmbedConfig::from_env();
    tracing::info!(
        platform = %config.platform,
        create_retry = ?config.create_retry_interval(),
        "Starting panelview demo"
    );

    // The panel lives on one dispatch thread, like a toolkit's event thread
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let local = LocalSet::new();
    match local.block_on(&runtime, scenario::run(config)) {
        Ok(calls) => report(&calls),
        Err(e) => {
            tracing::error!("Session failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn report(calls: &[NativeCall]) {
    tracing::info!(count = calls.len(), "Native calls");
    for call in calls.iter().filter(|call| **call != NativeCall::Pump) {
        tracing::info!("  {:?}", call);
    }
    let pumps = calls.iter().filter(|call| **call == NativeCall::Pump).count();
    if pumps > 0 {
        tracing::info!(pumps, "Native message pump ticks");
    }
}
