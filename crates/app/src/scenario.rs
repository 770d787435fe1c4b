//! Scripted host session
//!
//! Plays the part of a desktop toolkit: the panel is attached before its
//! window is shown, the window appears, the user drags the splitter a few
//! times, navigates, and finally closes the panel.

use std::time::Duration;

use panelview_config::EmbedConfig;
use panelview_webview::sim::{NativeCall, RecordingWebviews, SimulatedBackend, SimulatedSurface};
use panelview_webview::{spawn_panel, Insets, WebviewError, WebviewPanel};
use tokio::time::sleep;

const INITIAL_URL: &str = "https://example.com";
const SECOND_URL: &str = "https://www.rust-lang.org";

/// Run the session and return every native call the panel made
pub async fn run(config: EmbedConfig) -> Result<Vec<NativeCall>, WebviewError> {
    let surface = SimulatedSurface::new(1024, 768);
    surface.set_native_handle(0x3000);
    surface.set_window_native_handle(0x2000);
    surface.set_origin_in_window(8, 60);
    surface.set_window_insets(Insets::new(30, 8, 8, 8));

    let backend = SimulatedBackend::with_handles(0x1000, 0x2000);
    let native = RecordingWebviews::new();
    let settle = config.create_retry_interval() * 3;

    let panel = WebviewPanel::new(config, surface.clone(), backend, native.clone(), INITIAL_URL);
    let (handle, task) = spawn_panel(panel);

    tracing::info!("Attaching panel to a hidden window");
    handle.attached()?;
    sleep(settle).await;

    tracing::info!("Showing window");
    surface.make_ready();
    handle.layout()?;
    sleep(settle).await;

    tracing::info!("Resizing");
    for width in [960, 900, 840, 800] {
        surface.set_size(width, 768);
        handle.layout()?;
        sleep(Duration::from_millis(4)).await;
    }
    sleep(settle).await;

    tracing::info!(url = SECOND_URL, "Navigating");
    handle.load_url(SECOND_URL)?;
    sleep(settle).await;

    tracing::info!("Detaching panel");
    handle.detached()?;
    handle.shutdown()?;

    let panel = task
        .await
        .map_err(|e| WebviewError::Destroy(format!("panel task failed: {}", e)))?;
    tracing::info!(state = ?panel.state(), "Panel stopped");

    Ok(native.calls())
}
