//! Host-driven native message pump
//!
//! WebView2 embedded into a foreign window does not drain its own message
//! queue, so the host ticks it while a webview is live. macOS drives itself.
//! GTK only needs ticks when the native layer runs it on the dispatch thread.

use panelview_config::PlatformFamily;

use crate::native::NativeWebviews;

#[derive(Debug)]
pub struct PlatformPump {
    platform: PlatformFamily,
    running: bool,
}

impl PlatformPump {
    pub fn new(platform: PlatformFamily) -> Self {
        Self {
            platform,
            running: false,
        }
    }

    /// Start ticking if this platform or the native layer needs it
    pub fn start<N: NativeWebviews>(&mut self, native: &N) {
        if self.running {
            return;
        }
        if self.platform.needs_host_pump() || native.needs_host_pump() {
            tracing::debug!(platform = %self.platform, "Starting native pump");
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!("Stopping native pump");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick<N: NativeWebviews>(&mut self, native: &mut N) {
        if self.running {
            native.pump_pending_events();
        }
    }
}
