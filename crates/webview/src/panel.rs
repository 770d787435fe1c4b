//! Panel facade over the lifecycle controller
//!
//! Maps the host container's notifications (attached to a hierarchy,
//! detached, laid out) onto lifecycle operations, and reports which
//! scheduled tasks the driver has to keep running.

use panelview_config::EmbedConfig;

use crate::bounds::Bounds;
use crate::lifecycle::{CreateOutcome, LifecycleController, LifecycleState};
use crate::native::{NativeWebviews, WebviewId};
use crate::surface::{HostSurface, RenderBackend};

/// Notifications delivered by the host container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Attached,
    Detached,
    Layout,
    LoadUrl(String),
}

/// Scheduled tasks that must be running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveTimers {
    pub create_retry: bool,
    pub bounds_flush: bool,
    pub pump: bool,
}

/// A native webview embedded in a host panel
pub struct WebviewPanel<S, R, N> {
    lifecycle: LifecycleController<S, R, N>,
}

impl<S, R, N> WebviewPanel<S, R, N>
where
    S: HostSurface,
    R: RenderBackend,
    N: NativeWebviews,
{
    pub fn new(config: EmbedConfig, surface: S, backend: R, native: N, initial_url: impl Into<String>) -> Self {
        let initial_url = initial_url.into();
        tracing::debug!(url = %initial_url, platform = %config.platform, "Panel created");
        Self {
            lifecycle: LifecycleController::new(config, surface, backend, native, initial_url),
        }
    }

    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Attached => self.on_attached(),
            HostEvent::Detached => self.on_detached(),
            HostEvent::Layout => self.on_layout(),
            HostEvent::LoadUrl(url) => self.load_url(url),
        }
    }

    /// The panel joined a host hierarchy
    pub fn on_attached(&mut self) {
        let surface = self.lifecycle.surface();
        let size = surface.size();
        tracing::debug!(
            realized = surface.is_realized(),
            visible = surface.is_visible(),
            width = size.width,
            height = size.height,
            "Attached"
        );
        self.lifecycle.schedule_create_if_needed();
    }

    /// The panel left its host hierarchy; every task stops
    pub fn on_detached(&mut self) {
        tracing::debug!("Detached");
        self.lifecycle.cancel_create_retry();
        self.lifecycle.destroy();
    }

    pub fn on_layout(&mut self) {
        let size = self.lifecycle.surface().size();
        tracing::trace!(width = size.width, height = size.height, "Layout");
        self.lifecycle.update_bounds();
        self.lifecycle.schedule_create_if_needed();
    }

    pub fn load_url(&mut self, url: impl Into<String>) {
        self.lifecycle.load_url(url);
    }

    pub fn tick_create_retry(&mut self) -> Option<CreateOutcome> {
        self.lifecycle.retry_create()
    }

    pub fn tick_bounds_flush(&mut self) {
        self.lifecycle.flush_bounds();
    }

    pub fn tick_pump(&mut self) {
        self.lifecycle.tick_pump();
    }

    pub fn timers(&self) -> ActiveTimers {
        ActiveTimers {
            create_retry: self.lifecycle.is_create_scheduled(),
            bounds_flush: self.lifecycle.bounds_tracker().is_flushing(),
            pump: self.lifecycle.pump().is_running(),
        }
    }

    pub fn config(&self) -> &EmbedConfig {
        self.lifecycle.config()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn webview_id(&self) -> Option<WebviewId> {
        self.lifecycle.webview_id()
    }

    pub fn pending_url(&self) -> &str {
        self.lifecycle.pending_url()
    }

    pub fn last_bounds(&self) -> Option<Bounds> {
        self.lifecycle.last_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NativeCall, RecordingWebviews, SimulatedBackend, SimulatedSurface};
    use crate::surface::Insets;
    use panelview_config::PlatformFamily;

    type Panel = WebviewPanel<SimulatedSurface, SimulatedBackend, RecordingWebviews>;

    fn panel(platform: PlatformFamily) -> (Panel, SimulatedSurface, RecordingWebviews) {
        let surface = SimulatedSurface::new(800, 600);
        let native = RecordingWebviews::new();
        let panel = WebviewPanel::new(
            EmbedConfig::for_platform(platform),
            surface.clone(),
            SimulatedBackend::with_handles(0x10, 0x20),
            native.clone(),
            "https://example.com",
        );
        (panel, surface, native)
    }

    #[test]
    fn test_attach_schedules_creation() {
        let (mut panel, surface, _native) = panel(PlatformFamily::MacOs);
        assert_eq!(panel.timers(), ActiveTimers::default());

        panel.on_attached();
        assert!(panel.timers().create_retry);

        assert!(matches!(panel.tick_create_retry(), Some(CreateOutcome::NotReady(_))));
        surface.make_ready();
        assert!(matches!(panel.tick_create_retry(), Some(CreateOutcome::Created(_))));
        assert!(!panel.timers().create_retry);
    }

    #[test]
    fn test_detach_stops_everything() {
        let (mut panel, surface, native) = panel(PlatformFamily::Windows);
        surface.make_ready();
        surface.set_window_native_handle(0x40);
        panel.on_attached();
        panel.tick_create_retry();
        assert!(panel.timers().pump);

        panel.handle(HostEvent::Detached);

        assert_eq!(panel.timers(), ActiveTimers::default());
        assert_eq!(panel.state(), LifecycleState::Absent);

        // Late ticks after teardown do nothing
        let calls_before = native.calls().len();
        panel.tick_pump();
        panel.tick_bounds_flush();
        assert_eq!(panel.tick_create_retry(), None);
        assert_eq!(native.calls().len(), calls_before);
    }

    #[test]
    fn test_layout_before_creation_only_schedules() {
        let (mut panel, _surface, native) = panel(PlatformFamily::Linux);

        panel.on_layout();

        assert!(panel.timers().create_retry);
        assert!(!panel.timers().bounds_flush);
        assert!(native.calls().is_empty());
    }

    #[test]
    fn test_linux_layout_is_coalesced() {
        let (mut panel, surface, native) = panel(PlatformFamily::Linux);
        surface.make_ready();
        panel.on_attached();
        panel.tick_create_retry();
        panel.tick_bounds_flush();
        let id = panel.webview_id().expect("live webview");

        for width in [700, 650, 600] {
            surface.set_size(width, 400);
            panel.on_layout();
        }
        assert!(panel.timers().bounds_flush);
        panel.tick_bounds_flush();
        assert!(!panel.timers().bounds_flush);

        let resized: Vec<Bounds> = native
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                NativeCall::SetBounds { bounds, .. } => Some(bounds),
                _ => None,
            })
            .collect();
        assert_eq!(resized, vec![Bounds::new(0, 0, 800, 600), Bounds::new(0, 0, 600, 400)]);
        assert_eq!(panel.last_bounds(), Some(Bounds::new(0, 0, 600, 400)));
        assert_eq!(panel.webview_id(), Some(id));
    }

    #[test]
    fn test_windows_bounds_follow_window_offsets() {
        let (mut panel, surface, native) = panel(PlatformFamily::Windows);
        surface.make_ready();
        surface.set_window_native_handle(0x40);
        surface.set_origin_in_window(50, 80);
        surface.set_window_insets(Insets::new(30, 5, 5, 5));

        panel.on_attached();
        let Some(CreateOutcome::Created(id)) = panel.tick_create_retry() else {
            panic!("expected creation");
        };

        assert!(native.calls().contains(&NativeCall::SetBounds {
            id,
            bounds: Bounds::new(45, 50, 800, 600)
        }));

        panel.tick_pump();
        assert!(native.calls().contains(&NativeCall::Pump));
    }

    #[test]
    fn test_reattach_recreates() {
        let (mut panel, surface, native) = panel(PlatformFamily::MacOs);
        surface.make_ready();

        panel.on_attached();
        panel.tick_create_retry();
        panel.on_detached();
        panel.on_attached();
        panel.tick_create_retry();

        let creates = native
            .calls()
            .iter()
            .filter(|call| matches!(call, NativeCall::Create { .. }))
            .count();
        assert_eq!(creates, 2);
        assert!(panel.webview_id().is_some());
    }
}
