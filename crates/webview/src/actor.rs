//! Single-threaded driver for a panel
//!
//! The panel and its native handles live on one task on the dispatch thread
//! (inside a `tokio::task::LocalSet`). Everything else talks to it through a
//! [`PanelHandle`], which can be cloned and sent to other threads. The three
//! scheduled tasks (creation retry, bounds flush, native pump) are intervals
//! owned by the driver; dropping an interval cancels it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::error::WebviewError;
use crate::native::NativeWebviews;
use crate::panel::{ActiveTimers, HostEvent, WebviewPanel};
use crate::surface::{HostSurface, RenderBackend};

/// Messages accepted by the panel driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    Host(HostEvent),
    Shutdown,
}

/// Cross-thread entry point to a running panel
#[derive(Debug, Clone)]
pub struct PanelHandle {
    tx: mpsc::UnboundedSender<PanelCommand>,
}

impl PanelHandle {
    pub fn load_url(&self, url: impl Into<String>) -> Result<(), WebviewError> {
        self.send(PanelCommand::Host(HostEvent::LoadUrl(url.into())))
    }

    pub fn attached(&self) -> Result<(), WebviewError> {
        self.send(PanelCommand::Host(HostEvent::Attached))
    }

    pub fn detached(&self) -> Result<(), WebviewError> {
        self.send(PanelCommand::Host(HostEvent::Detached))
    }

    pub fn layout(&self) -> Result<(), WebviewError> {
        self.send(PanelCommand::Host(HostEvent::Layout))
    }

    /// Tear down and stop the driver
    pub fn shutdown(&self) -> Result<(), WebviewError> {
        self.send(PanelCommand::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: PanelCommand) -> Result<(), WebviewError> {
        self.tx
            .send(command)
            .map_err(|_| WebviewError::ChannelClosed)
    }
}

/// Spawn the driver on the current `LocalSet`.
///
/// The join handle yields the panel back once the driver stops.
pub fn spawn_panel<S, R, N>(panel: WebviewPanel<S, R, N>) -> (PanelHandle, JoinHandle<WebviewPanel<S, R, N>>)
where
    S: HostSurface + 'static,
    R: RenderBackend + 'static,
    N: NativeWebviews + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::task::spawn_local(run_panel(panel, rx));
    (PanelHandle { tx }, task)
}

/// Drive `panel` until shutdown or until every handle is dropped
pub async fn run_panel<S, R, N>(
    mut panel: WebviewPanel<S, R, N>,
    mut rx: mpsc::UnboundedReceiver<PanelCommand>,
) -> WebviewPanel<S, R, N>
where
    S: HostSurface,
    R: RenderBackend,
    N: NativeWebviews,
{
    let mut timers = Timers::default();

    loop {
        timers.sync(&panel);

        tokio::select! {
            command = rx.recv() => match command {
                Some(PanelCommand::Host(event)) => panel.handle(event),
                Some(PanelCommand::Shutdown) | None => break,
            },
            _ = tick(&mut timers.create_retry) => {
                panel.tick_create_retry();
            }
            _ = tick(&mut timers.bounds_flush) => panel.tick_bounds_flush(),
            _ = tick(&mut timers.pump) => panel.tick_pump(),
        }
    }

    panel.on_detached();
    tracing::debug!("Panel driver stopped");
    panel
}

#[derive(Default)]
struct Timers {
    create_retry: Option<Interval>,
    bounds_flush: Option<Interval>,
    pump: Option<Interval>,
}

impl Timers {
    fn sync<S, R, N>(&mut self, panel: &WebviewPanel<S, R, N>)
    where
        S: HostSurface,
        R: RenderBackend,
        N: NativeWebviews,
    {
        let ActiveTimers {
            create_retry,
            bounds_flush,
            pump,
        } = panel.timers();
        let config = panel.config();

        reconcile(&mut self.create_retry, create_retry, config.create_retry_interval());
        reconcile(&mut self.bounds_flush, bounds_flush, config.bounds_flush_interval());
        reconcile(&mut self.pump, pump, config.pump_interval());
    }
}

/// Start or drop an interval to match `active`. A new interval first fires
/// one period from now.
fn reconcile(slot: &mut Option<Interval>, active: bool, period: Duration) {
    match (active, slot.is_some()) {
        (true, false) => {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            *slot = Some(interval);
        }
        (false, true) => *slot = None,
        _ => {}
    }
}

async fn tick(slot: &mut Option<Interval>) {
    match slot {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LifecycleState;
    use crate::sim::{NativeCall, RecordingWebviews, SimulatedBackend, SimulatedSurface};
    use panelview_config::{EmbedConfig, PlatformFamily};
    use tokio::task::LocalSet;
    use tokio::time::sleep;

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

    fn creates(native: &RecordingWebviews) -> Vec<String> {
        native
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                NativeCall::Create { url, .. } => Some(url),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_creation_waits_for_surface() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (panel, surface, native) = panel(PlatformFamily::Linux);
                let (handle, task) = spawn_panel(panel);

                handle.attached().unwrap();
                sleep(Duration::from_millis(100)).await;
                assert!(creates(&native).is_empty());

                surface.make_ready();
                sleep(Duration::from_millis(40)).await;
                assert_eq!(creates(&native), vec!["https://example.com".to_string()]);

                handle.shutdown().unwrap();
                let panel = task.await.unwrap();
                assert_eq!(panel.state(), LifecycleState::Absent);
                assert!(native.calls().iter().any(|call| matches!(call, NativeCall::Destroy { .. })));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_url_from_another_thread() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (panel, surface, native) = panel(PlatformFamily::MacOs);
                let (handle, task) = spawn_panel(panel);

                let remote = handle.clone();
                std::thread::spawn(move || remote.load_url("https://crates.io").unwrap())
                    .join()
                    .unwrap();

                surface.make_ready();
                sleep(Duration::from_millis(50)).await;
                assert_eq!(creates(&native), vec!["https://crates.io".to_string()]);

                drop(handle);
                let panel = task.await.unwrap();
                assert_eq!(panel.pending_url(), "https://crates.io");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_coalesced_layouts_flush_once() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (panel, surface, native) = panel(PlatformFamily::Linux);
                surface.make_ready();
                let (handle, task) = spawn_panel(panel);

                handle.attached().unwrap();
                sleep(Duration::from_millis(100)).await;
                let baseline = native.calls().len();

                for width in [700, 650, 600] {
                    surface.set_size(width, 400);
                    handle.layout().unwrap();
                }
                tokio::task::yield_now().await;
                assert_eq!(native.calls().len(), baseline);

                sleep(Duration::from_millis(50)).await;
                let resized: Vec<NativeCall> = native.calls().split_off(baseline);
                assert_eq!(resized.len(), 1);
                assert!(matches!(
                    resized[0],
                    NativeCall::SetBounds { bounds, .. } if bounds.width == 600 && bounds.height == 400
                ));

                handle.shutdown().unwrap();
                task.await.unwrap();
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_windows_pump_runs_while_live() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (panel, surface, native) = panel(PlatformFamily::Windows);
                surface.make_ready();
                surface.set_window_native_handle(0x40);
                let (handle, task) = spawn_panel(panel);

                handle.attached().unwrap();
                sleep(Duration::from_millis(300)).await;
                let pumped = native.calls().iter().filter(|c| **c == NativeCall::Pump).count();
                assert!(pumped > 0);

                handle.detached().unwrap();
                sleep(Duration::from_millis(20)).await;
                let after_detach = native.calls().len();
                sleep(Duration::from_millis(200)).await;
                assert_eq!(native.calls().len(), after_detach);

                handle.shutdown().unwrap();
                task.await.unwrap();
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_linux_pumps_when_native_layer_asks() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (panel, surface, native) = panel(PlatformFamily::Linux);
                native.set_needs_host_pump(true);
                surface.make_ready();
                let (handle, task) = spawn_panel(panel);

                handle.attached().unwrap();
                sleep(Duration::from_secs(1)).await;
                assert_eq!(creates(&native).len(), 1);
                let pumped = native.calls().iter().filter(|c| **c == NativeCall::Pump).count();
                assert!(pumped > 10);

                handle.shutdown().unwrap();
                task.await.unwrap();
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_reports_closed_driver() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (panel, _surface, _native) = panel(PlatformFamily::Other);
                let (handle, task) = spawn_panel(panel);

                handle.shutdown().unwrap();
                task.await.unwrap();

                assert!(handle.is_closed());
                assert!(matches!(handle.layout(), Err(WebviewError::ChannelClosed)));
            })
            .await;
    }
}
