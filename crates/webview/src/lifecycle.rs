//! Webview lifecycle state machine
//!
//! Owns the single native webview and decides when it is safe to create it,
//! tear it down, move it and navigate it. Creation readiness depends on
//! toolkit realization signals that cannot be observed precisely, so creation
//! is polled by a retry task until one attempt settles.

use panelview_config::EmbedConfig;

use crate::bounds::{compute_bounds, Bounds, BoundsTracker, DispatchPolicy};
use crate::handle::{HandleResolver, ParentHandle, Resolution};
use crate::native::{NativeWebviews, WebviewId};
use crate::pump::PlatformPump;
use crate::surface::{HostSurface, RenderBackend};

/// Lifecycle of the native webview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No native webview exists
    Absent,
    /// Native creation in flight
    Creating,
    /// Native webview is live and parented
    Live { id: WebviewId, parent: ParentHandle },
}

/// Why a creation attempt was deferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReadyReason {
    SurfaceNotRealized,
    SurfaceHidden,
    EmptySize,
    WindowNotReady,
    NoParentHandle,
    CreationInFlight,
}

/// Result of a creation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    AlreadyLive(WebviewId),
    Created(WebviewId),
    /// Preconditions unmet; try again later
    NotReady(NotReadyReason),
    /// Native creation failed; logged, not retried by the current schedule
    Failed,
}

impl CreateOutcome {
    /// Whether the creation retry task should stop after this outcome
    pub fn stops_retry(&self) -> bool {
        !matches!(self, Self::NotReady(_))
    }
}

pub struct LifecycleController<S, R, N> {
    config: EmbedConfig,
    surface: S,
    backend: R,
    native: N,
    resolver: HandleResolver,
    bounds: BoundsTracker,
    pump: PlatformPump,
    state: LifecycleState,
    pending_url: String,
    backend_ready: bool,
    create_scheduled: bool,
}

impl<S, R, N> LifecycleController<S, R, N>
where
    S: HostSurface,
    R: RenderBackend,
    N: NativeWebviews,
{
    pub fn new(config: EmbedConfig, surface: S, backend: R, native: N, initial_url: impl Into<String>) -> Self {
        let policy = if config.platform.coalesces_bounds() {
            DispatchPolicy::Coalesced
        } else {
            DispatchPolicy::Immediate
        };

        Self {
            resolver: HandleResolver::new(config.platform),
            bounds: BoundsTracker::new(policy),
            pump: PlatformPump::new(config.platform),
            config,
            surface,
            backend,
            native,
            state: LifecycleState::Absent,
            pending_url: initial_url.into(),
            backend_ready: false,
            create_scheduled: false,
        }
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn webview_id(&self) -> Option<WebviewId> {
        match self.state {
            LifecycleState::Live { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<ParentHandle> {
        match self.state {
            LifecycleState::Live { parent, .. } => Some(parent),
            _ => None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.webview_id().is_some()
    }

    pub fn pending_url(&self) -> &str {
        &self.pending_url
    }

    pub fn last_bounds(&self) -> Option<Bounds> {
        self.bounds.last_bounds()
    }

    pub fn bounds_tracker(&self) -> &BoundsTracker {
        &self.bounds
    }

    pub fn pump(&self) -> &PlatformPump {
        &self.pump
    }

    pub fn is_create_scheduled(&self) -> bool {
        self.create_scheduled
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Check creation preconditions without side effects
    pub fn check_ready(&self) -> Result<(), NotReadyReason> {
        if !self.surface.is_realized() {
            return Err(NotReadyReason::SurfaceNotRealized);
        }
        if !self.surface.is_visible() {
            return Err(NotReadyReason::SurfaceHidden);
        }
        if !self.surface.size().is_positive() {
            return Err(NotReadyReason::EmptySize);
        }
        if self.config.platform.needs_window_ready()
            && !self.surface.window().is_some_and(|window| window.is_ready())
        {
            return Err(NotReadyReason::WindowNotReady);
        }
        Ok(())
    }

    /// Create the native webview if it does not exist and the host is ready
    pub fn ensure_created(&mut self) -> CreateOutcome {
        match self.state {
            LifecycleState::Live { id, .. } => return CreateOutcome::AlreadyLive(id),
            LifecycleState::Creating => {
                return CreateOutcome::NotReady(NotReadyReason::CreationInFlight);
            }
            LifecycleState::Absent => {}
        }

        if let Err(reason) = self.check_ready() {
            tracing::trace!(?reason, "Webview not ready");
            return CreateOutcome::NotReady(reason);
        }

        if !self.backend_ready {
            self.backend_ready = match self.backend.init(&self.surface) {
                Ok(ready) => {
                    tracing::debug!(ready, "Rendering backend init");
                    ready
                }
                Err(e) => {
                    tracing::warn!("Rendering backend init failed: {}", e);
                    false
                }
            };
        }

        let Resolution::Found(parent) = self.resolver.resolve(&self.surface, &self.backend) else {
            let size = self.surface.size();
            tracing::debug!(
                width = size.width,
                height = size.height,
                "No parent handle; will retry"
            );
            return CreateOutcome::NotReady(NotReadyReason::NoParentHandle);
        };

        let (width, height) = self.surface.size().clamped();
        tracing::debug!(
            handle = %format!("{:#x}", parent.raw()),
            is_window = parent.is_window,
            width,
            height,
            "Creating webview"
        );

        self.state = LifecycleState::Creating;
        match self.native.create_webview(parent, width, height, &self.pending_url) {
            Ok(id) => {
                self.state = LifecycleState::Live { id, parent };
                self.update_bounds();
                self.pump.start(&self.native);
                tracing::info!(%id, url = %self.pending_url, "Webview created");
                CreateOutcome::Created(id)
            }
            Err(e) => {
                self.state = LifecycleState::Absent;
                tracing::error!("Failed to create webview: {}", e);
                CreateOutcome::Failed
            }
        }
    }

    /// Tear down the native webview. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        self.pump.stop();
        self.bounds.reset();

        if let LifecycleState::Live { id, .. } = self.state {
            tracing::info!(%id, "Destroying webview");
            if let Err(e) = self.native.destroy_webview(id) {
                tracing::warn!(%id, "Failed to destroy webview: {}", e);
            }
        }
        self.state = LifecycleState::Absent;
    }

    /// Navigate, or remember the URL for creation
    pub fn load_url(&mut self, url: impl Into<String>) {
        self.pending_url = url.into();
        match self.webview_id() {
            Some(id) => {
                if let Err(e) = self.native.load_url(id, &self.pending_url) {
                    tracing::warn!(%id, "Failed to load URL: {}", e);
                }
            }
            None => self.schedule_create_if_needed(),
        }
        tracing::debug!(url = %self.pending_url, id = ?self.webview_id(), "loadUrl");
    }

    /// Recompute bounds and hand them to the tracker when a webview is live
    pub fn update_bounds(&mut self) {
        let LifecycleState::Live { id, parent } = self.state else {
            return;
        };
        let bounds = compute_bounds(&self.surface, parent.is_window);
        self.bounds.submit(id, bounds, &mut self.native);
    }

    pub fn flush_bounds(&mut self) {
        let id = self.webview_id();
        self.bounds.flush(id, &mut self.native);
    }

    pub fn tick_pump(&mut self) {
        if !self.is_live() {
            self.pump.stop();
            return;
        }
        self.pump.tick(&mut self.native);
    }

    /// Activate the creation retry task unless a webview exists
    pub fn schedule_create_if_needed(&mut self) {
        if self.is_live() || self.create_scheduled {
            return;
        }
        tracing::debug!(interval = ?self.config.create_retry_interval(), "Scheduling webview creation");
        self.create_scheduled = true;
    }

    pub fn cancel_create_retry(&mut self) {
        self.create_scheduled = false;
    }

    /// One retry tick. Returns `None` when no retry is scheduled.
    pub fn retry_create(&mut self) -> Option<CreateOutcome> {
        if !self.create_scheduled {
            return None;
        }
        let outcome = self.ensure_created();
        if outcome.stops_retry() {
            self.create_scheduled = false;
        }
        Some(outcome)
    }
}
