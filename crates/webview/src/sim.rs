//! In-memory host and native layer
//!
//! Lets a panel run without a GUI toolkit or webview engine. Each type is a
//! cheap handle over shared state, so a caller can keep a clone to drive the
//! host (show the window, resize the surface) or inspect recorded native
//! calls while the panel owns another clone.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bounds::Bounds;
use crate::error::WebviewError;
use crate::handle::ParentHandle;
use crate::native::{NativeWebviews, WebviewId};
use crate::surface::{AncestorWindow, HostSurface, Insets, RenderBackend, SurfaceSize};

#[derive(Debug)]
struct SurfaceState {
    realized: bool,
    visible: bool,
    size: SurfaceSize,
    origin: Option<(i32, i32)>,
    window: Option<AncestorWindow>,
    native_handle: u64,
    window_native_handle: u64,
    fail_native_handle: bool,
}

/// Host surface whose state is set by hand
#[derive(Debug, Clone)]
pub struct SimulatedSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl SimulatedSurface {
    /// An unrealized, hidden surface inside a window that is not shown yet
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            state: Rc::new(RefCell::new(SurfaceState {
                realized: false,
                visible: false,
                size: SurfaceSize::new(width, height),
                origin: Some((0, 0)),
                window: Some(AncestorWindow::default()),
                native_handle: 0,
                window_native_handle: 0,
                fail_native_handle: false,
            })),
        }
    }

    /// Realize and show the surface and its window
    pub fn make_ready(&self) {
        self.set_realized(true);
        self.set_visible(true);
        self.show_window();
    }

    pub fn set_realized(&self, realized: bool) {
        self.state.borrow_mut().realized = realized;
    }

    pub fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    pub fn set_size(&self, width: i32, height: i32) {
        self.state.borrow_mut().size = SurfaceSize::new(width, height);
    }

    pub fn set_origin_in_window(&self, x: i32, y: i32) {
        self.state.borrow_mut().origin = Some((x, y));
    }

    pub fn show_window(&self) {
        let mut state = self.state.borrow_mut();
        let window = state.window.get_or_insert_with(AncestorWindow::default);
        window.realized = true;
        window.visible = true;
    }

    /// Show or drop the window's native peer; a shown window without a peer
    /// stays not ready
    pub fn set_window_realized(&self, realized: bool) {
        let mut state = self.state.borrow_mut();
        let window = state.window.get_or_insert_with(AncestorWindow::default);
        window.realized = realized;
    }

    pub fn hide_window(&self) {
        if let Some(window) = self.state.borrow_mut().window.as_mut() {
            window.visible = false;
        }
    }

    /// Remove the surface from any window
    pub fn detach_window(&self) {
        let mut state = self.state.borrow_mut();
        state.window = None;
        state.origin = None;
    }

    pub fn set_window_insets(&self, insets: Insets) {
        let mut state = self.state.borrow_mut();
        let window = state.window.get_or_insert_with(AncestorWindow::default);
        window.insets = insets;
    }

    pub fn set_native_handle(&self, handle: u64) {
        self.state.borrow_mut().native_handle = handle;
    }

    pub fn set_window_native_handle(&self, handle: u64) {
        self.state.borrow_mut().window_native_handle = handle;
    }

    /// Make the surface's own handle query fail
    pub fn fail_native_handle(&self, fail: bool) {
        self.state.borrow_mut().fail_native_handle = fail;
    }
}

impl HostSurface for SimulatedSurface {
    fn is_realized(&self) -> bool {
        self.state.borrow().realized
    }

    fn is_visible(&self) -> bool {
        let state = self.state.borrow();
        state.visible && state.window.is_none_or(|window| window.visible)
    }

    fn size(&self) -> SurfaceSize {
        self.state.borrow().size
    }

    fn window(&self) -> Option<AncestorWindow> {
        self.state.borrow().window
    }

    fn origin_in_window(&self) -> Option<(i32, i32)> {
        let state = self.state.borrow();
        state.window.and(state.origin)
    }

    fn native_handle(&self) -> Result<u64, WebviewError> {
        let state = self.state.borrow();
        if state.fail_native_handle {
            return Err(WebviewError::HandleUnavailable("surface peer missing".into()));
        }
        Ok(state.native_handle)
    }

    fn window_native_handle(&self) -> Result<u64, WebviewError> {
        let state = self.state.borrow();
        match state.window {
            Some(_) => Ok(state.window_native_handle),
            None => Err(WebviewError::HandleUnavailable("no ancestor window".into())),
        }
    }
}

#[derive(Debug)]
struct BackendState {
    content: u64,
    window: u64,
    fail_init: bool,
    fail_handles: bool,
    init_calls: usize,
}

/// Rendering backend with fixed handles
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    state: Rc<RefCell<BackendState>>,
}

impl SimulatedBackend {
    pub fn with_handles(content: u64, window: u64) -> Self {
        Self {
            state: Rc::new(RefCell::new(BackendState {
                content,
                window,
                fail_init: false,
                fail_handles: false,
                init_calls: 0,
            })),
        }
    }

    pub fn fail_init(&self, fail: bool) {
        self.state.borrow_mut().fail_init = fail;
    }

    pub fn fail_handles(&self, fail: bool) {
        self.state.borrow_mut().fail_handles = fail;
    }

    pub fn init_calls(&self) -> usize {
        self.state.borrow().init_calls
    }

    fn query(&self, pick: impl Fn(&BackendState) -> u64) -> Result<u64, WebviewError> {
        let state = self.state.borrow();
        if state.fail_handles {
            return Err(WebviewError::HandleUnavailable("backend has no layer".into()));
        }
        Ok(pick(&state))
    }
}

impl RenderBackend for SimulatedBackend {
    fn init(&mut self, _surface: &dyn HostSurface) -> Result<bool, WebviewError> {
        let mut state = self.state.borrow_mut();
        state.init_calls += 1;
        if state.fail_init {
            return Err(WebviewError::BackendInit("redrawer unavailable".into()));
        }
        Ok(true)
    }

    fn content_handle(&self, _surface: &dyn HostSurface) -> Result<u64, WebviewError> {
        self.query(|state| state.content)
    }

    fn window_handle(&self, _surface: &dyn HostSurface) -> Result<u64, WebviewError> {
        self.query(|state| state.window)
    }
}

/// A native primitive invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Create {
        parent: ParentHandle,
        width: i32,
        height: i32,
        url: String,
    },
    SetBounds {
        id: WebviewId,
        bounds: Bounds,
    },
    LoadUrl {
        id: WebviewId,
        url: String,
    },
    Destroy {
        id: WebviewId,
    },
    Pump,
}

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<NativeCall>,
    next_id: u64,
    fail_create: bool,
    fail_set_bounds: bool,
    needs_host_pump: bool,
}

/// Native layer that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingWebviews {
    state: Rc<RefCell<Recording>>,
}

impl RecordingWebviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls made so far
    pub fn calls(&self) -> Vec<NativeCall> {
        self.state.borrow().calls.clone()
    }

    /// Report that the engine needs host pump ticks
    pub fn set_needs_host_pump(&self, needs: bool) {
        self.state.borrow_mut().needs_host_pump = needs;
    }

    pub fn fail_create(&self, fail: bool) {
        self.state.borrow_mut().fail_create = fail;
    }

    pub fn fail_set_bounds(&self, fail: bool) {
        self.state.borrow_mut().fail_set_bounds = fail;
    }

    fn record(&self, call: NativeCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl NativeWebviews for RecordingWebviews {
    fn create_webview(
        &mut self,
        parent: ParentHandle,
        width: i32,
        height: i32,
        url: &str,
    ) -> Result<WebviewId, WebviewError> {
        self.record(NativeCall::Create {
            parent,
            width,
            height,
            url: url.to_string(),
        });

        let mut state = self.state.borrow_mut();
        if state.fail_create {
            return Err(WebviewError::WebviewCreate("engine refused parent".into()));
        }
        state.next_id += 1;
        Ok(WebviewId(state.next_id))
    }

    fn set_bounds(&mut self, id: WebviewId, bounds: Bounds) -> Result<(), WebviewError> {
        self.record(NativeCall::SetBounds { id, bounds });
        if self.state.borrow().fail_set_bounds {
            return Err(WebviewError::SetBounds("engine rejected bounds".into()));
        }
        Ok(())
    }

    fn load_url(&mut self, id: WebviewId, url: &str) -> Result<(), WebviewError> {
        self.record(NativeCall::LoadUrl {
            id,
            url: url.to_string(),
        });
        Ok(())
    }

    fn destroy_webview(&mut self, id: WebviewId) -> Result<(), WebviewError> {
        self.record(NativeCall::Destroy { id });
        Ok(())
    }

    fn pump_pending_events(&mut self) {
        self.record(NativeCall::Pump);
    }

    fn needs_host_pump(&self) -> bool {
        self.state.borrow().needs_host_pump
    }
}
