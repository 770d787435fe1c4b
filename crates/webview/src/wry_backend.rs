//! Native webviews backed by wry
//!
//! Parent handles are turned back into raw window handles and the webview is
//! built as a child of that window/view, positioned in physical pixels.

use std::collections::HashMap;

use raw_window_handle::{HandleError, HasWindowHandle, RawWindowHandle, WindowHandle};
use wry::dpi::{PhysicalPosition, PhysicalSize};
use wry::{Rect, WebView, WebViewBuilder};

use crate::bounds::Bounds;
use crate::error::WebviewError;
use crate::handle::ParentHandle;
use crate::native::{NativeWebviews, WebviewId};

/// Live wry webviews keyed by the ids handed to the adapter
#[derive(Default)]
pub struct WryWebviews {
    next_id: u64,
    webviews: HashMap<WebviewId, WebView>,
}

impl WryWebviews {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, id: WebviewId) -> Result<&WebView, WebviewError> {
        self.webviews
            .get(&id)
            .ok_or(WebviewError::UnknownWebview(id.raw()))
    }
}

impl NativeWebviews for WryWebviews {
    fn create_webview(
        &mut self,
        parent: ParentHandle,
        width: i32,
        height: i32,
        url: &str,
    ) -> Result<WebviewId, WebviewError> {
        // wry's child webviews on Linux need GTK, and only work on X11
        #[cfg(target_os = "linux")]
        if !gtk::is_initialized() {
            gtk::init().map_err(|e| WebviewError::WebviewCreate(format!("GTK init failed: {}", e)))?;
        }

        let parent_window = ParentWindow {
            raw: raw_parent(parent)?,
        };
        let webview = WebViewBuilder::new()
            .with_url(url)
            .with_bounds(rect(Bounds::new(0, 0, width, height)))
            .build_as_child(&parent_window)
            .map_err(|e| WebviewError::WebviewCreate(e.to_string()))?;

        self.next_id += 1;
        let id = WebviewId(self.next_id);
        self.webviews.insert(id, webview);
        tracing::debug!(%id, parent = %format!("{:#x}", parent.raw()), "wry webview built");
        Ok(id)
    }

    fn set_bounds(&mut self, id: WebviewId, bounds: Bounds) -> Result<(), WebviewError> {
        self.get(id)?
            .set_bounds(rect(bounds))
            .map_err(|e| WebviewError::SetBounds(e.to_string()))
    }

    fn load_url(&mut self, id: WebviewId, url: &str) -> Result<(), WebviewError> {
        self.get(id)?
            .load_url(url)
            .map_err(|e| WebviewError::LoadUrl(e.to_string()))
    }

    fn destroy_webview(&mut self, id: WebviewId) -> Result<(), WebviewError> {
        self.webviews
            .remove(&id)
            .map(drop)
            .ok_or(WebviewError::UnknownWebview(id.raw()))
    }

    fn pump_pending_events(&mut self) {
        pump_platform();
    }

    /// GTK is initialized on the dispatch thread, so its loop is ours to run
    fn needs_host_pump(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

fn rect(bounds: Bounds) -> Rect {
    Rect {
        position: PhysicalPosition::new(bounds.x, bounds.y).into(),
        size: PhysicalSize::new(bounds.width.max(1) as u32, bounds.height.max(1) as u32).into(),
    }
}

/// Borrowed parent for `build_as_child`
struct ParentWindow {
    raw: RawWindowHandle,
}

#[allow(unsafe_code)]
impl HasWindowHandle for ParentWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        // SAFETY: the host keeps the parent alive while the child webview exists
        Ok(unsafe { WindowHandle::borrow_raw(self.raw) })
    }
}

#[cfg(target_os = "windows")]
fn raw_parent(parent: ParentHandle) -> Result<RawWindowHandle, WebviewError> {
    use raw_window_handle::Win32WindowHandle;

    let hwnd = std::num::NonZeroIsize::new(parent.raw() as isize)
        .ok_or_else(|| WebviewError::HandleUnavailable("null HWND".into()))?;
    Ok(Win32WindowHandle::new(hwnd).into())
}

/// AppKit parents must be NSView pointers.
#[cfg(target_os = "macos")]
fn raw_parent(parent: ParentHandle) -> Result<RawWindowHandle, WebviewError> {
    use raw_window_handle::AppKitWindowHandle;

    let view = std::ptr::NonNull::new(parent.raw() as usize as *mut std::ffi::c_void)
        .ok_or_else(|| WebviewError::HandleUnavailable("null NSView".into()))?;
    Ok(AppKitWindowHandle::new(view).into())
}

#[cfg(target_os = "linux")]
fn raw_parent(parent: ParentHandle) -> Result<RawWindowHandle, WebviewError> {
    use raw_window_handle::XlibWindowHandle;

    Ok(XlibWindowHandle::new(parent.raw() as std::os::raw::c_ulong).into())
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn raw_parent(_parent: ParentHandle) -> Result<RawWindowHandle, WebviewError> {
    Err(WebviewError::PlatformNotSupported)
}

#[cfg(target_os = "windows")]
#[allow(unsafe_code)]
fn pump_platform() {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
    };

    let mut msg = MSG::default();
    // SAFETY: plain Win32 message loop on the thread that owns the webview windows
    unsafe {
        while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            let _ = DispatchMessageW(&msg);
        }
    }
}

#[cfg(target_os = "linux")]
fn pump_platform() {
    if !gtk::is_initialized() {
        return;
    }
    while gtk::events_pending() {
        gtk::main_iteration_do(false);
    }
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn pump_platform() {}
