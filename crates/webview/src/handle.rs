//! Parent handle resolution
//!
//! Decides which native window or view the webview is embedded into. The
//! choice differs per platform family:
//! - Windows: the top-level window (WebView2 does not parent well to a
//!   rendering canvas HWND); bounds are then offset manually
//! - macOS: the content view when it is distinct from the window
//! - Linux and others: the content surface, then the window
//!
//! Every platform falls back to the toolkit's own handle for the surface and
//! finally to the ancestor window handle.

use std::num::NonZeroU64;

use panelview_config::PlatformFamily;

use crate::error::WebviewError;
use crate::surface::{HostSurface, RenderBackend};

/// Native parent for the webview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentHandle {
    pub handle: NonZeroU64,
    /// The parent is a top-level window, so bounds need window-relative math
    pub is_window: bool,
}

impl ParentHandle {
    pub fn new(handle: NonZeroU64, is_window: bool) -> Self {
        Self { handle, is_window }
    }

    pub fn raw(&self) -> u64 {
        self.handle.get()
    }
}

/// Outcome of a resolution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found(ParentHandle),
    NotFound,
}

impl Resolution {
    fn found(handle: NonZeroU64, is_window: bool) -> Self {
        Self::Found(ParentHandle::new(handle, is_window))
    }

    pub fn parent(self) -> Option<ParentHandle> {
        match self {
            Self::Found(parent) => Some(parent),
            Self::NotFound => None,
        }
    }
}

/// Stateless resolver bound to a platform family
#[derive(Debug, Clone, Copy)]
pub struct HandleResolver {
    platform: PlatformFamily,
}

impl HandleResolver {
    pub fn new(platform: PlatformFamily) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> PlatformFamily {
        self.platform
    }

    /// Resolve the parent for `surface`. Never fails: query errors degrade
    /// to an unavailable handle and resolution falls through.
    pub fn resolve<S, R>(&self, surface: &S, backend: &R) -> Resolution
    where
        S: HostSurface,
        R: RenderBackend,
    {
        let resolved = match self.platform {
            PlatformFamily::Windows => Self::resolve_windows(surface),
            PlatformFamily::MacOs => Self::resolve_macos(surface, backend),
            PlatformFamily::Linux | PlatformFamily::Other => Self::resolve_default(surface, backend),
        };

        match resolved {
            Resolution::Found(_) => resolved,
            Resolution::NotFound => Self::resolve_fallback(surface),
        }
    }

    fn resolve_windows<S: HostSurface>(surface: &S) -> Resolution {
        let Some(window) = surface.window() else {
            return Resolution::NotFound;
        };
        if !window.is_ready() {
            return Resolution::NotFound;
        }
        match available("window", surface.window_native_handle()) {
            Some(handle) => {
                tracing::debug!(handle = %format!("{:#x}", handle), "Resolved top-level window (windows)");
                Resolution::found(handle, true)
            }
            None => Resolution::NotFound,
        }
    }

    fn resolve_macos<S: HostSurface, R: RenderBackend>(surface: &S, backend: &R) -> Resolution {
        let content = available("content", backend.content_handle(surface));
        let window = available("window", backend.window_handle(surface));

        match (content, window) {
            (Some(content), window) if Some(content) != window => {
                tracing::debug!(content = %format!("{:#x}", content), "Resolved content view (macos)");
                Resolution::found(content, false)
            }
            (_, Some(window)) => {
                tracing::debug!(window = %format!("{:#x}", window), "Resolved window (macos)");
                Resolution::found(window, true)
            }
            // Content equal to the window handle was taken by the arm above.
            _ => Resolution::NotFound,
        }
    }

    fn resolve_default<S: HostSurface, R: RenderBackend>(surface: &S, backend: &R) -> Resolution {
        if let Some(content) = available("content", backend.content_handle(surface)) {
            tracing::debug!(content = %format!("{:#x}", content), "Resolved content surface");
            return Resolution::found(content, false);
        }
        if let Some(window) = available("window", backend.window_handle(surface)) {
            tracing::debug!(window = %format!("{:#x}", window), "Resolved window, content unavailable");
            return Resolution::found(window, true);
        }
        Resolution::NotFound
    }

    fn resolve_fallback<S: HostSurface>(surface: &S) -> Resolution {
        if let Some(host) = available("host", surface.native_handle()) {
            tracing::debug!(host = %format!("{:#x}", host), "Resolved host surface handle");
            return Resolution::found(host, false);
        }

        let window_ready = surface.window().is_some_and(|window| window.is_ready());
        if window_ready {
            if let Some(window) = available("window", surface.window_native_handle()) {
                tracing::debug!(window = %format!("{:#x}", window), "Resolved ancestor window handle");
                return Resolution::found(window, true);
            }
        }

        tracing::debug!("No parent handle available");
        Resolution::NotFound
    }
}

/// Collapse a handle query into a usable handle, logging failures
fn available(name: &str, query: Result<u64, WebviewError>) -> Option<NonZeroU64> {
    match query {
        Ok(raw) => NonZeroU64::new(raw),
        Err(e) => {
            tracing::debug!("{} handle query failed: {}", name, e);
            None
        }
    }
}
