//! Host surface and rendering backend queries
//!
//! The host toolkit owns the placeholder surface the webview overlays. The
//! adapter only queries it; it never creates or destroys toolkit objects.

use crate::error::WebviewError;

/// Size of the host surface in toolkit pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: i32,
    pub height: i32,
}

impl SurfaceSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are strictly positive
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Size with each dimension clamped to at least 1
    pub fn clamped(&self) -> (i32, i32) {
        (self.width.max(1), self.height.max(1))
    }
}

/// Window decoration insets (title bar, borders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Insets {
    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

/// Snapshot of the nearest top-level window containing the host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AncestorWindow {
    /// Native peer exists
    pub realized: bool,
    /// Window is currently shown on screen
    pub visible: bool,
    pub insets: Insets,
}

impl AncestorWindow {
    pub fn is_ready(&self) -> bool {
        self.realized && self.visible
    }
}

/// Queries against the toolkit surface that hosts the webview
pub trait HostSurface {
    /// The surface has a native peer (toolkit "displayable")
    fn is_realized(&self) -> bool;

    /// The surface and all its ancestors are showing
    fn is_visible(&self) -> bool;

    fn size(&self) -> SurfaceSize;

    /// Nearest ancestor top-level window, if the surface is in one
    fn window(&self) -> Option<AncestorWindow>;

    /// Surface origin translated into the ancestor window's coordinate space
    fn origin_in_window(&self) -> Option<(i32, i32)>;

    /// Native handle of the surface itself
    fn native_handle(&self) -> Result<u64, WebviewError>;

    /// Native handle of the ancestor window
    fn window_native_handle(&self) -> Result<u64, WebviewError>;
}

/// Rendering backend that draws into the host surface
///
/// The backend exposes its own view of the surface's native handles, which
/// are preferred over the toolkit's generic handle lookup.
pub trait RenderBackend {
    /// One-time backend setup for the surface. `Ok(false)` means the backend
    /// declined; callers treat it as non-fatal.
    fn init(&mut self, surface: &dyn HostSurface) -> Result<bool, WebviewError>;

    /// Handle of the content view the backend renders into
    fn content_handle(&self, surface: &dyn HostSurface) -> Result<u64, WebviewError>;

    /// Handle of the top-level window the backend renders into
    fn window_handle(&self, surface: &dyn HostSurface) -> Result<u64, WebviewError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_clamping() {
        assert_eq!(SurfaceSize::new(0, 0).clamped(), (1, 1));
        assert_eq!(SurfaceSize::new(-4, 300).clamped(), (1, 300));
        assert!(!SurfaceSize::new(0, 10).is_positive());
        assert!(SurfaceSize::new(1, 1).is_positive());
    }

    #[test]
    fn test_window_ready() {
        let mut window = AncestorWindow::default();
        assert!(!window.is_ready());
        window.realized = true;
        assert!(!window.is_ready());
        window.visible = true;
        assert!(window.is_ready());
    }
}
