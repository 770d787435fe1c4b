//! Native webview primitives consumed by the adapter

use std::fmt;

use crate::bounds::Bounds;
use crate::error::WebviewError;
use crate::handle::ParentHandle;

/// Opaque identifier of a live native webview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WebviewId(pub u64);

impl WebviewId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WebviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native webview engine operations
///
/// Implementations are driven from the dispatch thread only and are expected
/// to return quickly.
pub trait NativeWebviews {
    /// Create a webview embedded as a child of `parent`
    fn create_webview(
        &mut self,
        parent: ParentHandle,
        width: i32,
        height: i32,
        url: &str,
    ) -> Result<WebviewId, WebviewError>;

    /// Move/resize the webview within its parent
    fn set_bounds(&mut self, id: WebviewId, bounds: Bounds) -> Result<(), WebviewError>;

    fn load_url(&mut self, id: WebviewId, url: &str) -> Result<(), WebviewError>;

    fn destroy_webview(&mut self, id: WebviewId) -> Result<(), WebviewError>;

    /// Drain pending native messages without blocking. Must be safe to call
    /// when no webview exists.
    fn pump_pending_events(&mut self);

    /// The engine runs its event loop on the dispatch thread and needs the
    /// host to tick it, whatever the platform policy says.
    fn needs_host_pump(&self) -> bool {
        false
    }
}
