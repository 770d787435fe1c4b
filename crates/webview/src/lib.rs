//! Native webview embedding for GUI panels
//!
//! Hosts an OS-provided webview (WebView2, WKWebView, WebKitGTK) inside a
//! panel owned by a desktop GUI toolkit and keeps it in sync with the panel:
//! - Parent resolution: which native window or view to embed into, per platform
//! - Lifecycle: create once the host surface is realized, visible and sized; destroy on detach
//! - Bounds: follow layout changes, coalesced to one update per frame on GTK
//! - Pumping: drive the native message queue where the toolkit cannot
//!
//! Rendering web content is left to the native engine behind [`NativeWebviews`].
//! The `wry` feature provides an implementation backed by `wry`.

mod actor;
mod bounds;
mod error;
mod handle;
mod lifecycle;
mod native;
mod panel;
mod pump;
mod surface;
#[cfg(feature = "wry")]
mod wry_backend;

pub mod sim;

pub use actor::{run_panel, spawn_panel, PanelCommand, PanelHandle};
pub use bounds::{compute_bounds, Bounds, BoundsTracker, DispatchPolicy};
pub use error::WebviewError;
pub use handle::{HandleResolver, ParentHandle, Resolution};
pub use lifecycle::{CreateOutcome, LifecycleController, LifecycleState, NotReadyReason};
pub use native::{NativeWebviews, WebviewId};
pub use panel::{ActiveTimers, HostEvent, WebviewPanel};
pub use pump::PlatformPump;
pub use surface::{AncestorWindow, HostSurface, Insets, RenderBackend, SurfaceSize};

#[cfg(feature = "wry")]
pub use wry_backend::WryWebviews;

pub use panelview_config::{EmbedConfig, PlatformFamily};
