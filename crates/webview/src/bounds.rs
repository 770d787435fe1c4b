//! Webview bounds tracking
//!
//! Bounds are recomputed on every layout notification. Most platforms push
//! changes straight to the native layer; on GTK the layout rate can outrun
//! what the toolkit absorbs, so changes land in a single pending slot that is
//! flushed once per frame.

use crate::native::{NativeWebviews, WebviewId};
use crate::surface::HostSurface;

/// Webview rectangle in parent-relative coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    /// Create bounds, clamping width and height to at least 1
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Compute where the webview must sit inside its parent to cover the surface
pub fn compute_bounds<S: HostSurface>(surface: &S, parent_is_window: bool) -> Bounds {
    let (width, height) = surface.size().clamped();
    if !parent_is_window {
        // The parent view's origin is already the surface origin
        return Bounds::new(0, 0, width, height);
    }

    let (Some(window), Some((origin_x, origin_y))) = (surface.window(), surface.origin_in_window())
    else {
        return Bounds::new(0, 0, width, height);
    };

    let x = origin_x - window.insets.left;
    let y = origin_y - window.insets.top;
    tracing::trace!(x, y, insets = ?window.insets, "Window-relative bounds");
    Bounds::new(x, y, width, height)
}

/// How bounds updates reach the native layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Push every change as it is computed
    Immediate,
    /// Buffer into one slot, flushed on a fixed cadence
    Coalesced,
}

/// Tracks the last pushed bounds and the pending slot
#[derive(Debug)]
pub struct BoundsTracker {
    policy: DispatchPolicy,
    last: Option<Bounds>,
    pending: Option<Bounds>,
    flushing: bool,
}

impl BoundsTracker {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self {
            policy,
            last: None,
            pending: None,
            flushing: false,
        }
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Last bounds sent to the native layer
    pub fn last_bounds(&self) -> Option<Bounds> {
        self.last
    }

    pub fn pending_bounds(&self) -> Option<Bounds> {
        self.pending
    }

    /// Whether the flush task must be running
    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Submit freshly computed bounds for a live webview
    pub fn submit<N: NativeWebviews>(&mut self, id: WebviewId, bounds: Bounds, native: &mut N) {
        match self.policy {
            DispatchPolicy::Immediate => self.push(id, bounds, native),
            DispatchPolicy::Coalesced => {
                self.pending = Some(bounds);
                if !self.flushing {
                    tracing::trace!(%id, "Starting bounds flush");
                    self.flushing = true;
                }
            }
        }
    }

    /// Flush the pending slot. Deactivates the flush task once the slot drains.
    pub fn flush<N: NativeWebviews>(&mut self, id: Option<WebviewId>, native: &mut N) {
        if !self.flushing {
            return;
        }
        let Some(id) = id else {
            self.reset();
            return;
        };

        if let Some(bounds) = self.pending.take() {
            self.push(id, bounds, native);
        }
        if self.pending.is_none() {
            self.flushing = false;
        }
    }

    /// Forget everything, stopping the flush task
    pub fn reset(&mut self) {
        self.last = None;
        self.pending = None;
        self.flushing = false;
    }

    fn push<N: NativeWebviews>(&mut self, id: WebviewId, bounds: Bounds, native: &mut N) {
        if self.last == Some(bounds) {
            return;
        }
        self.last = Some(bounds);
        tracing::debug!(
            %id,
            x = bounds.x,
            y = bounds.y,
            width = bounds.width,
            height = bounds.height,
            "setBounds"
        );
        if let Err(e) = native.set_bounds(id, bounds) {
            tracing::warn!(%id, "Failed to set webview bounds: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NativeCall, RecordingWebviews, SimulatedSurface};
    use crate::surface::Insets;

    const ID: WebviewId = WebviewId(7);

    fn set_bounds_calls(native: &RecordingWebviews) -> Vec<Bounds> {
        native
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                NativeCall::SetBounds { bounds, .. } => Some(bounds),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_zero_size_clamps_to_one() {
        let surface = SimulatedSurface::new(0, 0);
        assert_eq!(compute_bounds(&surface, false), Bounds::new(0, 0, 1, 1));

        surface.set_size(-5, 40);
        assert_eq!(compute_bounds(&surface, false), Bounds::new(0, 0, 1, 40));
    }

    #[test]
    fn test_view_parent_uses_origin() {
        let surface = SimulatedSurface::new(300, 200);
        surface.show_window();
        surface.set_origin_in_window(50, 80);
        assert_eq!(compute_bounds(&surface, false), Bounds::new(0, 0, 300, 200));
    }

    #[test]
    fn test_window_parent_subtracts_insets() {
        let surface = SimulatedSurface::new(300, 200);
        surface.show_window();
        surface.set_origin_in_window(50, 80);
        surface.set_window_insets(Insets::new(30, 5, 0, 0));

        assert_eq!(compute_bounds(&surface, true), Bounds::new(45, 50, 300, 200));
    }

    #[test]
    fn test_window_parent_without_window_falls_back_to_origin() {
        let surface = SimulatedSurface::new(300, 200);
        surface.detach_window();
        assert_eq!(compute_bounds(&surface, true), Bounds::new(0, 0, 300, 200));
    }

    #[test]
    fn test_immediate_skips_unchanged_bounds() {
        let mut native = RecordingWebviews::new();
        let mut tracker = BoundsTracker::new(DispatchPolicy::Immediate);

        tracker.submit(ID, Bounds::new(0, 0, 100, 100), &mut native);
        tracker.submit(ID, Bounds::new(0, 0, 100, 100), &mut native);
        tracker.submit(ID, Bounds::new(0, 0, 120, 100), &mut native);

        assert_eq!(
            set_bounds_calls(&native),
            vec![Bounds::new(0, 0, 100, 100), Bounds::new(0, 0, 120, 100)]
        );
        assert!(!tracker.is_flushing());
    }

    #[test]
    fn test_coalesced_sends_only_last_value() {
        let mut native = RecordingWebviews::new();
        let mut tracker = BoundsTracker::new(DispatchPolicy::Coalesced);

        tracker.submit(ID, Bounds::new(0, 0, 100, 100), &mut native);
        tracker.submit(ID, Bounds::new(0, 0, 110, 100), &mut native);
        tracker.submit(ID, Bounds::new(0, 0, 120, 100), &mut native);
        assert!(tracker.is_flushing());
        assert!(set_bounds_calls(&native).is_empty());

        tracker.flush(Some(ID), &mut native);

        assert_eq!(set_bounds_calls(&native), vec![Bounds::new(0, 0, 120, 100)]);
        assert!(!tracker.is_flushing());
        assert_eq!(tracker.last_bounds(), Some(Bounds::new(0, 0, 120, 100)));
    }

    #[test]
    fn test_coalesced_restarts_on_next_change() {
        let mut native = RecordingWebviews::new();
        let mut tracker = BoundsTracker::new(DispatchPolicy::Coalesced);

        tracker.submit(ID, Bounds::new(0, 0, 100, 100), &mut native);
        tracker.flush(Some(ID), &mut native);
        assert!(!tracker.is_flushing());

        // Unchanged value restarts the task but sends nothing
        tracker.submit(ID, Bounds::new(0, 0, 100, 100), &mut native);
        assert!(tracker.is_flushing());
        tracker.flush(Some(ID), &mut native);
        assert_eq!(set_bounds_calls(&native).len(), 1);
        assert!(!tracker.is_flushing());
    }

    #[test]
    fn test_flush_without_webview_resets() {
        let mut native = RecordingWebviews::new();
        let mut tracker = BoundsTracker::new(DispatchPolicy::Coalesced);

        tracker.submit(ID, Bounds::new(0, 0, 100, 100), &mut native);
        tracker.flush(None, &mut native);

        assert!(!tracker.is_flushing());
        assert_eq!(tracker.pending_bounds(), None);
        assert!(native.calls().is_empty());
    }

    #[test]
    fn test_set_bounds_failure_is_swallowed() {
        let mut native = RecordingWebviews::new();
        native.fail_set_bounds(true);
        let mut tracker = BoundsTracker::new(DispatchPolicy::Immediate);

        tracker.submit(ID, Bounds::new(0, 0, 100, 100), &mut native);
        assert_eq!(tracker.last_bounds(), Some(Bounds::new(0, 0, 100, 100)));
    }
}
