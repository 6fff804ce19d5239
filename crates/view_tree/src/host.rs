//! The native side of the tree.
//!
//! Widget creation, layout, animation and presentation live outside this
//! crate. The tree only tells the host when something has to happen.

use indextree::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
}

/// Offsets and scrollable extents reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
    pub scrollable_width: f64,
    pub scrollable_height: f64,
}

/// Hooks the tree calls into. Every method defaults to doing nothing.
pub trait NativeHost {
    /// A property that affects layout changed on `node`.
    fn request_layout(&mut self, _node: NodeId) {}

    /// Stop every running property animation of `node`.
    fn cancel_animations(&mut self, _node: NodeId) {}

    /// Start delivering the native event `event` for `node`.
    fn attach_listener(&mut self, _node: NodeId, _event: &str) {}

    /// Stop delivering the native event `event` for `node`.
    fn detach_listener(&mut self, _node: NodeId, _event: &str) {}

    fn present_modal(&mut self, _presenter: NodeId, _presented: NodeId, _fullscreen: bool) {}

    fn dismiss_modal(&mut self, _presenter: NodeId, _presented: NodeId) {}

    fn orientation_changed(&mut self, _node: NodeId, _orientation: &str) {}

    fn scroll_to(&mut self, _node: NodeId, _axis: ScrollAxis, _offset: f64, _animated: bool) {}

    fn scroll_metrics(&self, _node: NodeId) -> ScrollMetrics {
        ScrollMetrics::default()
    }
}

/// Host that ignores every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHost;

impl NativeHost for NoopHost {}
