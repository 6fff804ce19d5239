#![allow(dead_code, reason = "each test binary uses a different subset")]

use indextree::NodeId;
use std::cell::RefCell;
use std::rc::Rc;
use view_tree::{NativeHost, ScrollAxis, TreeConfig, ViewTree};

#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    Layout(NodeId),
    CancelAnimations(NodeId),
    Attach(NodeId, String),
    Detach(NodeId, String),
    Present {
        presenter: NodeId,
        presented: NodeId,
        fullscreen: bool,
    },
    Dismiss {
        presenter: NodeId,
        presented: NodeId,
    },
    Orientation(NodeId, String),
    ScrollTo(NodeId, ScrollAxis, f64),
}

/// Host double that records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingHost {
    pub calls: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn count(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn push(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl NativeHost for RecordingHost {
    fn request_layout(&mut self, node: NodeId) {
        self.push(HostCall::Layout(node));
    }

    fn cancel_animations(&mut self, node: NodeId) {
        self.push(HostCall::CancelAnimations(node));
    }

    fn attach_listener(&mut self, node: NodeId, event: &str) {
        self.push(HostCall::Attach(node, event.to_owned()));
    }

    fn detach_listener(&mut self, node: NodeId, event: &str) {
        self.push(HostCall::Detach(node, event.to_owned()));
    }

    fn present_modal(&mut self, presenter: NodeId, presented: NodeId, fullscreen: bool) {
        self.push(HostCall::Present {
            presenter,
            presented,
            fullscreen,
        });
    }

    fn dismiss_modal(&mut self, presenter: NodeId, presented: NodeId) {
        self.push(HostCall::Dismiss {
            presenter,
            presented,
        });
    }

    fn orientation_changed(&mut self, node: NodeId, orientation: &str) {
        self.push(HostCall::Orientation(node, orientation.to_owned()));
    }

    fn scroll_to(&mut self, node: NodeId, axis: ScrollAxis, offset: f64, _animated: bool) {
        self.push(HostCall::ScrollTo(node, axis, offset));
    }
}

pub fn recording_tree() -> (ViewTree, RecordingHost) {
    let _ = env_logger::builder().is_test(true).try_init();
    let host = RecordingHost::default();
    let tree = ViewTree::with_builtins(Box::new(host.clone()), TreeConfig::default()).unwrap();
    (tree, host)
}
