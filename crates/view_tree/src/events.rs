//! Event listeners and payloads.

use crate::error::ViewError;
use crate::gate::GateAction;
use crate::{ViewTree, modal::ModalCloser};
use indextree::NodeId;
use log::trace;
use serde_json::Value;
use std::rc::Rc;
use view_properties::TypeTag;

pub const LOADED: &str = "loaded";
pub const UNLOADED: &str = "unloaded";
pub const NAVIGATING_TO: &str = "navigatingTo";
pub const NAVIGATED_TO: &str = "navigatedTo";
pub const NAVIGATING_FROM: &str = "navigatingFrom";
pub const NAVIGATED_FROM: &str = "navigatedFrom";
pub const SHOWING_MODALLY: &str = "showingModally";
pub const SHOWN_MODALLY: &str = "shownModally";
pub const SCROLL: &str = "scroll";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Rc<dyn Fn(&mut ViewTree, &EventData)>;

#[derive(Clone, Debug)]
pub enum EventDetail {
    None,
    Navigation {
        context: Option<Value>,
        is_back_navigation: bool,
    },
    Modal {
        context: Option<Value>,
        close: Option<ModalCloser>,
    },
    Scroll {
        scroll_x: f64,
        scroll_y: f64,
    },
}

#[derive(Clone, Debug)]
pub struct EventData {
    pub event_name: String,
    /// Node the event was raised on.
    pub object: NodeId,
    pub detail: EventDetail,
}

impl EventData {
    pub fn new(event_name: &str, object: NodeId, detail: EventDetail) -> Self {
        Self {
            event_name: event_name.to_owned(),
            object,
            detail,
        }
    }
}

impl ViewTree {
    /// Register `listener` for `event` on `node`.
    ///
    /// For events backed by a native subscription the host is asked to attach
    /// once the first listener is added while the node is loaded.
    ///
    /// # Errors
    /// Fails if `node` is not a live node of this tree.
    pub fn on(&mut self, node: NodeId, event: &str, listener: Listener) -> Result<ListenerId, ViewError> {
        let native = self.is_native_event(node, event)?;
        self.next_listener = self.next_listener.wrapping_add(1);
        let id = ListenerId(self.next_listener);
        let view = self.view_mut(node)?;
        view.listeners
            .entry(event.to_owned())
            .or_default()
            .push((id, listener));
        if native {
            let loaded = view.is_loaded();
            let action = view.gates.entry(event.to_owned()).or_default().add(loaded);
            self.apply_gate_action(node, event, action);
        }
        Ok(id)
    }

    /// Remove a listener. Returns false if it was not registered.
    ///
    /// # Errors
    /// Fails if `node` is not a live node of this tree.
    pub fn off(&mut self, node: NodeId, event: &str, id: ListenerId) -> Result<bool, ViewError> {
        let view = self.view_mut(node)?;
        let Some(listeners) = view.listeners.get_mut(event) else {
            return Ok(false);
        };
        let before = listeners.len();
        listeners.retain(|entry| entry.0 != id);
        if listeners.len() == before {
            return Ok(false);
        }
        let action = view
            .gates
            .get_mut(event)
            .map_or(GateAction::None, |gate| gate.remove());
        self.apply_gate_action(node, event, action);
        Ok(true)
    }

    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.view(node)
            .ok()
            .and_then(|view| view.listeners.get(event))
            .map_or(0, Vec::len)
    }

    /// Deliver `data` to the listeners of `data.object`.
    ///
    /// Listeners are cloned out first, so they may freely mutate the tree.
    pub fn notify(&mut self, data: &EventData) {
        let listeners: Vec<Listener> = self
            .view(data.object)
            .ok()
            .and_then(|view| view.listeners.get(&data.event_name))
            .map(|entries| entries.iter().map(|entry| Rc::clone(&entry.1)).collect())
            .unwrap_or_default();
        trace!(
            target: "lifecycle",
            "{} -> {} listeners on {:?}",
            data.event_name,
            listeners.len(),
            data.object
        );
        for listener in listeners {
            listener(self, data);
        }
    }

    /// Mark `event` on `ty` and its subtypes as backed by a native subscription.
    pub fn declare_native_event(&mut self, ty: TypeTag, event: &str) {
        self.native_events.push((ty, event.to_owned()));
    }

    fn is_native_event(&self, node: NodeId, event: &str) -> Result<bool, ViewError> {
        let ty = self.view(node)?.ty;
        Ok(self
            .native_events
            .iter()
            .any(|(owner, name)| name == event && self.registry.is_a(ty, *owner)))
    }

    pub(crate) fn apply_gate_action(&mut self, node: NodeId, event: &str, action: GateAction) {
        match action {
            GateAction::Attach => {
                trace!(target: "lifecycle", "attach native `{event}` on {node:?}");
                self.host.attach_listener(node, event);
            }
            GateAction::Detach => {
                trace!(target: "lifecycle", "detach native `{event}` on {node:?}");
                self.host.detach_listener(node, event);
            }
            GateAction::None => {}
        }
    }
}
