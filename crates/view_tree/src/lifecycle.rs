//! Loading and unloading subtrees.

use crate::ViewTree;
use crate::error::ViewError;
use crate::events::{EventData, EventDetail, LOADED, UNLOADED};
use crate::gate::GateAction;
use crate::view::LifecycleState;
use indextree::NodeId;
use log::trace;

impl ViewTree {
    /// Load `node` and its subtree.
    ///
    /// A scope root runs its cascade first; any other node is restyled only
    /// if its values are stale for the owning scope. Children load before the
    /// `loaded` event of their parent is raised.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn load_view(&mut self, node: NodeId) -> Result<(), ViewError> {
        let view = self.view(node)?;
        if view.is_loaded() {
            return Ok(());
        }
        if view.scope.is_some() {
            self.apply_cascade(node)?;
        } else {
            self.restyle_if_stale(node)?;
        }
        self.view_mut(node)?.state = LifecycleState::Loaded;
        trace!(target: "lifecycle", "load {node:?}");
        for child in self.children(node) {
            self.load_view(child)?;
        }
        self.notify(&EventData::new(LOADED, node, EventDetail::None));
        self.update_gates(node, true)
    }

    /// Unload `node` and its subtree. Does nothing unless loaded.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn unload_view(&mut self, node: NodeId) -> Result<(), ViewError> {
        if !self.view(node)?.is_loaded() {
            return Ok(());
        }
        for child in self.children(node) {
            self.unload_view(child)?;
        }
        self.update_gates(node, false)?;
        let view = self.view_mut(node)?;
        view.state = LifecycleState::Unloaded;
        view.style_stamp = None;
        if let Some(slot) = view.scope.as_deref_mut() {
            slot.applied_version = None;
        }
        trace!(target: "lifecycle", "unload {node:?}");
        self.notify(&EventData::new(UNLOADED, node, EventDetail::None));
        Ok(())
    }

    fn update_gates(&mut self, node: NodeId, loaded: bool) -> Result<(), ViewError> {
        let actions: Vec<(String, GateAction)> = self
            .view_mut(node)?
            .gates
            .iter_mut()
            .map(|(event, gate)| {
                let action = if loaded { gate.loaded() } else { gate.unloaded() };
                (event.clone(), action)
            })
            .collect();
        for (event, action) in actions {
            self.apply_gate_action(node, &event, action);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{LifecycleState, NoopHost, TreeConfig, ViewTree};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn children_load_before_parent_event() {
        let mut tree = ViewTree::with_builtins(Box::new(NoopHost), TreeConfig::default()).unwrap();
        let view = tree.core().types.view;
        let parent = tree.create_view(view).unwrap();
        let child = tree.create_view(view).unwrap();
        tree.append_child(parent, child).unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        for (node, label) in [(parent, "parent"), (child, "child")] {
            let order = Rc::clone(&order);
            tree.on(
                node,
                crate::LOADED,
                Rc::new(move |_tree: &mut ViewTree, _data: &crate::EventData| {
                    order.borrow_mut().push(label);
                }),
            )
            .unwrap();
        }

        tree.load_view(parent).unwrap();
        assert_eq!(*order.borrow(), ["child", "parent"]);
        assert_eq!(tree.state(child).unwrap(), LifecycleState::Loaded);

        tree.unload_view(parent).unwrap();
        assert_eq!(tree.state(parent).unwrap(), LifecycleState::Unloaded);
        assert_eq!(tree.state(child).unwrap(), LifecycleState::Unloaded);
    }
}
