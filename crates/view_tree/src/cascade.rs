//! Applying style scopes to the nodes they own.
//!
//! A pass over a scope root resets and recomputes the CSS values of every node
//! styled by that scope. The root remembers the scope version it last applied
//! so a second pass at the same version is a no-op.

use crate::ViewTree;
use crate::error::ViewError;
use crate::view::ScopeSlot;
use css_orchestrator::StyleScope;
use indextree::NodeId;
use log::{debug, trace, warn};
use std::collections::HashSet;
use view_properties::{PropertyId, PropertyValue};

/// Result of [`ViewTree::apply_cascade`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// The scope version was already applied.
    Skipped { version: u64 },
    Applied {
        version: u64,
        nodes: usize,
        /// CSS values assigned during the pass.
        declarations: usize,
    },
}

impl ViewTree {
    pub(crate) fn scope_slot(&self, node: NodeId) -> Result<&ScopeSlot, ViewError> {
        self.view(node)?
            .scope
            .as_deref()
            .ok_or(ViewError::NoStyleScope)
    }

    pub(crate) fn scope_slot_mut(&mut self, node: NodeId) -> Result<&mut ScopeSlot, ViewError> {
        self.view_mut(node)?
            .scope
            .as_deref_mut()
            .ok_or(ViewError::NoStyleScope)
    }

    /// The style scope owned by `node`.
    ///
    /// # Errors
    /// Fails if `node` owns no scope.
    pub fn style_scope(&self, node: NodeId) -> Result<&StyleScope, ViewError> {
        Ok(&self.scope_slot(node)?.scope)
    }

    /// Scope version last applied to the subtree of `root`.
    ///
    /// # Errors
    /// Fails if `root` owns no scope.
    pub fn applied_version(&self, root: NodeId) -> Result<Option<u64>, ViewError> {
        Ok(self.scope_slot(root)?.applied_version)
    }

    /// Nearest node at or above `node` that owns a style scope.
    pub fn owning_scope_root(&self, node: NodeId) -> Option<NodeId> {
        if !self.contains(node) {
            return None;
        }
        node.ancestors(&self.arena)
            .find(|ancestor| self.arena.get(*ancestor).is_some_and(|entry| entry.get().scope.is_some()))
    }

    /// Recompute CSS values for every node styled by `root`'s scope, unless
    /// the current scope version was already applied.
    ///
    /// # Errors
    /// Fails if `root` owns no scope.
    pub fn apply_cascade(&mut self, root: NodeId) -> Result<CascadeOutcome, ViewError> {
        let slot = self.scope_slot(root)?;
        let version = slot.scope.ensure_selectors();
        if slot.applied_version == Some(version) {
            trace!(target: "cascade", "{root:?} already at version {version}");
            return Ok(CascadeOutcome::Skipped { version });
        }
        let _span = tracing::info_span!("cascade", version).entered();
        let nodes = self.nodes_styled_by(root, root);
        let declarations = self.restyle_nodes(root, &nodes)?;
        self.scope_slot_mut(root)?.applied_version = Some(version);
        debug!(
            target: "cascade",
            "applied version {version} to {} nodes ({declarations} values)",
            nodes.len()
        );
        Ok(CascadeOutcome::Applied {
            version,
            nodes: nodes.len(),
            declarations,
        })
    }

    /// Recompute CSS values of `node` and the part of its subtree styled by the same scope.
    /// Returns the number of values assigned; zero when no scope owns `node`.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn restyle_subtree(&mut self, node: NodeId) -> Result<usize, ViewError> {
        self.view(node)?;
        let Some(root) = self.owning_scope_root(node) else {
            return Ok(0);
        };
        let nodes = self.nodes_styled_by(root, node);
        self.restyle_nodes(root, &nodes)
    }

    /// Restyle only `node` if its values were computed for another scope version.
    pub(crate) fn restyle_if_stale(&mut self, node: NodeId) -> Result<(), ViewError> {
        let Some(root) = self.owning_scope_root(node) else {
            return Ok(());
        };
        let version = self.scope_slot(root)?.scope.version();
        if self.view(node)?.style_stamp != Some(version) {
            trace!(target: "cascade", "late restyle of {node:?} at version {version}");
            self.restyle_nodes(root, &[node])?;
        }
        Ok(())
    }

    /// `start` and its descendants whose owning scope is `root`'s, in pre-order.
    fn nodes_styled_by(&self, root: NodeId, start: NodeId) -> Vec<NodeId> {
        start
            .descendants(&self.arena)
            .filter(|node| self.owning_scope_root(*node) == Some(root))
            .collect()
    }

    /// Matched CSS values of `node`, in application order.
    fn css_values_for(&self, scope: &StyleScope, node: NodeId) -> Vec<(PropertyId, PropertyValue)> {
        let Ok(view) = self.view(node) else {
            return Vec::new();
        };
        let mut values = Vec::new();
        for entry in scope.matching_rules(self, node) {
            for declaration in entry.declarations.iter() {
                let Some(id) = self.registry.lookup_css(view.ty, &declaration.name) else {
                    trace!(
                        target: "cascade",
                        "`{}` has no css property `{}`",
                        view.type_name,
                        declaration.name
                    );
                    continue;
                };
                let Some(descriptor) = self.registry.descriptor(id) else {
                    continue;
                };
                match descriptor.convert(&declaration.value) {
                    Ok(value) => values.push((id, value)),
                    Err(err) => warn!(target: "cascade", "line {}: {err}", entry.line),
                }
            }
        }
        values
    }

    /// Reset and reapply CSS values of `nodes`, then report each changed
    /// property once per node.
    fn restyle_nodes(&mut self, root: NodeId, nodes: &[NodeId]) -> Result<usize, ViewError> {
        let slot = self.scope_slot(root)?;
        let version = slot.scope.version();
        let computed: Vec<(NodeId, Vec<(PropertyId, PropertyValue)>)> = nodes
            .iter()
            .map(|node| (*node, self.css_values_for(&slot.scope, *node)))
            .collect();

        let mut snapshots: Vec<(NodeId, Vec<(PropertyId, Option<PropertyValue>)>)> =
            Vec::with_capacity(computed.len());
        for (node, values) in &computed {
            let view = self.view(*node)?;
            let mut touched: Vec<PropertyId> = view.css.keys().copied().collect();
            let mut seen: HashSet<PropertyId> = touched.iter().copied().collect();
            for (id, _value) in values {
                if seen.insert(*id) {
                    touched.push(*id);
                }
            }
            let before = touched
                .into_iter()
                .map(|id| (id, self.resolve(*node, id)))
                .collect();
            snapshots.push((*node, before));
        }

        let mut declarations = 0_usize;
        for (node, values) in computed {
            self.host.cancel_animations(node);
            let view = self.view_mut(node)?;
            view.css.clear();
            declarations += values.len();
            for (id, value) in values {
                view.css.insert(id, value);
            }
            view.style_stamp = Some(version);
        }

        for (node, before) in snapshots {
            for (id, old) in before {
                let new = self.resolve(node, id);
                self.report_change(node, id, old, new);
            }
        }
        Ok(declarations)
    }
}
