//! Subtree traversal.

use crate::ViewTree;
use indextree::NodeId;

/// Visit every live descendant of `node` in pre-order, parents before children.
///
/// `node` itself is not visited. Returning `false` from `visit` stops the walk.
pub fn each_descendant(tree: &ViewTree, node: NodeId, mut visit: impl FnMut(NodeId) -> bool) {
    if !tree.contains(node) {
        return;
    }
    for descendant in node.descendants(&tree.arena).skip(1) {
        if !visit(descendant) {
            break;
        }
    }
}

/// `root` followed by all of its descendants in pre-order.
pub fn subtree(tree: &ViewTree, root: NodeId) -> Vec<NodeId> {
    if !tree.contains(root) {
        return Vec::new();
    }
    root.descendants(&tree.arena).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoopHost, TreeConfig};

    #[test]
    fn pre_order_without_root_and_early_stop() {
        let mut tree = ViewTree::with_builtins(Box::new(NoopHost), TreeConfig::default()).unwrap();
        let view = tree.core().types.view;
        let root = tree.create_view(view).unwrap();
        let first = tree.create_view(view).unwrap();
        let nested = tree.create_view(view).unwrap();
        let second = tree.create_view(view).unwrap();
        tree.append_child(root, first).unwrap();
        tree.append_child(first, nested).unwrap();
        tree.append_child(root, second).unwrap();

        let mut seen = Vec::new();
        each_descendant(&tree, root, |node| {
            seen.push(node);
            true
        });
        assert_eq!(seen, vec![first, nested, second]);

        let mut stopped = Vec::new();
        each_descendant(&tree, root, |node| {
            stopped.push(node);
            node != nested
        });
        assert_eq!(stopped, vec![first, nested]);

        assert_eq!(subtree(&tree, first), vec![first, nested]);
    }
}
