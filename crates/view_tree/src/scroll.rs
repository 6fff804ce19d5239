//! Scroll views and their host-backed offsets.

use crate::ViewTree;
use crate::error::ViewError;
use crate::events::{EventData, EventDetail, SCROLL};
use crate::host::{ScrollAxis, ScrollMetrics};
use indextree::NodeId;

impl ViewTree {
    fn ensure_scroll_view(&self, node: NodeId) -> Result<(), ViewError> {
        self.view(node)?;
        if self.is_a(node, self.core.types.scroll_view) {
            Ok(())
        } else {
            Err(ViewError::NotAScrollView)
        }
    }

    /// Offsets and extents as reported by the host.
    ///
    /// # Errors
    /// [`ViewError::NotAScrollView`] for other node types.
    pub fn scroll_metrics(&self, node: NodeId) -> Result<ScrollMetrics, ViewError> {
        self.ensure_scroll_view(node)?;
        Ok(self.host.scroll_metrics(node))
    }

    /// # Errors
    /// [`ViewError::NotAScrollView`] for other node types.
    pub fn scroll_to_horizontal_offset(
        &mut self,
        node: NodeId,
        offset: f64,
        animated: bool,
    ) -> Result<(), ViewError> {
        self.ensure_scroll_view(node)?;
        self.host.scroll_to(node, ScrollAxis::Horizontal, offset, animated);
        Ok(())
    }

    /// # Errors
    /// [`ViewError::NotAScrollView`] for other node types.
    pub fn scroll_to_vertical_offset(
        &mut self,
        node: NodeId,
        offset: f64,
        animated: bool,
    ) -> Result<(), ViewError> {
        self.ensure_scroll_view(node)?;
        self.host.scroll_to(node, ScrollAxis::Vertical, offset, animated);
        Ok(())
    }

    /// Raise `scroll` on behalf of the host.
    ///
    /// # Errors
    /// [`ViewError::NotAScrollView`] for other node types.
    pub fn dispatch_scroll(&mut self, node: NodeId, scroll_x: f64, scroll_y: f64) -> Result<(), ViewError> {
        self.ensure_scroll_view(node)?;
        self.notify(&EventData::new(
            SCROLL,
            node,
            EventDetail::Scroll { scroll_x, scroll_y },
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{NoopHost, TreeConfig, ViewError, ViewTree};

    #[test]
    fn plain_views_cannot_scroll() {
        let mut tree = ViewTree::with_builtins(Box::new(NoopHost), TreeConfig::default()).unwrap();
        let view = tree.create_view(tree.core().types.view).unwrap();
        assert_eq!(
            tree.scroll_to_vertical_offset(view, 10.0, false),
            Err(ViewError::NotAScrollView)
        );
        let scroll = tree.create_view(tree.core().types.scroll_view).unwrap();
        tree.scroll_metrics(scroll).unwrap();
        tree.dispatch_scroll(scroll, 0.0, 4.0).unwrap();
    }
}
