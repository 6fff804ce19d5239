//! Property value resolution and assignment.
//!
//! Precedence per property: local value, then CSS value, then (for inherited
//! properties) the nearest ancestor holding either, then the default.

use crate::ViewTree;
use crate::error::ViewError;
use indextree::NodeId;
use log::trace;
use std::rc::Rc;
use view_properties::{PropertyId, PropertyValue};

impl ViewTree {
    /// Descriptor named `name` visible on the node's type.
    ///
    /// # Errors
    /// Fails for dead handles or unknown property names.
    pub fn property_id(&self, node: NodeId, name: &str) -> Result<PropertyId, ViewError> {
        let view = self.view(node)?;
        self.registry
            .lookup(view.ty, name)
            .ok_or_else(|| ViewError::UnknownProperty {
                property: name.to_owned(),
                type_name: view.type_name.clone(),
            })
    }

    /// Effective value of `id` on `node`.
    pub fn resolve(&self, node: NodeId, id: PropertyId) -> Option<PropertyValue> {
        let descriptor = self.registry.descriptor(id)?;
        let own = self.view(node).ok()?.own_value(id);
        if let Some(value) = own {
            return Some(value.clone());
        }
        if descriptor.inherited {
            let inherited = node
                .ancestors(&self.arena)
                .skip(1)
                .find_map(|ancestor| self.arena.get(ancestor)?.get().own_value(id));
            if let Some(value) = inherited {
                return Some(value.clone());
            }
        }
        descriptor.default_value.clone()
    }

    /// Effective value of the property named `name`.
    ///
    /// # Errors
    /// Fails for dead handles or unknown property names.
    pub fn get(&self, node: NodeId, name: &str) -> Result<Option<PropertyValue>, ViewError> {
        let id = self.property_id(node, name)?;
        Ok(self.resolve(node, id))
    }

    /// Convert `raw` with the property's converter and store it as the local value.
    ///
    /// # Errors
    /// A [`ViewError::Conversion`] leaves the property unchanged.
    pub fn set_local(&mut self, node: NodeId, name: &str, raw: &str) -> Result<(), ViewError> {
        let id = self.property_id(node, name)?;
        let value = self
            .registry
            .descriptor(id)
            .ok_or(ViewError::UnknownType)?
            .convert(raw)?;
        self.set_local_value(node, id, value)
    }

    /// Store an already typed local value.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn set_local_value(
        &mut self,
        node: NodeId,
        id: PropertyId,
        value: PropertyValue,
    ) -> Result<(), ViewError> {
        let old = self.resolve(node, id);
        self.view_mut(node)?.local.insert(id, value);
        let new = self.resolve(node, id);
        self.report_change(node, id, old, new);
        Ok(())
    }

    /// Remove the local value of `name`.
    ///
    /// # Errors
    /// Fails for dead handles or unknown property names.
    pub fn clear_local(&mut self, node: NodeId, name: &str) -> Result<(), ViewError> {
        let id = self.property_id(node, name)?;
        let old = self.resolve(node, id);
        if self.view_mut(node)?.local.remove(&id).is_none() {
            return Ok(());
        }
        let new = self.resolve(node, id);
        self.report_change(node, id, old, new);
        Ok(())
    }

    /// Remove the CSS value of one property.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn reset_css(&mut self, node: NodeId, id: PropertyId) -> Result<(), ViewError> {
        let old = self.resolve(node, id);
        if self.view_mut(node)?.css.remove(&id).is_none() {
            return Ok(());
        }
        let new = self.resolve(node, id);
        self.report_change(node, id, old, new);
        Ok(())
    }

    /// Remove every CSS value of `node`, leaving local values alone.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn reset_all_css(&mut self, node: NodeId) -> Result<(), ViewError> {
        let ids: Vec<PropertyId> = self.view(node)?.css.keys().copied().collect();
        for id in ids {
            self.reset_css(node, id)?;
        }
        Ok(())
    }

    /// Run the change callback and request layout if the effective value changed.
    pub(crate) fn report_change(
        &mut self,
        node: NodeId,
        id: PropertyId,
        old: Option<PropertyValue>,
        new: Option<PropertyValue>,
    ) {
        let registry = Rc::clone(&self.registry);
        let Some(descriptor) = registry.descriptor(id) else {
            return;
        };
        if descriptor.values_equal(old.as_ref(), new.as_ref()) {
            return;
        }
        trace!(
            target: "properties",
            "{}: {old:?} -> {new:?} on {node:?}",
            descriptor.name
        );
        if let Some(handler) = descriptor.change_handler() {
            handler(self, node, old.as_ref(), new.as_ref());
        }
        if descriptor.affects_layout {
            self.host.request_layout(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{NoopHost, TreeConfig, ViewError, ViewTree};
    use view_properties::PropertyValue;

    fn tree() -> ViewTree {
        ViewTree::with_builtins(Box::new(NoopHost), TreeConfig::default()).unwrap()
    }

    #[test]
    fn conversion_error_leaves_value_unchanged() {
        let mut tree = tree();
        let view = tree.create_view(tree.core().types.view).unwrap();
        tree.set_local(view, "opacity", "0.25").unwrap();
        let err = tree.set_local(view, "opacity", "mostly").unwrap_err();
        assert!(matches!(err, ViewError::Conversion(_)));
        assert_eq!(tree.get(view, "opacity").unwrap(), Some(PropertyValue::Number(0.25)));
    }

    #[test]
    fn unknown_property_names_the_type() {
        let mut tree = tree();
        let view = tree.create_view(tree.core().types.view).unwrap();
        assert_eq!(
            tree.set_local(view, "actionBarHidden", "true"),
            Err(ViewError::UnknownProperty {
                property: "actionBarHidden".into(),
                type_name: "view".into()
            })
        );
    }

    #[test]
    fn inherited_values_come_from_the_nearest_ancestor() {
        let mut tree = tree();
        let view = tree.core().types.view;
        let outer = tree.create_view(view).unwrap();
        let inner = tree.create_view(view).unwrap();
        let leaf = tree.create_view(view).unwrap();
        tree.append_child(outer, inner).unwrap();
        tree.append_child(inner, leaf).unwrap();
        tree.set_local(outer, "fontSize", "12").unwrap();
        tree.set_local(inner, "fontSize", "14").unwrap();
        tree.set_local(outer, "opacity", "0.5").unwrap();

        assert_eq!(tree.get(leaf, "fontSize").unwrap(), Some(PropertyValue::Number(14.0)));
        // opacity is not inherited
        assert_eq!(tree.get(leaf, "opacity").unwrap(), Some(PropertyValue::Number(1.0)));
        assert_eq!(tree.get(leaf, "color").unwrap(), None);
    }
}
