use crate::builtins::{Core, register_core};
use crate::config::TreeConfig;
use crate::error::ViewError;
use crate::events::SCROLL;
use crate::host::NativeHost;
use crate::page::PageFactory;
use crate::view::{LifecycleState, PageState, ScopeSlot, View};
use crate::walker;
use css_selectors::ElementAdapter;
use indextree::{Arena, NodeId};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;
use view_properties::{PropertyRegistry, RegistrationError, TypeTag};

/// Registry type shared by every tree.
pub type Registry = PropertyRegistry<ViewTree, NodeId>;

/// A retained tree of UI nodes with property values, style scopes and lifecycle.
pub struct ViewTree {
    pub(crate) arena: Arena<View>,
    pub(crate) registry: Rc<Registry>,
    pub(crate) core: Core,
    pub(crate) host: Box<dyn NativeHost>,
    pub(crate) config: TreeConfig,
    pub(crate) topmost_page: Option<NodeId>,
    pub(crate) page_factories: HashMap<String, PageFactory>,
    pub(crate) native_events: Vec<(TypeTag, String)>,
    pub(crate) next_listener: u64,
}

impl ViewTree {
    /// Build a tree over an existing registry. `core` must come from
    /// [`register_core`] on that registry.
    pub fn new(
        registry: Rc<Registry>,
        core: Core,
        host: Box<dyn NativeHost>,
        config: TreeConfig,
    ) -> Self {
        let mut tree = Self {
            arena: Arena::new(),
            registry,
            core,
            host,
            config,
            topmost_page: None,
            page_factories: HashMap::new(),
            native_events: Vec::new(),
            next_listener: 0,
        };
        tree.declare_native_event(core.types.scroll_view, SCROLL);
        tree
    }

    /// Build a tree with a fresh registry holding only the core types.
    ///
    /// # Errors
    /// Never fails in practice; registration errors are forwarded.
    pub fn with_builtins(
        host: Box<dyn NativeHost>,
        config: TreeConfig,
    ) -> Result<Self, RegistrationError> {
        let mut registry = Registry::new();
        let core = register_core(&mut registry, config.platform)?;
        Ok(Self::new(Rc::new(registry), core, host, config))
    }

    pub const fn core(&self) -> &Core {
        &self.core
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn host(&self) -> &dyn NativeHost {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn NativeHost {
        self.host.as_mut()
    }

    /// Create a detached node of type `ty`. Page types get a page state and a style scope.
    ///
    /// # Errors
    /// Fails if `ty` is not defined in the registry.
    pub fn create_view(&mut self, ty: TypeTag) -> Result<NodeId, ViewError> {
        let info = self.registry.type_info(ty).ok_or(ViewError::UnknownType)?;
        let mut view = View::new(ty, &info.name);
        if self.registry.is_a(ty, self.core.types.page) {
            view.page = Some(Box::default());
            view.scope = Some(Box::default());
        }
        Ok(self.arena.new_node(view))
    }

    /// Create a detached node by type name.
    ///
    /// # Errors
    /// Fails if no type with this name is defined.
    pub fn create_view_named(&mut self, type_name: &str) -> Result<NodeId, ViewError> {
        let ty = self
            .registry
            .type_named(type_name)
            .ok_or(ViewError::UnknownType)?;
        self.create_view(ty)
    }

    /// Give `node` its own style scope. Nodes below it are styled by that scope.
    ///
    /// # Errors
    /// Fails if `node` is not a live node of this tree.
    pub fn ensure_style_scope(&mut self, node: NodeId) -> Result<(), ViewError> {
        let view = self.view_mut(node)?;
        if view.scope.is_none() {
            view.scope = Some(Box::<ScopeSlot>::default());
        }
        Ok(())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.view(node).is_ok()
    }

    /// # Errors
    /// [`ViewError::Disposed`] for disposed nodes, [`ViewError::UnknownNode`] for foreign handles.
    pub fn view(&self, node: NodeId) -> Result<&View, ViewError> {
        let view = self.arena.get(node).ok_or(ViewError::UnknownNode)?.get();
        if view.state == LifecycleState::Disposed {
            return Err(ViewError::Disposed);
        }
        Ok(view)
    }

    pub(crate) fn view_mut(&mut self, node: NodeId) -> Result<&mut View, ViewError> {
        let view = self
            .arena
            .get_mut(node)
            .ok_or(ViewError::UnknownNode)?
            .get_mut();
        if view.state == LifecycleState::Disposed {
            return Err(ViewError::Disposed);
        }
        Ok(view)
    }

    pub(crate) fn page_state(&self, node: NodeId) -> Result<&PageState, ViewError> {
        self.view(node)?.page.as_deref().ok_or(ViewError::NotAPage)
    }

    pub(crate) fn page_state_mut(&mut self, node: NodeId) -> Result<&mut PageState, ViewError> {
        self.view_mut(node)?
            .page
            .as_deref_mut()
            .ok_or(ViewError::NotAPage)
    }

    pub fn is_a(&self, node: NodeId, ty: TypeTag) -> bool {
        self.view(node)
            .is_ok_and(|view| self.registry.is_a(view.ty, ty))
    }

    pub fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    pub fn state(&self, node: NodeId) -> Result<LifecycleState, ViewError> {
        Ok(self.view(node)?.state)
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    /// A child added to a loaded parent is loaded right away.
    ///
    /// # Errors
    /// Fails for dead handles or if `child` is `parent` or one of its ancestors.
    /// The tree is left untouched on failure.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ViewError> {
        self.check_append(parent, child)?;
        let parent_loaded = self.view(parent)?.is_loaded();
        if let Some(previous) = self.parent_node(child) {
            self.remove_child(previous, child)?;
        }
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|err| ViewError::InvalidChildAssignment(err.to_string()))?;
        if parent_loaded {
            self.load_view(child)?;
        }
        Ok(())
    }

    /// Reject appends that would put `child` above itself.
    pub(crate) fn check_append(&self, parent: NodeId, child: NodeId) -> Result<(), ViewError> {
        self.view(parent)?;
        self.view(child)?;
        if parent.ancestors(&self.arena).any(|ancestor| ancestor == child) {
            return Err(ViewError::InvalidChildAssignment(
                "a node cannot be appended to itself or its descendants".to_owned(),
            ));
        }
        Ok(())
    }

    /// Detach `child` from `parent`. A loaded child is unloaded first.
    ///
    /// # Errors
    /// Fails for dead handles or if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ViewError> {
        if self.parent_node(child) != Some(parent) {
            return Err(ViewError::InvalidChildAssignment(
                "node is not a child of this parent".to_owned(),
            ));
        }
        if self.view(child)?.is_loaded() {
            self.unload_view(child)?;
        }
        child.detach(&mut self.arena);
        for node in walker::subtree(self, child) {
            let view = self.view_mut(node)?;
            view.style_stamp = None;
            if let Some(slot) = view.scope.as_deref_mut() {
                slot.applied_version = None;
            }
            if self.owning_scope_root(node).is_none() {
                self.reset_all_css(node)?;
            }
        }
        if let Ok(view) = self.view_mut(parent) {
            if view.content == Some(child) {
                view.content = None;
            }
            if let Some(page) = view.page.as_deref_mut()
                && page.action_bar == Some(child)
            {
                page.action_bar = None;
            }
        }
        Ok(())
    }

    /// Unload and detach `node`, then mark it and its subtree disposed. Terminal.
    ///
    /// Disposed slots stay in the arena so stale handles report [`ViewError::Disposed`].
    /// A page shown modally is dismissed without running its close handler.
    ///
    /// # Errors
    /// Fails if `node` is already disposed or foreign.
    pub fn dispose(&mut self, node: NodeId) -> Result<(), ViewError> {
        if self.view(node)?.is_loaded() {
            self.unload_view(node)?;
        }
        if let Some(parent) = self.parent_node(node) {
            self.remove_child(parent, node)?;
        }
        let doomed = walker::subtree(self, node);
        for member in &doomed {
            self.drop_modal_session(*member)?;
        }
        for member in &doomed {
            let view = self.view_mut(*member)?;
            view.state = LifecycleState::Disposed;
            view.listeners.clear();
            view.gates.clear();
            view.local.clear();
            view.css.clear();
            view.binding_context = None;
            view.scope = None;
            view.page = None;
        }
        if self.topmost_page.is_some_and(|page| doomed.contains(&page)) {
            self.topmost_page = None;
        }
        debug!(target: "lifecycle", "disposed {node:?} with {} nodes", doomed.len());
        Ok(())
    }

    /// Set or clear the node id. Loaded nodes are restyled.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn set_id(&mut self, node: NodeId, id: Option<&str>) -> Result<(), ViewError> {
        let view = self.view_mut(node)?;
        let id = id.map(ToOwned::to_owned);
        if view.id == id {
            return Ok(());
        }
        view.id = id;
        self.restyle_if_loaded(node)
    }

    /// # Errors
    /// Fails for dead handles.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), ViewError> {
        let view = self.view_mut(node)?;
        if view.has_class(class) {
            return Ok(());
        }
        view.classes.push(class.to_owned());
        self.restyle_if_loaded(node)
    }

    /// # Errors
    /// Fails for dead handles.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), ViewError> {
        let view = self.view_mut(node)?;
        let Some(index) = view.classes.iter().position(|known| known == class) else {
            return Ok(());
        };
        view.classes.remove(index);
        self.restyle_if_loaded(node)
    }

    /// Replace all classes with the whitespace separated list `classes`.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn set_class_name(&mut self, node: NodeId, classes: &str) -> Result<(), ViewError> {
        let view = self.view_mut(node)?;
        view.classes = classes.split_whitespace().map(ToOwned::to_owned).collect();
        self.restyle_if_loaded(node)
    }

    /// Attribute used by `[name]` and `[name=value]` selectors.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), ViewError> {
        let view = self.view_mut(node)?;
        if view.attribute(name) == Some(value) {
            return Ok(());
        }
        view.attributes.insert(name.to_owned(), value.to_owned());
        self.restyle_if_loaded(node)
    }

    /// # Errors
    /// Fails for dead handles.
    pub fn set_binding_context(
        &mut self,
        node: NodeId,
        context: Option<Value>,
    ) -> Result<(), ViewError> {
        self.view_mut(node)?.binding_context = context;
        Ok(())
    }

    /// Own binding context, else the nearest ancestor's.
    pub fn binding_context(&self, node: NodeId) -> Option<Value> {
        if !self.contains(node) {
            return None;
        }
        node.ancestors(&self.arena)
            .find_map(|ancestor| self.arena.get(ancestor)?.get().binding_context.clone())
    }

    pub const fn topmost_page(&self) -> Option<NodeId> {
        self.topmost_page
    }

    /// # Errors
    /// Fails if `page` is not a page.
    pub fn set_topmost_page(&mut self, page: Option<NodeId>) -> Result<(), ViewError> {
        if let Some(node) = page {
            self.page_state(node)?;
        }
        self.topmost_page = page;
        Ok(())
    }

    /// Restyle `node` and its later siblings, which sibling combinators may match
    /// against `node`.
    fn restyle_if_loaded(&mut self, node: NodeId) -> Result<(), ViewError> {
        if !self.view(node)?.is_loaded() {
            return Ok(());
        }
        self.restyle_subtree(node)?;
        let later: Vec<NodeId> = node.following_siblings(&self.arena).skip(1).collect();
        for sibling in later {
            if self.view(sibling)?.is_loaded() {
                self.restyle_subtree(sibling)?;
            }
        }
        Ok(())
    }
}

impl ElementAdapter for ViewTree {
    type Handle = NodeId;

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.arena.get(element)?.parent()
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.arena.get(element)?.previous_sibling()
    }

    fn type_name(&self, element: NodeId) -> &str {
        self.arena
            .get(element)
            .map_or("", |entry| entry.get().type_name.as_str())
    }

    fn element_id(&self, element: NodeId) -> Option<&str> {
        self.arena.get(element)?.get().id.as_deref()
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.arena
            .get(element)
            .is_some_and(|entry| entry.get().has_class(class))
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.arena.get(element)?.get().attribute(name)
    }
}
