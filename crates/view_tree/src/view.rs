use crate::events::{Listener, ListenerId};
use crate::gate::ListenerGate;
use crate::modal::ModalSession;
use css_orchestrator::StyleScope;
use indextree::NodeId;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use view_properties::{PropertyId, PropertyValue, TypeTag};

/// `constructed -> loaded <-> unloaded -> disposed`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Constructed,
    Loaded,
    Unloaded,
    Disposed,
}

/// Style scope owned by a subtree root.
#[derive(Debug, Default)]
pub(crate) struct ScopeSlot {
    pub scope: StyleScope,
    /// Scope version the last cascade pass ran for. `None` forces the next pass.
    pub applied_version: Option<u64>,
    /// Resolved stylesheet paths already loaded into the scope.
    pub css_files: HashSet<PathBuf>,
}

#[derive(Default)]
pub(crate) struct PageState {
    pub navigation_context: Option<Value>,
    /// Page this page currently presents modally.
    pub modal: Option<NodeId>,
    /// Set while this page is shown modally.
    pub session: Option<ModalSession>,
    pub action_bar: Option<NodeId>,
}

/// One node of a [`crate::ViewTree`].
pub struct View {
    pub(crate) ty: TypeTag,
    pub(crate) type_name: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: SmallVec<String, 2>,
    pub(crate) attributes: HashMap<String, String>,
    pub(crate) local: HashMap<PropertyId, PropertyValue>,
    pub(crate) css: HashMap<PropertyId, PropertyValue>,
    pub(crate) state: LifecycleState,
    pub(crate) listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
    pub(crate) gates: HashMap<String, ListenerGate>,
    pub(crate) binding_context: Option<Value>,
    pub(crate) content: Option<NodeId>,
    /// Scope version this node's CSS values were computed for.
    pub(crate) style_stamp: Option<u64>,
    pub(crate) scope: Option<Box<ScopeSlot>>,
    pub(crate) page: Option<Box<PageState>>,
}

impl View {
    pub(crate) fn new(ty: TypeTag, type_name: &str) -> Self {
        Self {
            ty,
            type_name: type_name.to_owned(),
            id: None,
            classes: SmallVec::new(),
            attributes: HashMap::new(),
            local: HashMap::new(),
            css: HashMap::new(),
            state: LifecycleState::Constructed,
            listeners: HashMap::new(),
            gates: HashMap::new(),
            binding_context: None,
            content: None,
            style_stamp: None,
            scope: None,
            page: None,
        }
    }

    pub const fn type_tag(&self) -> TypeTag {
        self.ty
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|known| known == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LifecycleState::Loaded
    }

    pub const fn style_stamp(&self) -> Option<u64> {
        self.style_stamp
    }

    /// Values set through `set_local`.
    pub fn local_value(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.local.get(&id)
    }

    /// Values assigned by the cascade.
    pub fn css_value(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.css.get(&id)
    }

    /// Local value, else CSS value.
    pub(crate) fn own_value(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.local.get(&id).or_else(|| self.css.get(&id))
    }
}
