//! A retained tree of UI nodes.
//!
//! Nodes carry typed property values from three origins (local assignments,
//! stylesheet rules and type defaults), go through a load/unload lifecycle and
//! raise events. Pages own a style scope; loading a page runs the cascade for
//! every node the scope styles, gated by the scope version so an unchanged
//! stylesheet is never reapplied.
//!
//! Everything native (widgets, layout, animation, modal transitions) is behind
//! the [`NativeHost`] trait.

mod builtins;
mod cascade;
mod config;
mod error;
mod events;
mod gate;
mod host;
mod lifecycle;
mod modal;
mod page;
mod scroll;
mod tree;
mod values;
mod view;
pub mod walker;

pub use builtins::{Core, CoreProperties, CoreTypes, register_core};
pub use cascade::CascadeOutcome;
pub use config::{Platform, TreeConfig};
pub use error::ViewError;
pub use events::{
    EventData, EventDetail, LOADED, Listener, ListenerId, NAVIGATED_FROM, NAVIGATED_TO,
    NAVIGATING_FROM, NAVIGATING_TO, SCROLL, SHOWING_MODALLY, SHOWN_MODALLY, UNLOADED,
};
pub use gate::{GateAction, ListenerGate};
pub use host::{NativeHost, NoopHost, ScrollAxis, ScrollMetrics};
pub use modal::{CloseHandler, ModalCloser, ModalRequest, PageSource};
pub use page::PageFactory;
pub use tree::{Registry, ViewTree};
pub use view::{LifecycleState, View};
