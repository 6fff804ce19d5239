//! Selector parsing, matching and specificity for UI node trees.
//!
//! The supported grammar is deliberately small:
//! - type (`Button`, matched case-insensitively), class, id and attribute
//!   (`[name]`, `[name=value]`) selectors plus the universal selector
//! - combinators: descendant, child, adjacent sibling, general sibling
//! - comma separated selector lists
//!
//! Anything else (pseudo-classes, pseudo-elements, namespaces) is rejected by
//! [`try_parse_selector_list`] so the owning rule can be dropped.

mod matcher;
mod parser;
mod specificity;

pub use matcher::{matches_complex, matches_compound, matches_selector_list};
pub use parser::{SelectorParseError, parse_selector_list, try_parse_selector_list};
pub use specificity::{Specificity, specificity_of_complex, specificity_of_compound};

/// Tree access needed by the matcher. Implement this for your node tree.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent node, if any.
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling node, if any.
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Type name of the node. Type selectors compare it ASCII case-insensitively.
    fn type_name(&self, element: Self::Handle) -> &str;

    /// The node's id, if set.
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the node carries the given class.
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Attribute value lookup used by attribute selectors.
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;
}

/// Simple selectors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Type selector, stored lowercased.
    Type(String),
    /// `.class`
    Class(String),
    /// `#id`
    IdSelector(String),
    /// `[name]`
    AttrExists(String),
    /// `[name=value]`
    AttrEquals { name: String, value: String },
    /// `*`
    Universal,
}

/// A sequence of simple selectors without combinators.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// One or more compounds separated by combinators, read left to right.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// The compound that has to match the subject node itself.
    pub fn subject(&self) -> &CompoundSelector {
        self.rest.last().map_or(&self.first, |pair| &pair.1)
    }
}

/// A comma separated selector list.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}
