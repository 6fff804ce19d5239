//! Error type of the view tree.

use core::fmt;
use view_properties::ValueConversionError;

/// Errors returned by tree operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The child cannot go into this slot (for example a null action bar).
    InvalidChildAssignment(String),
    Conversion(ValueConversionError),
    /// No property with this name is visible on the node's type.
    UnknownProperty { property: String, type_name: String },
    /// The operation requires a page.
    NotAPage,
    /// The operation requires a scroll view.
    NotAScrollView,
    /// A modal was requested over the topmost page, but there is none.
    NoTopmostPage,
    /// No page factory is registered under this module name.
    UnknownPageModule(String),
    /// The node was disposed.
    Disposed,
    /// The handle does not belong to this tree.
    UnknownNode,
    /// The node does not own a style scope.
    NoStyleScope,
    /// The type tag is not defined in the tree's registry.
    UnknownType,
    /// The presenter already shows a modal page.
    ModalAlreadyShown,
}

impl fmt::Display for ViewError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChildAssignment(reason) => {
                write!(formatter, "invalid child assignment: {reason}")
            }
            Self::Conversion(err) => write!(formatter, "{err}"),
            Self::UnknownProperty {
                property,
                type_name,
            } => write!(formatter, "`{type_name}` has no property `{property}`"),
            Self::NotAPage => formatter.write_str("node is not a page"),
            Self::NotAScrollView => formatter.write_str("node is not a scroll view"),
            Self::NoTopmostPage => formatter.write_str("no topmost page to present over"),
            Self::UnknownPageModule(name) => write!(formatter, "unknown page module `{name}`"),
            Self::Disposed => formatter.write_str("node was disposed"),
            Self::UnknownNode => formatter.write_str("node does not belong to this tree"),
            Self::NoStyleScope => formatter.write_str("node does not own a style scope"),
            Self::UnknownType => formatter.write_str("unknown node type"),
            Self::ModalAlreadyShown => formatter.write_str("a modal page is already shown"),
        }
    }
}

impl std::error::Error for ViewError {}

impl From<ValueConversionError> for ViewError {
    fn from(err: ValueConversionError) -> Self {
        Self::Conversion(err)
    }
}
