/// Handle of a node type defined in a [`crate::PropertyRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(pub(crate) u32);

/// A node type and its ancestry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// ASCII lowercase type name, used by type selectors.
    pub name: String,
    /// The type itself followed by its ancestors, most specific first.
    pub ancestors: Vec<TypeTag>,
}

impl TypeInfo {
    pub fn is_a(&self, other: TypeTag) -> bool {
        self.ancestors.contains(&other)
    }
}
