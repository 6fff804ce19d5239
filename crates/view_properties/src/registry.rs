use crate::descriptor::{PropertyDescriptor, PropertyId, PropertyOptions};
use crate::error::RegistrationError;
use crate::types::{TypeInfo, TypeTag};
use log::debug;
use std::collections::HashMap;

/// Node types and the property descriptors registered on them.
///
/// Lookups walk the type's ancestor list so a subtype sees every property of
/// its parents and may shadow one by registering the same name again.
pub struct PropertyRegistry<Ctx, Node> {
    types: Vec<TypeInfo>,
    type_names: HashMap<String, TypeTag>,
    descriptors: Vec<PropertyDescriptor<Ctx, Node>>,
    by_owner: HashMap<TypeTag, HashMap<String, PropertyId>>,
    css_by_owner: HashMap<TypeTag, HashMap<String, PropertyId>>,
}

impl<Ctx, Node> Default for PropertyRegistry<Ctx, Node> {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            type_names: HashMap::new(),
            descriptors: Vec::new(),
            by_owner: HashMap::new(),
            css_by_owner: HashMap::new(),
        }
    }
}

impl<Ctx, Node> PropertyRegistry<Ctx, Node> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a node type. The name is matched by type selectors, case-insensitively.
    ///
    /// # Errors
    /// Fails if the name is taken or `parent` is not a type of this registry.
    pub fn define_type(
        &mut self,
        name: &str,
        parent: Option<TypeTag>,
    ) -> Result<TypeTag, RegistrationError> {
        let lowered = name.to_ascii_lowercase();
        if self.type_names.contains_key(&lowered) {
            return Err(RegistrationError::DuplicateType(lowered));
        }
        let tag = TypeTag(self.types.len() as u32);
        let mut ancestors = vec![tag];
        if let Some(parent) = parent {
            let parent_info = self.type_info(parent).ok_or(RegistrationError::UnknownType)?;
            ancestors.extend_from_slice(&parent_info.ancestors);
        }
        self.type_names.insert(lowered.clone(), tag);
        self.types.push(TypeInfo {
            name: lowered,
            ancestors,
        });
        Ok(tag)
    }

    pub fn type_info(&self, tag: TypeTag) -> Option<&TypeInfo> {
        self.types.get(tag.0 as usize)
    }

    pub fn type_named(&self, name: &str) -> Option<TypeTag> {
        self.type_names.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn is_a(&self, tag: TypeTag, ancestor: TypeTag) -> bool {
        self.type_info(tag).is_some_and(|info| info.is_a(ancestor))
    }

    /// Register a descriptor on `owner`.
    ///
    /// # Errors
    /// Fails when `owner` already declares the same name or CSS name, or is unknown.
    pub fn register(
        &mut self,
        options: PropertyOptions<Ctx, Node>,
        owner: TypeTag,
    ) -> Result<PropertyId, RegistrationError> {
        let owner_name = self
            .type_info(owner)
            .map(|info| info.name.clone())
            .ok_or(RegistrationError::UnknownType)?;
        if self
            .by_owner
            .get(&owner)
            .is_some_and(|names| names.contains_key(&options.name))
        {
            return Err(RegistrationError::Duplicate {
                name: options.name,
                owner: owner_name,
            });
        }
        if let Some(css_name) = &options.css_name
            && self
                .css_by_owner
                .get(&owner)
                .is_some_and(|names| names.contains_key(css_name))
        {
            return Err(RegistrationError::DuplicateCss {
                css_name: css_name.clone(),
                owner: owner_name,
            });
        }

        let id = PropertyId(self.descriptors.len());
        let descriptor = options.into_descriptor(id, owner);
        self.by_owner
            .entry(owner)
            .or_default()
            .insert(descriptor.name.clone(), id);
        if let Some(css_name) = &descriptor.css_name {
            self.css_by_owner
                .entry(owner)
                .or_default()
                .insert(css_name.clone(), id);
        }
        debug!(
            target: "properties",
            "registered `{}` on `{owner_name}` as {id:?}",
            descriptor.name
        );
        self.descriptors.push(descriptor);
        Ok(id)
    }

    /// Most specific descriptor named `name` visible on `ty`.
    pub fn lookup(&self, ty: TypeTag, name: &str) -> Option<PropertyId> {
        Self::walk(&self.by_owner, self.type_info(ty)?, name)
    }

    /// Most specific descriptor with CSS name `css_name` visible on `ty`.
    pub fn lookup_css(&self, ty: TypeTag, css_name: &str) -> Option<PropertyId> {
        let lowered = css_name.to_ascii_lowercase();
        Self::walk(&self.css_by_owner, self.type_info(ty)?, &lowered)
    }

    pub fn descriptor(&self, id: PropertyId) -> Option<&PropertyDescriptor<Ctx, Node>> {
        self.descriptors.get(id.0)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &PropertyDescriptor<Ctx, Node>> {
        self.descriptors.iter()
    }

    fn walk(
        table: &HashMap<TypeTag, HashMap<String, PropertyId>>,
        info: &TypeInfo,
        name: &str,
    ) -> Option<PropertyId> {
        info.ancestors
            .iter()
            .find_map(|ancestor| table.get(ancestor)?.get(name).copied())
    }
}
