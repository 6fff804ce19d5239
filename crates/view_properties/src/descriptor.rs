use crate::annotate::{Stability, wrap_converter};
use crate::converters::{self, ValueConverter};
use crate::error::{RegistrationError, ValueConversionError};
use crate::registry::PropertyRegistry;
use crate::types::TypeTag;
use crate::value::PropertyValue;
use core::fmt;
use std::rc::Rc;

/// Handle of a registered descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(pub(crate) usize);

/// Custom equality used to decide whether a value change must be reported.
pub type EqualityComparer = Rc<dyn Fn(&PropertyValue, &PropertyValue) -> bool>;

/// Change callback: `(context, node, old, new)`. `None` means unset.
pub type OnChanged<Ctx, Node> =
    Rc<dyn Fn(&mut Ctx, Node, Option<&PropertyValue>, Option<&PropertyValue>)>;

/// An immutable, registered property.
pub struct PropertyDescriptor<Ctx, Node> {
    pub id: PropertyId,
    pub name: String,
    /// Set for properties that stylesheets can assign.
    pub css_name: Option<String>,
    pub owner: TypeTag,
    pub default_value: Option<PropertyValue>,
    pub affects_layout: bool,
    pub inherited: bool,
    pub stability: Stability,
    pub(crate) converter: ValueConverter,
    pub(crate) equality: Option<EqualityComparer>,
    pub(crate) on_changed: Option<OnChanged<Ctx, Node>>,
}

impl<Ctx, Node> PropertyDescriptor<Ctx, Node> {
    /// Run the descriptor's converter over `raw`.
    ///
    /// # Errors
    /// Returns [`ValueConversionError`] when the converter rejects the text.
    pub fn convert(&self, raw: &str) -> Result<PropertyValue, ValueConversionError> {
        (self.converter)(raw).map_err(|reason| ValueConversionError {
            property: self.name.clone(),
            raw: raw.to_owned(),
            reason,
        })
    }

    pub fn values_equal(&self, left: Option<&PropertyValue>, right: Option<&PropertyValue>) -> bool {
        match (left, right) {
            (Some(left), Some(right)) => self
                .equality
                .as_ref()
                .map_or_else(|| left == right, |equal| equal(left, right)),
            (None, None) => true,
            _ => false,
        }
    }

    /// Callback to run after the effective value changed, cloned out of the registry.
    pub fn change_handler(&self) -> Option<OnChanged<Ctx, Node>> {
        self.on_changed.as_ref().map(Rc::clone)
    }
}

impl<Ctx, Node> fmt::Debug for PropertyDescriptor<Ctx, Node> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PropertyDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("css_name", &self.css_name)
            .field("owner", &self.owner)
            .field("default_value", &self.default_value)
            .field("affects_layout", &self.affects_layout)
            .field("inherited", &self.inherited)
            .field("stability", &self.stability)
            .finish_non_exhaustive()
    }
}

/// Everything a builder collects before registration.
pub struct PropertyOptions<Ctx, Node> {
    pub(crate) name: String,
    pub(crate) css_name: Option<String>,
    pub(crate) default_value: Option<PropertyValue>,
    pub(crate) affects_layout: bool,
    pub(crate) inherited: bool,
    pub(crate) stability: Stability,
    pub(crate) converter: Option<ValueConverter>,
    pub(crate) equality: Option<EqualityComparer>,
    pub(crate) on_changed: Option<OnChanged<Ctx, Node>>,
}

impl<Ctx, Node> PropertyOptions<Ctx, Node> {
    fn named(name: &str, css_name: Option<&str>) -> Self {
        Self {
            name: name.to_owned(),
            css_name: css_name.map(str::to_ascii_lowercase),
            default_value: None,
            affects_layout: false,
            inherited: false,
            stability: Stability::Stable,
            converter: None,
            equality: None,
            on_changed: None,
        }
    }

    pub(crate) fn into_descriptor(self, id: PropertyId, owner: TypeTag) -> PropertyDescriptor<Ctx, Node> {
        let converter = self.converter.unwrap_or_else(converters::text);
        PropertyDescriptor {
            id,
            converter: wrap_converter(self.stability, &self.name, converter),
            name: self.name,
            css_name: self.css_name,
            owner,
            default_value: self.default_value,
            affects_layout: self.affects_layout,
            inherited: self.inherited,
            stability: self.stability,
            equality: self.equality,
            on_changed: self.on_changed,
        }
    }
}

/// Builder methods shared by [`Property`] and [`CssProperty`].
pub trait PropertyBuilder<Ctx, Node>: Sized {
    fn options_mut(&mut self) -> &mut PropertyOptions<Ctx, Node>;

    fn into_options(self) -> PropertyOptions<Ctx, Node>;

    #[must_use]
    fn default_value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.options_mut().default_value = Some(value.into());
        self
    }

    #[must_use]
    fn affects_layout(mut self, affects: bool) -> Self {
        self.options_mut().affects_layout = affects;
        self
    }

    #[must_use]
    fn inherited(mut self, inherited: bool) -> Self {
        self.options_mut().inherited = inherited;
        self
    }

    #[must_use]
    fn converter(mut self, converter: ValueConverter) -> Self {
        self.options_mut().converter = Some(converter);
        self
    }

    #[must_use]
    fn equality(mut self, equality: EqualityComparer) -> Self {
        self.options_mut().equality = Some(equality);
        self
    }

    #[must_use]
    fn on_changed(mut self, handler: OnChanged<Ctx, Node>) -> Self {
        self.options_mut().on_changed = Some(handler);
        self
    }

    /// Conversions through this property log a deprecation warning.
    #[must_use]
    fn deprecated(mut self) -> Self {
        self.options_mut().stability = Stability::Deprecated;
        self
    }

    /// Conversions through this property log an experimental-feature warning.
    #[must_use]
    fn experimental(mut self) -> Self {
        self.options_mut().stability = Stability::Experimental;
        self
    }

    /// Register on `owner`.
    ///
    /// # Errors
    /// See [`PropertyRegistry::register`].
    fn register(
        self,
        registry: &mut PropertyRegistry<Ctx, Node>,
        owner: TypeTag,
    ) -> Result<PropertyId, RegistrationError> {
        registry.register(self.into_options(), owner)
    }
}

/// A property that can only be set locally.
pub struct Property<Ctx, Node> {
    options: PropertyOptions<Ctx, Node>,
}

impl<Ctx, Node> Property<Ctx, Node> {
    pub fn new(name: &str) -> Self {
        Self {
            options: PropertyOptions::named(name, None),
        }
    }
}

impl<Ctx, Node> PropertyBuilder<Ctx, Node> for Property<Ctx, Node> {
    fn options_mut(&mut self) -> &mut PropertyOptions<Ctx, Node> {
        &mut self.options
    }

    fn into_options(self) -> PropertyOptions<Ctx, Node> {
        self.options
    }
}

/// A property that stylesheets can assign through `css_name`.
pub struct CssProperty<Ctx, Node> {
    options: PropertyOptions<Ctx, Node>,
}

impl<Ctx, Node> CssProperty<Ctx, Node> {
    pub fn new(name: &str, css_name: &str) -> Self {
        Self {
            options: PropertyOptions::named(name, Some(css_name)),
        }
    }
}

impl<Ctx, Node> PropertyBuilder<Ctx, Node> for CssProperty<Ctx, Node> {
    fn options_mut(&mut self) -> &mut PropertyOptions<Ctx, Node> {
        &mut self.options
    }

    fn into_options(self) -> PropertyOptions<Ctx, Node> {
        self.options
    }
}
