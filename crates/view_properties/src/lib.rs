//! Typed property descriptors for UI node types.
//!
//! A [`PropertyRegistry`] is built once at startup: define node types with
//! [`PropertyRegistry::define_type`], then register properties on them with the
//! [`Property`] and [`CssProperty`] builders. Descriptors are immutable after
//! registration and are shared by every tree that uses the registry.
//!
//! `Ctx` is the structure passed to change callbacks (normally the tree) and
//! `Node` the handle of a node inside it.

pub mod annotate;
pub mod converters;
mod descriptor;
mod error;
mod registry;
mod types;
mod value;

pub use annotate::Stability;
pub use converters::ValueConverter;
pub use descriptor::{
    CssProperty, EqualityComparer, OnChanged, Property, PropertyBuilder, PropertyDescriptor,
    PropertyId, PropertyOptions,
};
pub use error::{RegistrationError, ValueConversionError};
pub use registry::PropertyRegistry;
pub use types::{TypeInfo, TypeTag};
pub use value::{PropertyValue, Rgba};
