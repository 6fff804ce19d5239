use core::fmt;

/// A descriptor could not be registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    /// The owner type already has a property with this name.
    Duplicate { name: String, owner: String },
    /// The owner type already has a property with this CSS name.
    DuplicateCss { css_name: String, owner: String },
    /// A type with this name was already defined.
    DuplicateType(String),
    /// The tag does not belong to this registry.
    UnknownType,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate { name, owner } => {
                write!(formatter, "property `{name}` is already registered on `{owner}`")
            }
            Self::DuplicateCss { css_name, owner } => {
                write!(formatter, "css property `{css_name}` is already registered on `{owner}`")
            }
            Self::DuplicateType(name) => write!(formatter, "type `{name}` is already defined"),
            Self::UnknownType => formatter.write_str("unknown owner type"),
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Text could not be converted into a property value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueConversionError {
    pub property: String,
    pub raw: String,
    pub reason: String,
}

impl fmt::Display for ValueConversionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "invalid value `{}` for `{}`: {}",
            self.raw, self.property, self.reason
        )
    }
}

impl std::error::Error for ValueConversionError {}
