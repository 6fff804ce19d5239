//! Deprecated and experimental markers, composed into converters at registration.

use crate::converters::ValueConverter;
use log::warn;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stability {
    #[default]
    Stable,
    Deprecated,
    Experimental,
}

/// Wrap `inner` so every call logs that `label` is deprecated.
pub fn deprecated(label: &str, inner: ValueConverter) -> ValueConverter {
    let label = label.to_owned();
    Rc::new(move |raw: &str| {
        warn!(target: "properties", "{label} is deprecated");
        inner(raw)
    })
}

/// Wrap `inner` so every call logs that `label` is experimental.
pub fn experimental(label: &str, inner: ValueConverter) -> ValueConverter {
    let label = label.to_owned();
    Rc::new(move |raw: &str| {
        warn!(target: "properties", "{label} is experimental");
        inner(raw)
    })
}

pub fn wrap_converter(stability: Stability, label: &str, inner: ValueConverter) -> ValueConverter {
    match stability {
        Stability::Stable => inner,
        Stability::Deprecated => deprecated(label, inner),
        Stability::Experimental => experimental(label, inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyValue;
    use crate::converters;

    #[test]
    fn wrapped_converters_still_convert() {
        let _ = env_logger::builder().is_test(true).try_init();
        let convert = wrap_converter(Stability::Deprecated, "oldFlag", converters::boolean());
        assert_eq!(convert("true"), Ok(PropertyValue::Bool(true)));
        let convert = wrap_converter(Stability::Experimental, "newFlag", converters::number());
        convert("x").unwrap_err();
    }
}
