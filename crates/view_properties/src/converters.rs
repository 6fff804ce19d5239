//! Text to value converters used by `set_local` and the cascade.

use crate::value::{PropertyValue, Rgba};
use csscolorparser::Color;
use std::rc::Rc;

/// Converts raw text into a typed value. `Err` carries a short reason.
pub type ValueConverter = Rc<dyn Fn(&str) -> Result<PropertyValue, String>>;

/// `true`/`false`, case-insensitive.
pub fn boolean() -> ValueConverter {
    Rc::new(|raw: &str| {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(PropertyValue::Bool(true))
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(PropertyValue::Bool(false))
        } else {
            Err("expected true or false".to_owned())
        }
    })
}

/// Finite floating point numbers.
pub fn number() -> ValueConverter {
    Rc::new(|raw: &str| match raw.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(PropertyValue::Number(number)),
        Ok(_) => Err("number is not finite".to_owned()),
        Err(err) => Err(err.to_string()),
    })
}

/// Any CSS colour `csscolorparser` understands.
pub fn color() -> ValueConverter {
    Rc::new(|raw: &str| parse_color(raw).map(PropertyValue::Color))
}

/// Keeps the trimmed text as is.
pub fn text() -> ValueConverter {
    Rc::new(|raw: &str| Ok(PropertyValue::Text(raw.trim().to_owned())))
}

/// Accepts one of `allowed` (ASCII case-insensitive) and yields it in its canonical spelling.
pub fn keyword_converter(allowed: &'static [&'static str]) -> ValueConverter {
    Rc::new(move |raw: &str| {
        let trimmed = raw.trim();
        allowed
            .iter()
            .find(|keyword| keyword.eq_ignore_ascii_case(trimmed))
            .map(|keyword| PropertyValue::Text((*keyword).to_owned()))
            .ok_or_else(|| format!("expected one of {}", allowed.join(", ")))
    })
}

pub fn parse_color(raw: &str) -> Result<Rgba, String> {
    let parsed: Color = raw.trim().parse().map_err(|err| format!("{err}"))?;
    let [red, green, blue, alpha] = parsed.to_rgba8();
    Ok(Rgba {
        red,
        green,
        blue,
        alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_and_numbers() {
        assert_eq!(boolean()(" TRUE "), Ok(PropertyValue::Bool(true)));
        boolean()("yes").unwrap_err();
        assert_eq!(number()("0.5"), Ok(PropertyValue::Number(0.5)));
        number()("half").unwrap_err();
        number()("inf").unwrap_err();
    }

    #[test]
    fn colors_accept_names_and_hex() {
        let red = Rgba {
            red: 255,
            green: 0,
            blue: 0,
            alpha: 255,
        };
        assert_eq!(color()("red"), Ok(PropertyValue::Color(red)));
        assert_eq!(color()("#ff0000"), Ok(PropertyValue::Color(red)));
        color()("not-a-colour").unwrap_err();
    }

    #[test]
    fn keywords_are_canonicalised() {
        let convert = keyword_converter(&["visible", "collapse"]);
        assert_eq!(convert("Visible"), Ok(PropertyValue::Text("visible".into())));
        convert("gone").unwrap_err();
    }
}
