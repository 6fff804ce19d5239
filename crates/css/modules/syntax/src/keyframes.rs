//! `@keyframes` blocks.

use crate::{Declaration, StyleParseError, StyleParseErrorKind, parse_declarations_from_block};
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::Token;

/// One keyframe selector block. `from` is offset 0, `to` is offset 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Offsets in `0.0..=1.0`, one per comma separated selector.
    pub offsets: Vec<f32>,
    /// Declarations of the keyframe in source order.
    pub declarations: Vec<Declaration>,
}

/// A named keyframe animation as declared in a stylesheet.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeAnimationInfo {
    /// Animation name from the `@keyframes` prelude.
    pub name: String,
    /// Keyframes in source order.
    pub keyframes: Vec<Keyframe>,
}

struct KeyframeBodyParser<'errors> {
    errors: &'errors mut Vec<StyleParseError>,
}

impl<'input> CssQualifiedRuleParser<'input> for KeyframeBodyParser<'_> {
    type Prelude = Vec<f32>;
    type QualifiedRule = Keyframe;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        input.parse_comma_separated(|item| {
            let location = item.current_source_location();
            match item.next()? {
                Token::Ident(ident) if ident.eq_ignore_ascii_case("from") => Ok(0.0),
                Token::Ident(ident) if ident.eq_ignore_ascii_case("to") => Ok(1.0),
                Token::Percentage { unit_value, .. } if (0.0..=1.0).contains(unit_value) => {
                    Ok(*unit_value)
                }
                other => Err(location.new_unexpected_token_error(other.clone())),
            }
        })
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        let declarations = parse_declarations_from_block(input, &mut *self.errors);
        Ok(Keyframe {
            offsets: prelude,
            declarations,
        })
    }
}

impl<'input> CssDeclarationParser<'input> for KeyframeBodyParser<'_> {
    type Declaration = Keyframe;
    type Error = ();

    fn parse_value<'tokens>(
        &mut self,
        _name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'input> CssAtRuleParser<'input> for KeyframeBodyParser<'_> {
    type Prelude = ();
    type AtRule = Keyframe;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)))
    }

    fn parse_block<'tokens>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Err(())
    }
}

impl<'input> CssRuleBodyItemParser<'input, Keyframe, ()> for KeyframeBodyParser<'_> {
    fn parse_declarations(&self) -> bool {
        false
    }
    fn parse_qualified(&self) -> bool {
        true
    }
}

/// Parse the body of `@keyframes <name> { ... }`.
pub(crate) fn parse_keyframes_block(
    name: String,
    block: &mut Parser<'_, '_>,
    errors: &mut Vec<StyleParseError>,
) -> KeyframeAnimationInfo {
    let mut failures = Vec::new();
    let mut keyframes = Vec::new();
    {
        let mut body = KeyframeBodyParser { errors };
        for item in CssRuleBodyParser::new(block, &mut body) {
            match item {
                Ok(keyframe) => keyframes.push(keyframe),
                Err((error, slice)) => failures.push(StyleParseError::from_css(
                    &error,
                    slice,
                    StyleParseErrorKind::InvalidRule,
                )),
            }
        }
    }
    errors.append(&mut failures);
    KeyframeAnimationInfo { name, keyframes }
}

#[cfg(test)]
mod tests {
    use crate::parse_stylesheet;

    #[test]
    fn keyframes_offsets_and_declarations() {
        let sheet = parse_stylesheet(
            "@keyframes fade { from { opacity: 0 } 50%, 75% { opacity: 0.5 } to { opacity: 1 } }",
        );
        assert!(sheet.errors.is_empty());
        let info = &sheet.keyframes[0];
        assert_eq!(info.name, "fade");
        assert_eq!(info.keyframes.len(), 3);
        assert_eq!(info.keyframes[0].offsets, vec![0.0]);
        assert_eq!(info.keyframes[1].offsets, vec![0.5, 0.75]);
        assert_eq!(info.keyframes[2].declarations[0].value, "1");
    }

    #[test]
    fn bad_keyframe_selector_drops_only_that_keyframe() {
        let sheet = parse_stylesheet("@keyframes spin { sideways { opacity: 0 } to { opacity: 1 } }");
        assert_eq!(sheet.keyframes[0].keyframes.len(), 1);
        assert_eq!(sheet.errors.len(), 1);
    }
}
