//! Stylesheet text parsing for style scopes.
//!
//! Built on `cssparser`. Every top-level rule and every declaration is parsed
//! independently: a malformed item is dropped and reported in
//! [`ParsedStylesheet::errors`] while the remainder of the sheet is kept.
use core::fmt;
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::ParseErrorKind;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;
use log::trace;

mod keyframes;

pub use keyframes::{Keyframe, KeyframeAnimationInfo};

/// A single CSS declaration (`property: value`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Raw value text, trimmed, without a trailing `!important`.
    pub value: String,
}

/// A single style rule with a raw prelude and parsed declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw prelude text (the selector list).
    pub prelude: String,
    /// Declarations within the rule block, in source order.
    pub declarations: Vec<Declaration>,
    /// 1-based line of the rule prelude.
    pub line: u32,
}

/// What went wrong with a dropped stylesheet item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleParseErrorKind {
    /// A qualified rule could not be parsed (for example an empty prelude).
    InvalidRule,
    /// A declaration inside a rule block could not be parsed.
    InvalidDeclaration,
    /// An at-rule other than `@keyframes`.
    UnsupportedAtRule(String),
    /// The rule prelude is not a selector list this engine understands.
    InvalidSelector(String),
}

/// A recoverable parse failure. The offending item was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleParseError {
    /// 1-based line of the failing item.
    pub line: u32,
    /// 1-based column of the failing item.
    pub column: u32,
    /// Failure category.
    pub kind: StyleParseErrorKind,
    /// Source text of the skipped item.
    pub source_text: String,
}

impl fmt::Display for StyleParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StyleParseErrorKind::InvalidRule => write!(
                formatter,
                "{}:{}: invalid rule `{}`",
                self.line, self.column, self.source_text
            ),
            StyleParseErrorKind::InvalidDeclaration => write!(
                formatter,
                "{}:{}: invalid declaration `{}`",
                self.line, self.column, self.source_text
            ),
            StyleParseErrorKind::UnsupportedAtRule(name) => write!(
                formatter,
                "{}:{}: unsupported at-rule @{name}",
                self.line, self.column
            ),
            StyleParseErrorKind::InvalidSelector(reason) => write!(
                formatter,
                "{}:{}: invalid selector `{}`: {reason}",
                self.line, self.column, self.source_text
            ),
        }
    }
}

impl std::error::Error for StyleParseError {}

impl StyleParseError {
    /// Build an error from a `cssparser` failure and the skipped source slice.
    fn from_css(error: &ParseError<'_, ()>, slice: &str, fallback: StyleParseErrorKind) -> Self {
        let kind = match &error.kind {
            ParseErrorKind::Basic(BasicParseErrorKind::AtRuleInvalid(name)) => {
                StyleParseErrorKind::UnsupportedAtRule(name.to_ascii_lowercase())
            }
            _ => fallback,
        };
        Self {
            line: error.location.line.saturating_add(1),
            column: error.location.column,
            kind,
            source_text: slice.trim().to_owned(),
        }
    }
}

/// Result of parsing one stylesheet text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedStylesheet {
    /// Top-level style rules in source order.
    pub rules: Vec<StyleRule>,
    /// `@keyframes` blocks in source order.
    pub keyframes: Vec<KeyframeAnimationInfo>,
    /// Items that were skipped.
    pub errors: Vec<StyleParseError>,
}

/// Strip a trailing `!important` marker. Importance does not take part in this cascade.
fn strip_important_tail(value: &str) -> &str {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind("!important")
        && let Some(prefix) = trimmed.get(..pos)
    {
        return prefix.trim_end();
    }
    trimmed
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl<'input> CssDeclarationParser<'input> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let value = strip_important_tail(input.slice_from(start));
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value: value.to_owned(),
        })
    }
}

impl<'input> CssAtRuleParser<'input> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration;
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

impl<'input> CssQualifiedRuleParser<'input> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    fn parse_block<'tokens>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl<'input> CssRuleBodyItemParser<'input, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parse declarations from a rule block, recording the ones that fail.
pub(crate) fn parse_declarations_from_block(
    block: &mut Parser<'_, '_>,
    errors: &mut Vec<StyleParseError>,
) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    let mut body = BodyDeclParser;
    for item in CssRuleBodyParser::new(block, &mut body) {
        match item {
            Ok(decl) => out.push(decl),
            Err((error, slice)) => errors.push(StyleParseError::from_css(
                &error,
                slice,
                StyleParseErrorKind::InvalidDeclaration,
            )),
        }
    }
    out
}

/// A top-level item of a stylesheet.
enum TopLevelItem {
    Style(StyleRule),
    Keyframes(KeyframeAnimationInfo),
}

/// Top-level parser that builds style rules and keyframe blocks.
struct TopLevelParser {
    /// Declaration-level failures collected while parsing rule blocks.
    nested_errors: Vec<StyleParseError>,
}

impl<'input> CssAtRuleParser<'input> for TopLevelParser {
    /// The keyframes name.
    type Prelude = String;
    type AtRule = TopLevelItem;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let is_keyframes = name.eq_ignore_ascii_case("keyframes")
            || name.eq_ignore_ascii_case("-webkit-keyframes");
        if !is_keyframes {
            return Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)));
        }
        let ident = input.expect_ident()?;
        Ok(ident.as_ref().to_owned())
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        let info = keyframes::parse_keyframes_block(prelude, input, &mut self.nested_errors);
        Ok(TopLevelItem::Keyframes(info))
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Err(())
    }
}

impl<'input> CssQualifiedRuleParser<'input> for TopLevelParser {
    /// Raw selector prelude and its 1-based line.
    type Prelude = (String, u32);
    type QualifiedRule = TopLevelItem;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let start = input.state();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let prelude = input.slice_from(start.position()).trim();
        if prelude.is_empty() {
            return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
        }
        let line = start.source_location().line.saturating_add(1);
        Ok((prelude.to_owned(), line))
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        let (selector_text, line) = prelude;
        let declarations = parse_declarations_from_block(input, &mut self.nested_errors);
        Ok(TopLevelItem::Style(StyleRule {
            prelude: selector_text,
            declarations,
            line,
        }))
    }
}

/// Parse a full stylesheet.
///
/// Never fails: malformed rules, declarations and unsupported at-rules are
/// reported in [`ParsedStylesheet::errors`] and skipped.
pub fn parse_stylesheet(css: &str) -> ParsedStylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut top = TopLevelParser {
        nested_errors: Vec::new(),
    };
    let mut sheet = ParsedStylesheet::default();
    for item in StyleSheetParser::new(&mut parser, &mut top) {
        match item {
            Ok(TopLevelItem::Style(rule)) => sheet.rules.push(rule),
            Ok(TopLevelItem::Keyframes(info)) => sheet.keyframes.push(info),
            Err((error, slice)) => sheet.errors.push(StyleParseError::from_css(
                &error,
                slice,
                StyleParseErrorKind::InvalidRule,
            )),
        }
    }
    sheet.errors.append(&mut top.nested_errors);
    sheet.errors.sort_by_key(|error| (error.line, error.column));
    trace!(
        target: "css",
        "parsed stylesheet: {} rules, {} keyframes, {} errors",
        sheet.rules.len(),
        sheet.keyframes.len(),
        sheet.errors.len()
    );
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_in_source_order() {
        let sheet = parse_stylesheet("Button { color: red; font-size: 12 } .title { color: blue }");
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].prelude, "Button");
        assert_eq!(sheet.rules[0].declarations[1].name, "font-size");
        assert_eq!(sheet.rules[0].declarations[1].value, "12");
        assert_eq!(sheet.rules[1].prelude, ".title");
        assert!(sheet.errors.is_empty());
    }

    #[test]
    fn important_marker_is_stripped() {
        let sheet = parse_stylesheet("Label { color: red !important; }");
        assert_eq!(sheet.rules[0].declarations[0].value, "red");
    }

    #[test]
    fn malformed_rule_is_skipped_not_fatal() {
        let sheet = parse_stylesheet("{ color: red } Label { color: green }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].prelude, "Label");
        assert_eq!(sheet.errors.len(), 1);
        assert_eq!(sheet.errors[0].kind, StyleParseErrorKind::InvalidRule);
    }

    #[test]
    fn empty_declaration_value_is_reported() {
        let sheet = parse_stylesheet("Label { color: ; opacity: 0.5 }");
        assert_eq!(sheet.rules[0].declarations.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].name, "opacity");
        assert_eq!(sheet.errors.len(), 1);
        assert_eq!(sheet.errors[0].kind, StyleParseErrorKind::InvalidDeclaration);
    }

    #[test]
    fn unsupported_at_rule_is_reported() {
        let sheet = parse_stylesheet("@media screen { Label { color: red } } Page { color: blue }");
        assert_eq!(sheet.rules.len(), 1);
        assert!(matches!(
            &sheet.errors[0].kind,
            StyleParseErrorKind::UnsupportedAtRule(name) if name == "media"
        ));
    }

    #[test]
    fn rule_line_numbers_are_one_based() {
        let sheet = parse_stylesheet("\n\nLabel { color: red }");
        assert_eq!(sheet.rules[0].line, 3);
    }
}
