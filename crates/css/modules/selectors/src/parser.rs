//! Selector tokenizer and parser.

use crate::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use core::fmt;
use core::mem::take;

/// Why a selector could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorParseError {
    /// The selector (or one entry of a list) is empty.
    Empty,
    /// `.`, `#` or `[` not followed by an identifier.
    MissingIdent { at: usize },
    /// A byte that starts no supported selector, for example `:` or `@`.
    Unsupported { at: usize, found: char },
    /// Two combinators in a row, or a combinator at either end.
    DanglingCombinator { at: usize },
    /// `[` without a matching `]`.
    UnterminatedAttribute { at: usize },
}

impl fmt::Display for SelectorParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("empty selector"),
            Self::MissingIdent { at } => write!(formatter, "expected identifier at {at}"),
            Self::Unsupported { at, found } => {
                write!(formatter, "unsupported `{found}` at {at}")
            }
            Self::DanglingCombinator { at } => write!(formatter, "dangling combinator at {at}"),
            Self::UnterminatedAttribute { at } => {
                write!(formatter, "unterminated attribute selector at {at}")
            }
        }
    }
}

impl std::error::Error for SelectorParseError {}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Tok {
    Combinator(Combinator),
    /// Whitespace; a descendant combinator when it separates two compounds.
    Whitespace,
    Simple(SimpleSelector),
}

struct SelectorTokenizer<'src> {
    bytes: &'src [u8],
    index: usize,
}

impl<'src> SelectorTokenizer<'src> {
    fn new(input: &'src str) -> Self {
        Self {
            bytes: input.as_bytes(),
            index: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    fn next_token(&mut self) -> Option<Result<Tok, SelectorParseError>> {
        let current = self.peek()?;
        if current.is_ascii_whitespace() {
            while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
                self.bump();
            }
            return Some(Ok(Tok::Whitespace));
        }
        let token = match current {
            b'*' => {
                self.bump();
                Ok(Tok::Simple(SimpleSelector::Universal))
            }
            b'>' => {
                self.bump();
                Ok(Tok::Combinator(Combinator::Child))
            }
            b'+' => {
                self.bump();
                Ok(Tok::Combinator(Combinator::AdjacentSibling))
            }
            b'~' => {
                self.bump();
                Ok(Tok::Combinator(Combinator::GeneralSibling))
            }
            b'.' => {
                self.bump();
                self.expect_ident()
                    .map(|ident| Tok::Simple(SimpleSelector::Class(ident)))
            }
            b'#' => {
                self.bump();
                self.expect_ident()
                    .map(|ident| Tok::Simple(SimpleSelector::IdSelector(ident)))
            }
            b'[' => self.consume_attr().map(Tok::Simple),
            byte if is_ident_byte(byte) => {
                let ident = self.consume_ident().to_ascii_lowercase();
                Ok(Tok::Simple(SimpleSelector::Type(ident)))
            }
            other => Err(SelectorParseError::Unsupported {
                at: self.index,
                found: char::from(other),
            }),
        };
        Some(token)
    }

    fn consume_ident(&mut self) -> String {
        let start = self.index;
        while self.peek().is_some_and(is_ident_byte) {
            self.bump();
        }
        let slice = self.bytes.get(start..self.index).unwrap_or(&[]);
        String::from_utf8_lossy(slice).into_owned()
    }

    fn expect_ident(&mut self) -> Result<String, SelectorParseError> {
        let at = self.index;
        let ident = self.consume_ident();
        if ident.is_empty() {
            return Err(SelectorParseError::MissingIdent { at });
        }
        Ok(ident)
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
    }

    /// `[name]`, `[name=value]`, `[name="value"]`, `[name='value']`.
    fn consume_attr(&mut self) -> Result<SimpleSelector, SelectorParseError> {
        let open = self.index;
        self.bump();
        self.skip_spaces();
        let name = self.expect_ident()?;
        self.skip_spaces();
        let selector = if self.peek() == Some(b'=') {
            self.bump();
            self.skip_spaces();
            let value = match self.peek() {
                Some(quote @ (b'"' | b'\'')) => {
                    self.bump();
                    self.consume_until(quote)
                        .ok_or(SelectorParseError::UnterminatedAttribute { at: open })?
                }
                _ => self.consume_unquoted(),
            };
            SimpleSelector::AttrEquals { name, value }
        } else {
            SimpleSelector::AttrExists(name)
        };
        self.skip_spaces();
        if self.peek() != Some(b']') {
            return Err(SelectorParseError::UnterminatedAttribute { at: open });
        }
        self.bump();
        Ok(selector)
    }

    fn consume_unquoted(&mut self) -> String {
        let start = self.index;
        while self
            .peek()
            .is_some_and(|byte| !byte.is_ascii_whitespace() && byte != b']')
        {
            self.bump();
        }
        let slice = self.bytes.get(start..self.index).unwrap_or(&[]);
        String::from_utf8_lossy(slice).into_owned()
    }

    /// Consume up to the closing `quote`, which is consumed too.
    fn consume_until(&mut self, quote: u8) -> Option<String> {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte != quote) {
            self.bump();
        }
        let slice = self.bytes.get(start..self.index)?;
        let value = String::from_utf8_lossy(slice).into_owned();
        self.peek()?;
        self.bump();
        Some(value)
    }
}

const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80
}

/// Parse one complex selector.
fn parse_complex(input: &str) -> Result<ComplexSelector, SelectorParseError> {
    let mut tokens = SelectorTokenizer::new(input.trim());
    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut current = CompoundSelector::default();
    let mut pending: Option<Combinator> = None;

    while let Some(token) = tokens.next_token() {
        match token? {
            Tok::Simple(simple) => {
                if let Some(combinator) = pending.take() {
                    compounds.push(take(&mut current));
                    combinators.push(combinator);
                }
                current.simples.push(simple);
            }
            Tok::Whitespace => {
                if !current.simples.is_empty() && pending.is_none() {
                    pending = Some(Combinator::Descendant);
                }
            }
            Tok::Combinator(combinator) => {
                let explicit_pending = matches!(pending, Some(existing) if existing != Combinator::Descendant);
                if current.simples.is_empty() || explicit_pending {
                    return Err(SelectorParseError::DanglingCombinator { at: tokens.index });
                }
                pending = Some(combinator);
            }
        }
    }

    if current.simples.is_empty() {
        return Err(if compounds.is_empty() {
            SelectorParseError::Empty
        } else {
            SelectorParseError::DanglingCombinator { at: tokens.index }
        });
    }
    if matches!(pending, Some(combinator) if combinator != Combinator::Descendant) {
        return Err(SelectorParseError::DanglingCombinator { at: tokens.index });
    }
    compounds.push(current);

    let mut compounds = compounds.into_iter();
    let first = compounds.next().unwrap_or_default();
    let rest = combinators.into_iter().zip(compounds).collect();
    Ok(ComplexSelector { first, rest })
}

/// Parse a comma separated selector list, rejecting the whole list if any entry is invalid.
///
/// # Errors
/// Returns the first entry's [`SelectorParseError`].
pub fn try_parse_selector_list(input: &str) -> Result<SelectorList, SelectorParseError> {
    let selectors = input
        .split(',')
        .map(parse_complex)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SelectorList { selectors })
}

/// Permissive variant of [`try_parse_selector_list`] that drops invalid entries.
pub fn parse_selector_list(input: &str) -> SelectorList {
    SelectorList {
        selectors: input
            .split(',')
            .filter_map(|part| parse_complex(part).ok())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_selectors_are_lowercased_classes_are_not() {
        let list = try_parse_selector_list("Button.Primary").unwrap();
        assert_eq!(
            list.selectors[0].first.simples,
            vec![
                SimpleSelector::Type("button".into()),
                SimpleSelector::Class("Primary".into())
            ]
        );
    }

    #[test]
    fn combinators_and_whitespace() {
        let sel = parse_complex("Page > StackLayout  Label + .x").unwrap();
        let combinators: Vec<_> = sel.rest.iter().map(|pair| pair.0).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Child,
                Combinator::Descendant,
                Combinator::AdjacentSibling
            ]
        );
        assert_eq!(sel.subject().simples, vec![SimpleSelector::Class("x".into())]);
    }

    #[test]
    fn attribute_forms() {
        let sel = parse_complex("[visible] [text='a b']").unwrap();
        assert_eq!(sel.first.simples, vec![SimpleSelector::AttrExists("visible".into())]);
        assert_eq!(
            sel.rest[0].1.simples,
            vec![SimpleSelector::AttrEquals {
                name: "text".into(),
                value: "a b".into()
            }]
        );
    }

    #[test]
    fn rejects_unsupported_and_malformed() {
        assert!(matches!(
            try_parse_selector_list("Button:highlighted"),
            Err(SelectorParseError::Unsupported { found: ':', .. })
        ));
        assert_eq!(try_parse_selector_list("Label,"), Err(SelectorParseError::Empty));
        assert!(matches!(
            try_parse_selector_list("> Label"),
            Err(SelectorParseError::DanglingCombinator { .. })
        ));
        assert!(matches!(
            try_parse_selector_list("Label >"),
            Err(SelectorParseError::DanglingCombinator { .. })
        ));
        assert!(matches!(
            try_parse_selector_list("[name"),
            Err(SelectorParseError::UnterminatedAttribute { .. })
        ));
        assert!(matches!(
            try_parse_selector_list(". x"),
            Err(SelectorParseError::MissingIdent { .. })
        ));
    }

    #[test]
    fn permissive_list_keeps_valid_entries() {
        let list = parse_selector_list("Label, :root, .a");
        assert_eq!(list.selectors.len(), 2);
    }
}
