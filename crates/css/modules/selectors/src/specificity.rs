//! Selector specificity.

use crate::{ComplexSelector, CompoundSelector, SimpleSelector};
use core::ops::Add;

/// Specificity as (ids, classes and attributes, types).
///
/// Ordering is lexicographic, so `Specificity(1, 0, 0)` beats any number of classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16);

impl Add for Specificity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(
            self.0.saturating_add(rhs.0),
            self.1.saturating_add(rhs.1),
            self.2.saturating_add(rhs.2),
        )
    }
}

pub fn specificity_of_compound(compound: &CompoundSelector) -> Specificity {
    compound
        .simples
        .iter()
        .fold(Specificity::default(), |acc, simple| {
            acc + match simple {
                SimpleSelector::IdSelector(_) => Specificity(1, 0, 0),
                SimpleSelector::Class(_)
                | SimpleSelector::AttrEquals { .. }
                | SimpleSelector::AttrExists(_) => Specificity(0, 1, 0),
                SimpleSelector::Type(_) => Specificity(0, 0, 1),
                SimpleSelector::Universal => Specificity::default(),
            }
        })
}

/// Sum over every compound of the selector.
pub fn specificity_of_complex(sel: &ComplexSelector) -> Specificity {
    sel.rest
        .iter()
        .fold(specificity_of_compound(&sel.first), |acc, pair| {
            acc + specificity_of_compound(&pair.1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::try_parse_selector_list;

    fn of(text: &str) -> Specificity {
        specificity_of_complex(&try_parse_selector_list(text).unwrap().selectors[0])
    }

    #[test]
    fn counts_each_category() {
        assert_eq!(of("*"), Specificity(0, 0, 0));
        assert_eq!(of("Label"), Specificity(0, 0, 1));
        assert_eq!(of("Page Label.title[visible]"), Specificity(0, 2, 2));
        assert_eq!(of("#main > .a"), Specificity(1, 1, 0));
    }

    #[test]
    fn id_outranks_many_classes() {
        assert!(of("#x") > of(".a.b.c.d.e.f"));
    }
}
