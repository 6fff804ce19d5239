//! Ordering of matched style rules.
//!
//! Every matched rule is ranked by `(specificity, source_order)`. Rules are
//! applied lowest first, so for each property the highest ranked rule wins.

#![forbid(unsafe_code)]

use core::cmp::Ordering;
use css_selectors::Specificity;

/// Priority tuple used to order matched rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CascadePriority {
    pub specificity: Specificity,
    /// Position across all sources of a scope, increasing with appearance.
    pub source_order: u32,
}

impl CascadePriority {
    #[inline]
    pub const fn new(specificity: Specificity, source_order: u32) -> Self {
        Self {
            specificity,
            source_order,
        }
    }
}

/// Return `Ordering::Greater` if `left` should win over `right`.
pub fn compare_priority(left: &CascadePriority, right: &CascadePriority) -> Ordering {
    left.specificity
        .cmp(&right.specificity)
        .then_with(|| left.source_order.cmp(&right.source_order))
}

/// Sort items in application order, the winning item last.
pub fn sort_by_priority<T>(items: &mut [T], priority: impl Fn(&T) -> CascadePriority) {
    items.sort_by(|left, right| compare_priority(&priority(left), &priority(right)));
}
