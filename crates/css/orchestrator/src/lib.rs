//! Style scopes: the rule sets owned by subtree roots of a UI tree.
//!
//! A [`StyleScope`] accumulates stylesheet sources, validates their selectors,
//! and answers "which rules match this node" in cascade order. Every mutation
//! attempt bumps the scope's version so consumers can tell whether their last
//! cascade pass is still current.

mod rule_index;
mod scope;

pub use css_syntax::{Declaration, KeyframeAnimationInfo, StyleParseError, StyleParseErrorKind};
pub use rule_index::{RightmostKey, RuleEntry};
pub use scope::{AddCssReport, StyleScope};
