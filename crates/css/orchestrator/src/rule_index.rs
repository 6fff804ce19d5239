//! Flattened, indexed view over every rule of a style scope.

use css_cascade::CascadePriority;
use css_selectors::{ComplexSelector, SelectorList, SimpleSelector, specificity_of_complex};
use css_syntax::Declaration;
use std::collections::HashMap;
use std::rc::Rc;

/// Bucket a rule entry is filed under, taken from its subject compound.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum RightmostKey {
    Id(String),
    Class(String),
    Type(String),
    Universal,
}

/// A validated rule as stored per source.
#[derive(Clone, Debug)]
pub(crate) struct ScopedRule {
    pub selectors: SelectorList,
    pub declarations: Rc<[Declaration]>,
    pub line: u32,
}

/// One selector of one rule.
#[derive(Clone, Debug)]
pub struct RuleEntry {
    pub selector: ComplexSelector,
    /// Shared between all selectors of the same rule.
    pub declarations: Rc<[Declaration]>,
    pub priority: CascadePriority,
    pub rightmost: RightmostKey,
    /// 1-based line of the rule in its source.
    pub line: u32,
}

#[derive(Debug, Default)]
pub(crate) struct CompiledRules {
    pub entries: Vec<RuleEntry>,
    pub by_id: HashMap<String, Vec<usize>>,
    pub by_class: HashMap<String, Vec<usize>>,
    pub by_type: HashMap<String, Vec<usize>>,
    pub universal: Vec<usize>,
}

impl CompiledRules {
    /// Flatten rules into one entry per selector. `rules` must be in scope order.
    pub fn compile<'rules>(rules: impl Iterator<Item = &'rules ScopedRule>) -> Self {
        let mut compiled = Self::default();
        for (order, rule) in rules.enumerate() {
            for selector in &rule.selectors.selectors {
                let index = compiled.entries.len();
                let rightmost = rightmost_key_for(selector);
                match &rightmost {
                    RightmostKey::Id(id) => compiled.by_id.entry(id.clone()).or_default().push(index),
                    RightmostKey::Class(class) => {
                        compiled.by_class.entry(class.clone()).or_default().push(index);
                    }
                    RightmostKey::Type(name) => {
                        compiled.by_type.entry(name.clone()).or_default().push(index);
                    }
                    RightmostKey::Universal => compiled.universal.push(index),
                }
                compiled.entries.push(RuleEntry {
                    selector: selector.clone(),
                    declarations: Rc::clone(&rule.declarations),
                    priority: CascadePriority::new(specificity_of_complex(selector), order as u32),
                    rightmost,
                    line: rule.line,
                });
            }
        }
        compiled
    }
}

/// Prefer id over class over type; universal when the subject has none of them.
fn rightmost_key_for(sel: &ComplexSelector) -> RightmostKey {
    let simples = &sel.subject().simples;
    let id = simples.iter().find_map(|simple| match simple {
        SimpleSelector::IdSelector(id) => Some(RightmostKey::Id(id.clone())),
        _ => None,
    });
    let class = || {
        simples.iter().find_map(|simple| match simple {
            SimpleSelector::Class(class) => Some(RightmostKey::Class(class.clone())),
            _ => None,
        })
    };
    let type_name = || {
        simples.iter().find_map(|simple| match simple {
            SimpleSelector::Type(name) => Some(RightmostKey::Type(name.clone())),
            _ => None,
        })
    };
    id.or_else(class)
        .or_else(type_name)
        .unwrap_or(RightmostKey::Universal)
}
