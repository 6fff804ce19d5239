use crate::rule_index::{CompiledRules, RuleEntry, ScopedRule};
use anyhow::{Context as _, Result};
use css_cascade::sort_by_priority;
use css_selectors::{ElementAdapter, matches_complex, try_parse_selector_list};
use css_syntax::{KeyframeAnimationInfo, StyleParseError, StyleParseErrorKind, parse_stylesheet};
use log::{debug, trace, warn};
use once_cell::unsync::OnceCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// One stylesheet text added to a scope.
#[derive(Debug)]
struct CssSource {
    id: Option<String>,
    text: String,
    rules: Vec<ScopedRule>,
    keyframes: Vec<KeyframeAnimationInfo>,
}

/// Outcome of [`StyleScope::add_css`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddCssReport {
    /// Scope version after the call.
    pub version: u64,
    /// Number of rules kept from the text.
    pub rules_added: usize,
    /// Items that were skipped, in source order.
    pub errors: Vec<StyleParseError>,
}

/// Ordered stylesheet sources plus a lazily compiled rule index.
#[derive(Debug, Default)]
pub struct StyleScope {
    sources: Vec<CssSource>,
    version: u64,
    compiled: OnceCell<CompiledRules>,
}

impl StyleScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter, bumped by every mutation attempt.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Parse `text` and append its rules, or replace the rules of the source
    /// registered under `source_id`.
    ///
    /// Malformed rules and rules whose selector is not supported are skipped
    /// and reported; the rest of the text still applies. The version is bumped
    /// even when nothing could be kept.
    pub fn add_css(&mut self, text: &str, source_id: Option<&str>) -> AddCssReport {
        let parsed = parse_stylesheet(text);
        let mut errors = parsed.errors;
        let mut rules = Vec::with_capacity(parsed.rules.len());
        for rule in parsed.rules {
            match try_parse_selector_list(&rule.prelude) {
                Ok(selectors) => rules.push(ScopedRule {
                    selectors,
                    declarations: Rc::from(rule.declarations),
                    line: rule.line,
                }),
                Err(err) => errors.push(StyleParseError {
                    line: rule.line,
                    column: 1,
                    kind: StyleParseErrorKind::InvalidSelector(err.to_string()),
                    source_text: rule.prelude,
                }),
            }
        }
        errors.sort_by_key(|error| (error.line, error.column));
        for error in &errors {
            warn!(target: "style_scope", "skipped stylesheet item: {error}");
        }

        let rules_added = rules.len();
        let source = CssSource {
            id: source_id.map(ToOwned::to_owned),
            text: text.to_owned(),
            rules,
            keyframes: parsed.keyframes,
        };
        let existing = source_id.and_then(|id| {
            self.sources
                .iter()
                .position(|known| known.id.as_deref() == Some(id))
        });
        match existing.and_then(|index| self.sources.get_mut(index)) {
            Some(slot) => *slot = source,
            None => self.sources.push(source),
        }
        self.invalidate();
        trace!(
            target: "style_scope",
            "add_css: {rules_added} rules, {} errors, version {}",
            errors.len(),
            self.version
        );
        AddCssReport {
            version: self.version,
            rules_added,
            errors,
        }
    }

    /// Load a stylesheet file as its own source, keyed by its path.
    ///
    /// Returns `Ok(None)` when the file does not exist or is blank.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn add_css_file(&mut self, path: &Path) -> Result<Option<AddCssReport>> {
        if !path.is_file() {
            debug!(target: "style_scope", "css file {} not found, skipping", path.display());
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading stylesheet {}", path.display()))?;
        if text.trim().is_empty() {
            debug!(target: "style_scope", "css file {} is empty, skipping", path.display());
            return Ok(None);
        }
        let id = path.to_string_lossy();
        Ok(Some(self.add_css(&text, Some(&*id))))
    }

    /// Drop every source and start over from `text`.
    pub fn set_css(&mut self, text: &str) -> AddCssReport {
        self.sources.clear();
        self.add_css(text, None)
    }

    /// Remove the source registered under `source_id`. Returns false if unknown.
    pub fn remove_source(&mut self, source_id: &str) -> bool {
        let before = self.sources.len();
        self.sources
            .retain(|source| source.id.as_deref() != Some(source_id));
        let removed = self.sources.len() != before;
        if removed {
            self.invalidate();
        }
        removed
    }

    /// Accumulated stylesheet text of every source, in scope order.
    pub fn css(&self) -> String {
        self.sources
            .iter()
            .map(|source| source.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn rule_count(&self) -> usize {
        self.sources.iter().map(|source| source.rules.len()).sum()
    }

    /// Compile the rule index if needed and return the version it reflects.
    pub fn ensure_selectors(&self) -> u64 {
        let _compiled = self.compiled();
        self.version
    }

    /// Rules matching `element`, lowest priority first.
    ///
    /// Folding the declarations in the returned order leaves the winning value
    /// of each property last.
    pub fn matching_rules<A: ElementAdapter>(
        &self,
        adapter: &A,
        element: A::Handle,
    ) -> Vec<&RuleEntry> {
        let compiled = self.compiled();
        let mut candidates: Vec<usize> = compiled.universal.clone();
        if let Some(indices) = adapter
            .element_id(element)
            .and_then(|id| compiled.by_id.get(id))
        {
            candidates.extend_from_slice(indices);
        }
        let type_name = adapter.type_name(element).to_ascii_lowercase();
        if let Some(indices) = compiled.by_type.get(&type_name) {
            candidates.extend_from_slice(indices);
        }
        for (class, indices) in &compiled.by_class {
            if adapter.has_class(element, class) {
                candidates.extend_from_slice(indices);
            }
        }
        candidates.sort_unstable();
        candidates.dedup();

        let mut matched: Vec<&RuleEntry> = candidates
            .into_iter()
            .filter_map(|index| compiled.entries.get(index))
            .filter(|entry| matches_complex(adapter, element, &entry.selector))
            .collect();
        sort_by_priority(&mut matched, |entry| entry.priority);
        matched
    }

    /// Latest `@keyframes` definition with the given name.
    pub fn keyframe_animation(&self, name: &str) -> Option<&KeyframeAnimationInfo> {
        self.sources
            .iter()
            .rev()
            .flat_map(|source| source.keyframes.iter().rev())
            .find(|info| info.name == name)
    }

    fn compiled(&self) -> &CompiledRules {
        self.compiled.get_or_init(|| {
            let _span = tracing::info_span!("style_scope.compile").entered();
            let compiled =
                CompiledRules::compile(self.sources.iter().flat_map(|source| source.rules.iter()));
            debug!(
                target: "style_scope",
                "compiled {} rule entries at version {}",
                compiled.entries.len(),
                self.version
            );
            compiled
        })
    }

    fn invalidate(&mut self) {
        self.version += 1;
        drop(self.compiled.take());
    }
}
