//! Rule matching and the transformation chain.
//!
//! A chain is an ordered list of rules. For a given file the first rule whose
//! exclusion does not match and whose pattern does match selects the handler
//! pipeline; later rules are never consulted. Rules carry an explicit
//! `priority` (higher first). Rules with equal priority keep their declared
//! order, so a chain without priorities behaves exactly like the list.

use std::path::Path;

use regex_automata::Input;
use regex_automata::dfa::{Automaton, StartKind, dense};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Options passed verbatim to a handler.
pub type HandlerOptions = Map<String, Value>;

/// Path predicate compiled to a DFA.
///
/// Matched against the forward-slash form of the path, unanchored: use `$`
/// to pin an extension to the end of the path.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    dfa: dense::DFA<Vec<u32>>,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        let dfa = dense::DFA::builder()
            .configure(dense::DFA::config().start_kind(StartKind::Unanchored))
            .build(source)
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: source.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            source: source.to_owned(),
            dfa,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.dfa
            .try_search_fwd(&Input::new(path))
            .ok()
            .flatten()
            .is_some()
    }
}

/// One step of a rule's handler pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct HandlerUse {
    pub name: String,
    pub options: HandlerOptions,
}

impl HandlerUse {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: HandlerOptions::new(),
        }
    }

    pub fn with_options(name: impl Into<String>, options: HandlerOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub test: Pattern,
    pub exclude: Option<Pattern>,
    pub handlers: Vec<HandlerUse>,
    pub priority: i32,
}

impl Rule {
    pub fn new(test: Pattern) -> Self {
        Self {
            test,
            exclude: None,
            handlers: Vec::new(),
            priority: 0,
        }
    }

    pub fn exclude(mut self, pattern: Pattern) -> Self {
        self.exclude = Some(pattern);
        self
    }

    pub fn handler(mut self, handler: HandlerUse) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Exclusion is checked first: an excluded path never matches.
    pub fn matches(&self, path: &str) -> bool {
        if self.exclude.as_ref().is_some_and(|ex| ex.is_match(path)) {
            return false;
        }
        self.test.is_match(path)
    }
}

/// Ordered rule table with first-match-wins semantics.
#[derive(Clone, Debug, Default)]
pub struct TransformationChain {
    /// Rules in effective order, each paired with its declared index.
    rules: Vec<(usize, Rule)>,
}

impl TransformationChain {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut rules: Vec<_> = rules.into_iter().enumerate().collect();
        // Stable: equal priorities keep declared order.
        rules.sort_by_key(|(_, rule)| std::cmp::Reverse(rule.priority));
        Self { rules }
    }

    /// Handler pipeline for `path`, in application order.
    ///
    /// Empty when no rule matches; such files pass through unmodified.
    pub fn resolve_handlers(&self, path: &Path) -> &[HandlerUse] {
        self.matching_rule(path)
            .map(|(_, rule)| rule.handlers.as_slice())
            .unwrap_or(&[])
    }

    /// The winning rule and its declared index.
    pub fn matching_rule(&self, path: &Path) -> Option<(usize, &Rule)> {
        let path = normalize_separators(path);
        self.rules
            .iter()
            .find(|(_, rule)| rule.matches(&path))
            .map(|(index, rule)| (*index, rule))
    }

    /// Check every handler name against `is_known` and reject empty rules.
    pub fn validate(&self, is_known: impl Fn(&str) -> bool) -> Result<()> {
        let mut rules: Vec<_> = self.rules.iter().collect();
        rules.sort_by_key(|(index, _)| *index);
        for (index, rule) in rules {
            if rule.handlers.is_empty() {
                return Err(ConfigError::EmptyRule(*index));
            }
            if let Some(unknown) = rule.handlers.iter().find(|h| !is_known(&h.name)) {
                return Err(ConfigError::UnknownHandler {
                    rule: *index,
                    name: unknown.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in effective order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|(_, rule)| rule)
    }
}

/// Forward-slash form of a path, used for pattern matching.
pub fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
