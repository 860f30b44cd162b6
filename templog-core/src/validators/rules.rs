//! Declarative field rules
//!
//! A `RuleSet` is a lookup table from field to pattern. Adding a validated
//! field means adding an entry, not writing a check.

use std::collections::BTreeMap;

use regex::Regex;

use super::utils;
use crate::measurement::FieldId;

/// Pattern a field's rendered value must prefix-match
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: FieldId,
    pattern: String,
    regex: Regex,
}

impl FieldRule {
    /// Compile a rule for `field`
    pub fn new(field: FieldId, pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let regex = utils::compile_prefix(&pattern)?;

        Ok(Self {
            field,
            pattern,
            regex,
        })
    }

    /// Field the rule applies to
    pub fn field(&self) -> FieldId {
        self.field
    }

    /// Pattern text as declared
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether `value` satisfies this rule
    pub fn matches(&self, value: &str) -> bool {
        utils::prefix_match(&self.regex, value)
    }
}

/// Rules keyed by field, iterated in field declaration order
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<FieldId, FieldRule>,
}

impl RuleSet {
    /// Table with no rules; every record passes
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any existing rule for the same field
    pub fn insert(&mut self, rule: FieldRule) -> Option<FieldRule> {
        self.rules.insert(rule.field, rule)
    }

    /// Builder-style `insert`
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.insert(rule);
        self
    }

    /// Rule for `field`, if any
    pub fn get(&self, field: FieldId) -> Option<&FieldRule> {
        self.rules.get(&field)
    }

    /// Rules in declaration order of their fields
    pub fn iter(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.values()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<FieldRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = FieldRule>>(iter: I) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}
