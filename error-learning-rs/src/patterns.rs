//! # Pattern Aggregate Store
//!
//! One aggregate per distinct pattern key, kept in registration order so
//! that identifiers are stable and the knowledge-base export is
//! deterministic.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::matcher::PatternKey;
use crate::types::ErrorPattern;

/// Result of resolving a report against the current pattern set.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub pattern_id: String,
    /// True if no pattern with this key existed before the call.
    pub is_new: bool,
}

/// Registration-ordered pattern aggregates with a key index for matching.
#[derive(Debug, Default)]
pub struct PatternStore {
    patterns: Vec<ErrorPattern>,
    index: HashMap<PatternKey, usize>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// All patterns, in registration order.
    pub fn all(&self) -> &[ErrorPattern] {
        &self.patterns
    }

    pub fn get(&self, pattern_id: &str) -> Option<&ErrorPattern> {
        self.patterns.iter().find(|p| p.id == pattern_id)
    }

    pub fn get_mut(&mut self, pattern_id: &str) -> Option<&mut ErrorPattern> {
        self.patterns.iter_mut().find(|p| p.id == pattern_id)
    }

    /// Finds the pattern for `key`, creating it at frequency 0 when absent.
    /// Identifiers are `pattern_<ordinal>` and assigned exactly once; the
    /// same key always resolves to the same identifier for the lifetime of
    /// the store.
    pub fn resolve_or_create(
        &mut self,
        key: PatternKey,
        description: String,
        first_seen: DateTime<Utc>,
    ) -> PatternMatch {
        if let Some(&idx) = self.index.get(&key) {
            return PatternMatch {
                pattern_id: self.patterns[idx].id.clone(),
                is_new: false,
            };
        }

        let pattern_id = format!("pattern_{}", self.patterns.len() + 1);
        let pattern = ErrorPattern::new(pattern_id.clone(), description, first_seen);
        self.index.insert(key, self.patterns.len());
        self.patterns.push(pattern);

        PatternMatch {
            pattern_id,
            is_new: true,
        }
    }

    /// Increments the pattern's frequency and refreshes its last-seen
    /// timestamp, returning the updated frequency so the caller can freeze
    /// it into the ledger entry and feed the escalation policy. Unknown
    /// identifiers return 0 and change nothing.
    pub fn record_occurrence(&mut self, pattern_id: &str, at: DateTime<Utc>) -> u64 {
        match self.get_mut(pattern_id) {
            Some(pattern) => {
                pattern.frequency += 1;
                pattern.last_seen = at;
                pattern.frequency
            }
            None => {
                tracing::debug!(%pattern_id, "record_occurrence for unknown pattern; ignoring");
                0
            }
        }
    }

    /// Appends a solution description and prevention steps to the pattern's
    /// accumulated lists. Never replaces or deduplicates: the knowledge base
    /// shows history, not a single canonical answer. Unknown identifiers are
    /// ignored.
    pub fn attach_solution(
        &mut self,
        pattern_id: &str,
        description: &str,
        prevention_steps: &[String],
    ) {
        match self.get_mut(pattern_id) {
            Some(pattern) => {
                pattern.solutions.push(description.to_string());
                pattern
                    .prevention_rules
                    .extend(prevention_steps.iter().cloned());
            }
            None => {
                tracing::debug!(%pattern_id, "attach_solution for unknown pattern; ignoring");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCategory;

    fn key(message: &str) -> PatternKey {
        PatternKey::derive(&ErrorCategory::Api, message, 50)
    }

    #[test]
    fn test_resolve_creates_then_reuses() {
        let mut store = PatternStore::new();
        let now = Utc::now();

        let first = store.resolve_or_create(key("timeout"), "API: timeout".to_string(), now);
        assert!(first.is_new);
        assert_eq!(first.pattern_id, "pattern_1");

        let second = store.resolve_or_create(key("timeout"), "API: timeout".to_string(), now);
        assert!(!second.is_new);
        assert_eq!(second.pattern_id, "pattern_1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ordinal_ids_follow_registration_order() {
        let mut store = PatternStore::new();
        let now = Utc::now();

        store.resolve_or_create(key("a"), "API: a".to_string(), now);
        store.resolve_or_create(key("b"), "API: b".to_string(), now);
        let third = store.resolve_or_create(key("c"), "API: c".to_string(), now);

        assert_eq!(third.pattern_id, "pattern_3");
        assert_eq!(store.all()[2].id, "pattern_3");
    }

    #[test]
    fn test_record_occurrence_returns_updated_frequency() {
        let mut store = PatternStore::new();
        let now = Utc::now();
        let matched = store.resolve_or_create(key("a"), "API: a".to_string(), now);

        assert_eq!(store.record_occurrence(&matched.pattern_id, now), 1);
        assert_eq!(store.record_occurrence(&matched.pattern_id, now), 2);

        let pattern = store.get(&matched.pattern_id).unwrap();
        assert_eq!(pattern.frequency, 2);
    }

    #[test]
    fn test_record_occurrence_unknown_id_is_ignored() {
        let mut store = PatternStore::new();
        assert_eq!(store.record_occurrence("pattern_99", Utc::now()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_attach_solution_accumulates_without_dedup() {
        let mut store = PatternStore::new();
        let now = Utc::now();
        let matched = store.resolve_or_create(key("a"), "API: a".to_string(), now);

        let steps = vec!["add retry".to_string()];
        store.attach_solution(&matched.pattern_id, "fixed it", &steps);
        store.attach_solution(&matched.pattern_id, "fixed it", &steps);

        let pattern = store.get(&matched.pattern_id).unwrap();
        assert_eq!(pattern.solutions, vec!["fixed it", "fixed it"]);
        assert_eq!(pattern.prevention_rules.len(), 2);
    }
}
