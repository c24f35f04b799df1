//! # Pattern Matcher
//!
//! Derives the similarity key that groups error entries into patterns.
//!
//! Matching is **prefix-based, not full-text**: two errors of the same
//! category whose messages share the same first N characters are the same
//! pattern even if they diverge afterward, and two errors that differ only
//! after position N are indistinguishable. This is approximate
//! deduplication, a deliberate low-precision/low-cost heuristic — not
//! exact-error identity. N defaults to [`DEFAULT_MESSAGE_PREFIX_LEN`] and is
//! tunable through the engine configuration, since it directly determines
//! the dedup precision/recall trade-off.

use std::fmt;

use crate::types::ErrorCategory;

/// Default number of message characters contributing to the pattern key.
pub const DEFAULT_MESSAGE_PREFIX_LEN: usize = 50;

/// Similarity key: category code plus the truncated message prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternKey(String);

impl PatternKey {
    /// Derives the key for a report. Truncation is character-based, so
    /// multi-byte text never splits a code point.
    pub fn derive(category: &ErrorCategory, message: &str, prefix_len: usize) -> Self {
        Self(format!(
            "{}:{}",
            category,
            message_prefix(message, prefix_len)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first `prefix_len` characters of a message, as used both in the
/// pattern key and in the pattern's display description.
pub fn message_prefix(message: &str, prefix_len: usize) -> String {
    message.chars().take(prefix_len).collect()
}
