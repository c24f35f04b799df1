//! # Error Ledger
//!
//! Append-only, time-ordered collection of enriched error entries. Source
//! of truth for statistics and recent-activity queries. Entries are never
//! deleted or reordered; only their solution field may be populated
//! post-hoc.
//!
//! Entry identifiers keep a human-readable
//! `<UTC-second-timestamp>_<category>_<sanitized-message-prefix>` prefix for
//! debuggability and append a process-monotonic sequence number so that two
//! identical errors arriving within the same second never collide.

use chrono::{DateTime, Utc};

use crate::types::{ErrorCategory, ErrorEntry};

/// Number of message characters carried into the entry identifier.
const ID_MESSAGE_PREFIX_LEN: usize = 20;

/// Append-only error entry ledger.
#[derive(Debug, Default)]
pub struct ErrorLedger {
    entries: Vec<ErrorEntry>,
    next_seq: u64,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in append order.
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Generates the identifier for the next entry and advances the
    /// sequence counter. Call once per appended entry.
    pub fn next_entry_id(
        &mut self,
        timestamp: DateTime<Utc>,
        category: &ErrorCategory,
        message: &str,
    ) -> String {
        self.next_seq += 1;
        format!(
            "{}_{}_{}_{}",
            timestamp.format("%Y%m%dT%H%M%SZ"),
            category,
            sanitize_message_prefix(message),
            self.next_seq
        )
    }

    pub fn append(&mut self, entry: ErrorEntry) {
        self.entries.push(entry);
    }

    pub fn find_mut(&mut self, entry_id: &str) -> Option<&mut ErrorEntry> {
        self.entries.iter_mut().find(|entry| entry.id == entry_id)
    }

    /// The newest `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ErrorEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Timestamps of prior entries with exactly matching category and
    /// message, newest first, at most `limit`. Intentionally stricter than
    /// pattern matching: slight message variations are not counted here.
    pub fn last_occurrences(
        &self,
        category: &ErrorCategory,
        message: &str,
        limit: usize,
    ) -> Vec<DateTime<Utc>> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| entry.category == *category && entry.original_message == message)
            .map(|entry| entry.timestamp)
            .take(limit)
            .collect()
    }
}

/// First 20 characters of the message, lowercased, with anything outside
/// `[a-z0-9]` folded to `_` so the identifier stays filesystem- and
/// log-friendly.
fn sanitize_message_prefix(message: &str) -> String {
    message
        .chars()
        .take(ID_MESSAGE_PREFIX_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
