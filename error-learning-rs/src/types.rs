//! # Core Data Model
//!
//! This module defines the data types flowing through the error pattern
//! learning engine: the transient input report, the immutable ledger entry,
//! the mutable pattern aggregate, and the human-authored solution record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of an observed application error.
///
/// The known variants cover the category codes emitted by the instrumented
/// application. Arbitrary caller-supplied codes are preserved in `Other` so
/// that classification stays total: an unrecognized category degrades to
/// fallback text downstream instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Malformed source or markup
    Syntax,
    /// Missing or unresolved import/module
    Import,
    /// Configuration value missing or inconsistent
    Config,
    /// External API call failed or misbehaved
    Api,
    /// Unexpected data shape or content
    Data,
    /// Incorrect business logic or control flow
    Logic,
    /// Unhandled runtime condition
    Runtime,
    /// Request routed to a missing or mismatched handler
    Routing,
    /// Caller lacks a required permission
    Permission,
    /// Security policy violation
    Security,
    /// Any category code not in the fixed set (stored normalized uppercase)
    Other(String),
}

impl ErrorCategory {
    /// Parses a category code. Total and case-insensitive: codes outside the
    /// known set land in `Other` rather than failing.
    pub fn parse<S: AsRef<str>>(code: S) -> Self {
        match code.as_ref().trim().to_ascii_uppercase().as_str() {
            "SYNTAX" => ErrorCategory::Syntax,
            "IMPORT" => ErrorCategory::Import,
            "CONFIG" => ErrorCategory::Config,
            "API" => ErrorCategory::Api,
            "DATA" => ErrorCategory::Data,
            "LOGIC" => ErrorCategory::Logic,
            "RUNTIME" => ErrorCategory::Runtime,
            "ROUTING" => ErrorCategory::Routing,
            "PERMISSION" => ErrorCategory::Permission,
            "SECURITY" => ErrorCategory::Security,
            other => ErrorCategory::Other(other.to_string()),
        }
    }
}

impl From<&str> for ErrorCategory {
    fn from(code: &str) -> Self {
        ErrorCategory::parse(code)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "SYNTAX"),
            ErrorCategory::Import => write!(f, "IMPORT"),
            ErrorCategory::Config => write!(f, "CONFIG"),
            ErrorCategory::Api => write!(f, "API"),
            ErrorCategory::Data => write!(f, "DATA"),
            ErrorCategory::Logic => write!(f, "LOGIC"),
            ErrorCategory::Runtime => write!(f, "RUNTIME"),
            ErrorCategory::Routing => write!(f, "ROUTING"),
            ErrorCategory::Permission => write!(f, "PERMISSION"),
            ErrorCategory::Security => write!(f, "SECURITY"),
            ErrorCategory::Other(code) => write!(f, "{}", code),
        }
    }
}

/// A single raw observation of a failure, as submitted by the instrumented
/// application. Transient: it exists only for the duration of the ingestion
/// call and is always converted into an [`ErrorEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Category code of the error
    pub category: ErrorCategory,
    /// Free-text error message
    pub message: String,
    /// File (or other source identifier) where the error surfaced
    pub affected_file: String,
    /// Optional line number within the affected file
    pub line_number: Option<u32>,
    /// Free-text description of the surrounding operation
    pub context: String,
    /// Optional stack trace text
    pub stack_trace: Option<String>,
}

impl ErrorReport {
    /// Creates a report with the required fields; the rest default to empty.
    pub fn new<S: Into<String>>(category: ErrorCategory, message: S) -> Self {
        Self {
            category,
            message: message.into(),
            affected_file: String::new(),
            line_number: None,
            context: String::new(),
            stack_trace: None,
        }
    }

    /// Sets the affected file
    pub fn file<S: Into<String>>(mut self, file: S) -> Self {
        self.affected_file = file.into();
        self
    }

    /// Sets the line number
    pub fn line(mut self, line: u32) -> Self {
        self.line_number = Some(line);
        self
    }

    /// Sets the operation context text
    pub fn context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = context.into();
        self
    }

    /// Attaches a stack trace
    pub fn stack_trace<S: Into<String>>(mut self, trace: S) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }
}

/// Human-authored remediation attached to a ledger entry after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// What was done to resolve the error
    pub description: String,
    /// Notes on the concrete code changes made
    pub code_changes: Vec<String>,
    /// How the fix was verified
    pub verification: String,
    /// Steps that prevent this class of error from recurring
    pub prevention_steps: Vec<String>,
    /// When the solution was documented
    pub documented_at: DateTime<Utc>,
}

impl Solution {
    /// Creates a solution with a description and verification note.
    pub fn new<S: Into<String>, V: Into<String>>(description: S, verification: V) -> Self {
        Self {
            description: description.into(),
            code_changes: Vec::new(),
            verification: verification.into(),
            prevention_steps: Vec::new(),
            documented_at: Utc::now(),
        }
    }

    /// Adds a code-change note
    pub fn code_change<S: Into<String>>(mut self, note: S) -> Self {
        self.code_changes.push(note.into());
        self
    }

    /// Adds a prevention step
    pub fn prevention_step<S: Into<String>>(mut self, step: S) -> Self {
        self.prevention_steps.push(step.into());
        self
    }
}

/// The enriched, immutable ledger record derived from one [`ErrorReport`].
///
/// Entries are append-only: once written, only the `solution` field may be
/// populated (exactly once) via the engine's solution-documentation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Unique, human-readable identifier (timestamp + category + message
    /// prefix + monotonic sequence suffix)
    pub id: String,
    /// When the error was ingested
    pub timestamp: DateTime<Utc>,
    /// Error category
    pub category: ErrorCategory,
    /// The full, untruncated message as reported
    pub original_message: String,
    /// File where the error surfaced
    pub affected_file: String,
    /// Optional line number
    pub line_number: Option<u32>,
    /// Free-text operation context
    pub context: String,
    /// Derived cause text (classifier output)
    pub cause_analysis: String,
    /// Derived trigger label (classifier output)
    pub trigger: String,
    /// True if a matching pattern existed before this entry was appended
    pub is_recurring: bool,
    /// The owning pattern's frequency at the moment this entry was appended.
    /// Frozen per entry; never recomputed later.
    pub occurrence_count: u64,
    /// Timestamps of the most recent prior entries with exactly matching
    /// category and message (newest first, at most 5). Stricter than pattern
    /// matching, so it may under-report when message text varies slightly.
    pub last_occurrences: Vec<DateTime<Utc>>,
    /// Identifier of the pattern this entry matched
    pub pattern_id: String,
    /// Remediation documented after the fact, if any
    pub solution: Option<Solution>,
}

/// The aggregate identity shared by all entries whose category and message
/// prefix match; the unit of deduplication and escalation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPattern {
    /// Stable identifier, assigned exactly once at first occurrence
    pub id: String,
    /// Display description: category plus truncated message
    pub description: String,
    /// Count of ledger entries matched to this pattern (monotone)
    pub frequency: u64,
    /// Timestamp of the most recent matching entry
    pub last_seen: DateTime<Utc>,
    /// Accumulated solution descriptions, in order of attachment
    pub solutions: Vec<String>,
    /// Accumulated prevention rules, in order of attachment
    pub prevention_rules: Vec<String>,
    /// Monotone flag: once true, never reset
    pub auto_fix_available: bool,
}

impl ErrorPattern {
    /// Creates a fresh pattern at frequency 0. The first occurrence is
    /// counted immediately afterwards by the aggregate store.
    pub fn new<I: Into<String>, D: Into<String>>(
        id: I,
        description: D,
        first_seen: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            frequency: 0,
            last_seen: first_seen,
            solutions: Vec::new(),
            prevention_rules: Vec::new(),
            auto_fix_available: false,
        }
    }
}
