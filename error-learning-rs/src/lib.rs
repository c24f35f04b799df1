//! # Error Pattern Learning Engine
//!
//! A stateful, in-process subsystem that ingests discrete error reports,
//! classifies them into recurring patterns, escalates response policy as a
//! pattern repeats, and exposes an exportable knowledge base of causes,
//! fixes, and prevention rules.
//!
//! ## Features
//!
//! - Total cause/trigger classification with documented fallbacks
//! - Approximate, prefix-based pattern deduplication
//! - Append-only error ledger with collision-free readable identifiers
//! - Threshold-driven escalation (warn at 3, auto-fix eligible at 5) with
//!   exactly-once tooling generation
//! - Deterministic knowledge-base export and summary statistics
//!
//! The engine is an explicitly constructed instance owned by the hosting
//! service's composition root — there is no ambient global state, so tests
//! construct isolated engines freely. State is in-memory only and lives for
//! the lifetime of the process; integrators who need restart durability
//! must add their own write-through storage.
//!
//! This is a logging/analysis facility: it never panics or errors in
//! response to malformed input. Unrecognized categories degrade to fallback
//! text, and documenting a solution against an unknown entry id is a
//! tolerant no-op.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::instrument;

pub mod classifier;
pub mod escalation;
pub mod ledger;
pub mod matcher;
pub mod patterns;
pub mod profiles;
pub mod reporting;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use classifier::{Classification, HeuristicClassifier, ReportClassifier};
pub use escalation::{
    EscalationState, NotificationEvent, ToolingArtifact, ToolingKind, AUTO_FIX_THRESHOLD,
    WARN_THRESHOLD,
};
pub use matcher::{PatternKey, DEFAULT_MESSAGE_PREFIX_LEN};
pub use reporting::EngineStatistics;
pub use types::{ErrorCategory, ErrorEntry, ErrorPattern, ErrorReport, Solution};

use crate::escalation::EscalationOutcome;
use crate::ledger::ErrorLedger;
use crate::patterns::PatternStore;

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for this crate. Construction is the only fallible
/// operation; ingestion and queries are total by design.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Tunable knobs for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of message characters contributing to the pattern key.
    /// Directly determines dedup precision/recall.
    pub message_prefix_len: usize,
    /// Maximum entries returned in the statistics recent-errors list.
    pub recent_errors_limit: usize,
    /// Maximum prior timestamps carried on an entry's occurrence list.
    pub last_occurrences_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            message_prefix_len: DEFAULT_MESSAGE_PREFIX_LEN,
            recent_errors_limit: 10,
            last_occurrences_limit: 5,
        }
    }
}

impl EngineConfig {
    /// Construct configuration from environment variables.
    ///
    /// Forgiving and never panics: unset or unparsable variables keep their
    /// defaults.
    /// - ERROR_LEARNING_PREFIX_LEN
    /// - ERROR_LEARNING_RECENT_LIMIT
    /// - ERROR_LEARNING_OCCURRENCE_LIMIT
    pub fn from_env() -> Self {
        fn parse_usize_var(name: &str, default: usize) -> usize {
            std::env::var(name)
                .ok()
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            message_prefix_len: parse_usize_var(
                "ERROR_LEARNING_PREFIX_LEN",
                defaults.message_prefix_len,
            ),
            recent_errors_limit: parse_usize_var(
                "ERROR_LEARNING_RECENT_LIMIT",
                defaults.recent_errors_limit,
            ),
            last_occurrences_limit: parse_usize_var(
                "ERROR_LEARNING_OCCURRENCE_LIMIT",
                defaults.last_occurrences_limit,
            ),
        }
    }
}

/// Mutable engine state, guarded by a single lock so that
/// read-frequency/increment/compare-against-threshold is atomic per
/// ingestion. A race there could make a threshold crossing fire twice or
/// never.
#[derive(Debug, Default)]
struct EngineState {
    ledger: ErrorLedger,
    patterns: PatternStore,
    notifications: Vec<NotificationEvent>,
    tooling: Vec<ToolingArtifact>,
}

/// The error pattern learning engine.
///
/// Typical usage:
///
/// ```
/// use error_learning::{EngineConfig, ErrorCategory, ErrorPatternEngine, ErrorReport};
///
/// let engine = ErrorPatternEngine::new(EngineConfig::default()).unwrap();
///
/// let entry_id = engine.log_error(
///     ErrorReport::new(ErrorCategory::Api, "Connection timeout to payment gateway")
///         .file("billing/client.rs")
///         .context("API call to billing"),
/// );
/// assert!(!entry_id.is_empty());
/// ```
pub struct ErrorPatternEngine {
    cfg: EngineConfig,
    classifier: Arc<dyn ReportClassifier + Send + Sync>,
    state: RwLock<EngineState>,
}

impl ErrorPatternEngine {
    /// Construct an engine with the default heuristic classifier.
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        Self::with_classifier(cfg, Arc::new(HeuristicClassifier))
    }

    /// Construct an engine with an injected classifier implementation.
    pub fn with_classifier(
        cfg: EngineConfig,
        classifier: Arc<dyn ReportClassifier + Send + Sync>,
    ) -> Result<Self> {
        if cfg.message_prefix_len == 0 {
            return Err(EngineError::InvalidConfig(
                "message_prefix_len must be at least 1".to_string(),
            ));
        }
        if cfg.recent_errors_limit == 0 {
            return Err(EngineError::InvalidConfig(
                "recent_errors_limit must be at least 1".to_string(),
            ));
        }
        if cfg.last_occurrences_limit == 0 {
            return Err(EngineError::InvalidConfig(
                "last_occurrences_limit must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            cfg,
            classifier,
            state: RwLock::new(EngineState::default()),
        })
    }

    /// Ingest one error report and return the new ledger entry's id.
    ///
    /// Pipeline: classify, resolve or create the pattern, collect prior
    /// exact-match occurrences, record the occurrence, append the entry,
    /// then evaluate escalation on the updated frequency. All mutations
    /// happen under one write lock.
    #[instrument(
        name = "error_pattern_ingest",
        skip(self, report),
        fields(category = %report.category)
    )]
    pub fn log_error(&self, report: ErrorReport) -> String {
        let classification = self.classifier.classify(&report);
        let category = report.category.clone();
        let now = Utc::now();

        let mut state = self.write_state();

        let key = PatternKey::derive(&category, &report.message, self.cfg.message_prefix_len);
        let description = format!(
            "{}: {}",
            category,
            matcher::message_prefix(&report.message, self.cfg.message_prefix_len)
        );
        let resolved = state.patterns.resolve_or_create(key, description, now);

        let last_occurrences = state.ledger.last_occurrences(
            &category,
            &report.message,
            self.cfg.last_occurrences_limit,
        );
        let frequency = state.patterns.record_occurrence(&resolved.pattern_id, now);
        let entry_id = state.ledger.next_entry_id(now, &category, &report.message);

        state.ledger.append(ErrorEntry {
            id: entry_id.clone(),
            timestamp: now,
            category: category.clone(),
            original_message: report.message,
            affected_file: report.affected_file,
            line_number: report.line_number,
            context: report.context,
            cause_analysis: classification.cause_analysis,
            trigger: classification.trigger,
            is_recurring: !resolved.is_new,
            occurrence_count: frequency,
            last_occurrences,
            pattern_id: resolved.pattern_id.clone(),
            solution: None,
        });

        let outcome = match state.patterns.get_mut(&resolved.pattern_id) {
            Some(pattern) => escalation::evaluate(pattern, &category, frequency, now),
            None => EscalationOutcome::default(),
        };
        state.notifications.extend(outcome.notifications);
        state.tooling.extend(outcome.artifacts);

        metrics::increment_counter!(
            "error_learning_ingested_total",
            "category" => category.to_string()
        );
        metrics::gauge!(
            "error_learning_patterns_active",
            state.patterns.len() as f64
        );
        tracing::debug!(
            entry_id = %entry_id,
            pattern_id = %resolved.pattern_id,
            frequency,
            recurring = !resolved.is_new,
            "error ingested"
        );

        entry_id
    }

    /// Attach a human-authored solution to a ledger entry and its owning
    /// pattern.
    ///
    /// Tolerant by design: an unknown entry id is a no-op (logged at debug),
    /// and so is a second call against an entry whose solution is already
    /// set — the solution fields are settable exactly once.
    pub fn document_solution(&self, entry_id: &str, solution: Solution) {
        let mut state = self.write_state();

        let pattern_id = match state.ledger.find_mut(entry_id) {
            None => {
                tracing::debug!(%entry_id, "document_solution for unknown entry id; ignoring");
                return;
            }
            Some(entry) if entry.solution.is_some() => {
                tracing::debug!(%entry_id, "entry already has a documented solution; ignoring");
                return;
            }
            Some(entry) => {
                entry.solution = Some(solution.clone());
                entry.pattern_id.clone()
            }
        };

        state
            .patterns
            .attach_solution(&pattern_id, &solution.description, &solution.prevention_steps);
        metrics::increment_counter!("error_learning_solutions_documented_total");
        tracing::info!(%entry_id, %pattern_id, "solution documented");
    }

    /// Summary statistics snapshot.
    pub fn statistics(&self) -> EngineStatistics {
        let state = self.read_state();
        reporting::statistics(&state.ledger, &state.patterns, self.cfg.recent_errors_limit)
    }

    /// All patterns in registration order, cloned snapshot.
    pub fn all_patterns(&self) -> Vec<ErrorPattern> {
        self.read_state().patterns.all().to_vec()
    }

    /// One pattern by id, if registered.
    pub fn pattern(&self, pattern_id: &str) -> Option<ErrorPattern> {
        self.read_state().patterns.get(pattern_id).cloned()
    }

    /// Deterministic text export of the knowledge base.
    pub fn export_knowledge_base(&self) -> String {
        reporting::export_knowledge_base(&self.read_state().patterns)
    }

    /// Threshold-crossing notifications recorded so far, oldest first.
    pub fn notifications(&self) -> Vec<NotificationEvent> {
        self.read_state().notifications.clone()
    }

    /// Generated tooling texts recorded so far, oldest first.
    pub fn tooling_artifacts(&self) -> Vec<ToolingArtifact> {
        self.read_state().tooling.clone()
    }

    // A poisoned lock only means another caller panicked mid-operation; the
    // collections themselves stay structurally valid, so recover the guard
    // instead of propagating the panic.
    fn read_state(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
