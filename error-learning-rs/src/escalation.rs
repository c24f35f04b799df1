//! # Escalation Policy Engine
//!
//! Threshold-driven state machine per pattern. Transitions are
//! one-directional (Normal → Warned → AutoFixEligible). The warning
//! emission recurs on every ingestion at or above the warn threshold; the
//! rule/template/hook generation actions fire exactly once, at the moment
//! of crossing.
//!
//! The caller evaluates this under the engine's write lock, where frequency
//! advances by exactly 1 per ingestion, so "first reaches N" is an equality
//! check and the one-time actions cannot fire twice or be skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profiles::{CategoryProfile, GENERIC_PREVENTION_RULE};
use crate::types::{ErrorCategory, ErrorPattern};

/// Occurrence count at which a pattern enters `Warned`.
pub const WARN_THRESHOLD: u64 = 3;

/// Occurrence count at which a pattern becomes auto-fix eligible.
pub const AUTO_FIX_THRESHOLD: u64 = 5;

/// Escalation state derived from a pattern's frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationState {
    /// Frequency below the warn threshold
    Normal,
    /// Frequency in `[WARN_THRESHOLD, AUTO_FIX_THRESHOLD)`
    Warned,
    /// Frequency at or above the auto-fix threshold
    AutoFixEligible,
}

impl EscalationState {
    pub fn for_frequency(frequency: u64) -> Self {
        if frequency >= AUTO_FIX_THRESHOLD {
            EscalationState::AutoFixEligible
        } else if frequency >= WARN_THRESHOLD {
            EscalationState::Warned
        } else {
            EscalationState::Normal
        }
    }
}

/// Notification recorded when a pattern crosses a threshold.
/// Payload: the pattern's category plus its frequency at the crossing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: Uuid,
    pub pattern_id: String,
    pub category: ErrorCategory,
    pub frequency: u64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Kind of generated remediation tooling text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolingKind {
    LintRule,
    AutoFix,
    PreCommitHook,
    CodeTemplate,
}

/// Generated tooling text. Recommendation and tooling generation only —
/// never code mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolingArtifact {
    pub pattern_id: String,
    pub category: ErrorCategory,
    pub kind: ToolingKind,
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

/// What one escalation evaluation produced.
#[derive(Debug, Default)]
pub struct EscalationOutcome {
    /// Recurring alert: set on every ingestion while Warned or higher
    pub warning_emitted: bool,
    /// One-time: the pattern just reached the warn threshold
    pub entered_warned: bool,
    /// One-time: the pattern just reached the auto-fix threshold
    pub entered_auto_fix: bool,
    pub notifications: Vec<NotificationEvent>,
    pub artifacts: Vec<ToolingArtifact>,
}

/// Evaluates the updated frequency against the thresholds, mutating the
/// pattern (prevention rule, auto-fix flag) and collecting the generated
/// side effects. Unknown categories never fail: they degrade to the generic
/// prevention rule and omit the optional tooling texts.
pub fn evaluate(
    pattern: &mut ErrorPattern,
    category: &ErrorCategory,
    frequency: u64,
    at: DateTime<Utc>,
) -> EscalationOutcome {
    let mut outcome = EscalationOutcome::default();
    let profile = CategoryProfile::for_category(category);

    if frequency >= WARN_THRESHOLD {
        outcome.warning_emitted = true;
        tracing::warn!(
            pattern_id = %pattern.id,
            category = %category,
            frequency,
            "recurring error pattern"
        );
        metrics::increment_counter!(
            "error_learning_pattern_warnings_total",
            "category" => category.to_string()
        );
    }

    if frequency == WARN_THRESHOLD {
        outcome.entered_warned = true;

        let rule = profile
            .map(|p| p.prevention_rule)
            .unwrap_or(GENERIC_PREVENTION_RULE);
        pattern.prevention_rules.push(rule.to_string());

        if let Some(lint) = profile.and_then(|p| p.lint_rule) {
            outcome
                .artifacts
                .push(artifact(pattern, category, ToolingKind::LintRule, lint, at));
        }

        outcome
            .notifications
            .push(notification(pattern, category, frequency, at, "warn"));
        metrics::increment_counter!(
            "error_learning_escalations_total",
            "state" => "warned"
        );
    }

    if frequency == AUTO_FIX_THRESHOLD {
        outcome.entered_auto_fix = true;
        // Monotone: set once, never reset.
        pattern.auto_fix_available = true;

        let texts = [
            (ToolingKind::AutoFix, profile.and_then(|p| p.auto_fix)),
            (
                ToolingKind::PreCommitHook,
                profile.and_then(|p| p.pre_commit_hook),
            ),
            (
                ToolingKind::CodeTemplate,
                profile.and_then(|p| p.code_template),
            ),
        ];
        for (kind, text) in texts {
            if let Some(content) = text {
                outcome
                    .artifacts
                    .push(artifact(pattern, category, kind, content, at));
            }
        }

        outcome
            .notifications
            .push(notification(pattern, category, frequency, at, "auto-fix"));
        tracing::info!(
            pattern_id = %pattern.id,
            category = %category,
            frequency,
            "pattern is now auto-fix eligible"
        );
        metrics::increment_counter!(
            "error_learning_escalations_total",
            "state" => "auto_fix_eligible"
        );
    }

    outcome
}

fn artifact(
    pattern: &ErrorPattern,
    category: &ErrorCategory,
    kind: ToolingKind,
    content: &str,
    at: DateTime<Utc>,
) -> ToolingArtifact {
    ToolingArtifact {
        pattern_id: pattern.id.clone(),
        category: category.clone(),
        kind,
        content: content.to_string(),
        generated_at: at,
    }
}

fn notification(
    pattern: &ErrorPattern,
    category: &ErrorCategory,
    frequency: u64,
    at: DateTime<Utc>,
    threshold: &str,
) -> NotificationEvent {
    NotificationEvent {
        id: Uuid::new_v4(),
        pattern_id: pattern.id.clone(),
        category: category.clone(),
        frequency,
        message: format!(
            "pattern {} ({}) reached the {} threshold at {} occurrences",
            pattern.id, category, threshold, frequency
        ),
        created_at: at,
    }
}
