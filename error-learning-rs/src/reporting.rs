//! # Reporting & Knowledge-Base Export
//!
//! Read-only views over the ledger and the pattern store: summary
//! statistics for a reporting UI and a deterministic, diffable text export
//! of the accumulated knowledge base.

use chrono::SecondsFormat;
use serde::Serialize;

use crate::ledger::ErrorLedger;
use crate::patterns::PatternStore;
use crate::types::{ErrorCategory, ErrorEntry};

/// Summary statistics over the full ledger and pattern set.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatistics {
    /// Total ledger entries
    pub total_errors: usize,
    /// Entries whose pattern already existed when they were appended
    /// (i.e. everything except each pattern's first occurrence)
    pub recurring_errors: usize,
    /// Distinct patterns registered
    pub pattern_count: usize,
    /// Patterns with the auto-fix flag set
    pub auto_fix_count: usize,
    /// Category with the highest entry count across the entire ledger.
    /// Ties break toward the category first encountered in ledger order —
    /// an explicit, stable tie-break, not an accident of map iteration.
    pub most_common_category: Option<ErrorCategory>,
    /// Newest entries, newest first
    pub recent_errors: Vec<ErrorEntry>,
}

/// Computes the statistics snapshot.
pub fn statistics(
    ledger: &ErrorLedger,
    patterns: &PatternStore,
    recent_limit: usize,
) -> EngineStatistics {
    let recurring_errors = ledger
        .entries()
        .iter()
        .filter(|entry| entry.is_recurring)
        .count();

    let auto_fix_count = patterns
        .all()
        .iter()
        .filter(|pattern| pattern.auto_fix_available)
        .count();

    EngineStatistics {
        total_errors: ledger.len(),
        recurring_errors,
        pattern_count: patterns.len(),
        auto_fix_count,
        most_common_category: most_common_category(ledger),
        recent_errors: ledger.recent(recent_limit),
    }
}

/// The category with the most ledger entries, first-encountered wins ties.
pub fn most_common_category(ledger: &ErrorLedger) -> Option<ErrorCategory> {
    // Counted in first-seen order so the strict `>` below yields the stable
    // tie-break documented on `EngineStatistics`.
    let mut counts: Vec<(ErrorCategory, usize)> = Vec::new();
    for entry in ledger.entries() {
        match counts.iter_mut().find(|(cat, _)| *cat == entry.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((entry.category.clone(), 1)),
        }
    }

    let mut best: Option<(ErrorCategory, usize)> = None;
    for (category, count) in counts {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((category, count)),
        }
    }
    best.map(|(category, _)| category)
}

/// Serializes the full knowledge base as markdown-like text: one block per
/// pattern, in registration order. Byte-deterministic given unchanged
/// state, so exports can be stored and diffed across runs.
pub fn export_knowledge_base(patterns: &PatternStore) -> String {
    let mut out = String::from("# Error Pattern Knowledge Base\n");
    out.push_str(&format!("\nPatterns: {}\n", patterns.len()));

    for pattern in patterns.all() {
        out.push_str(&format!("\n## {}: {}\n", pattern.id, pattern.description));
        out.push_str(&format!("- Frequency: {}\n", pattern.frequency));
        out.push_str(&format!(
            "- Last seen: {}\n",
            pattern.last_seen.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        out.push_str(&format!(
            "- Auto-fix available: {}\n",
            if pattern.auto_fix_available { "yes" } else { "no" }
        ));

        if pattern.solutions.is_empty() {
            out.push_str("- Solutions: none documented\n");
        } else {
            out.push_str("- Solutions:\n");
            for solution in &pattern.solutions {
                out.push_str(&format!("  - {solution}\n"));
            }
        }

        if pattern.prevention_rules.is_empty() {
            out.push_str("- Prevention rules: none registered\n");
        } else {
            out.push_str("- Prevention rules:\n");
            for rule in &pattern.prevention_rules {
                out.push_str(&format!("  - {rule}\n"));
            }
        }
    }

    out
}
