//! # Cause/Trigger Classifier
//!
//! Pure, total classification of a raw error report into a human-readable
//! cause string and a trigger label. Absence of a match is a defined success
//! (fallback value), never an error: this path must not become a new source
//! of outage risk for the application it observes.

use serde::{Deserialize, Serialize};

use crate::profiles::{CategoryProfile, TRIGGER_KEYWORDS, UNKNOWN_CAUSE, UNKNOWN_TRIGGER};
use crate::types::ErrorReport;

/// Classifier output used to enrich a ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub cause_analysis: String,
    pub trigger: String,
}

/// Strategy interface for report classification.
///
/// Implementations may be heuristic-only or backed by an external analysis
/// service in the future. All implementations must be total: every report
/// classifies to something, with fallbacks for unknown inputs.
pub trait ReportClassifier {
    fn classify(&self, report: &ErrorReport) -> Classification;
}

/// Default classifier: per-category cause lookup plus ordered substring
/// search over the context text for the trigger label. First keyword match
/// wins; the search is case-insensitive.
#[derive(Debug, Default)]
pub struct HeuristicClassifier;

impl ReportClassifier for HeuristicClassifier {
    fn classify(&self, report: &ErrorReport) -> Classification {
        let cause_analysis = CategoryProfile::for_category(&report.category)
            .map(|profile| profile.cause)
            .unwrap_or(UNKNOWN_CAUSE)
            .to_string();

        let context = report.context.to_lowercase();
        let trigger = TRIGGER_KEYWORDS
            .iter()
            .find(|(needle, _)| context.contains(needle))
            .map(|(_, label)| *label)
            .unwrap_or(UNKNOWN_TRIGGER)
            .to_string();

        Classification {
            cause_analysis,
            trigger,
        }
    }
}
