use std::sync::Arc;

use crate::classifier::{Classification, ReportClassifier};
use crate::types::{ErrorCategory, ErrorReport, Solution};
use crate::{EngineConfig, EngineError, ErrorPatternEngine, EscalationState};

fn engine() -> ErrorPatternEngine {
    ErrorPatternEngine::new(EngineConfig::default()).expect("engine construction should succeed")
}

fn api_timeout_report() -> ErrorReport {
    ErrorReport::new(ErrorCategory::Api, "Connection timeout to payment gateway")
        .file("billing/client.rs")
        .context("API call to billing")
}

#[test]
fn same_prefix_reports_accumulate_into_one_pattern() {
    let engine = engine();
    let shared_prefix = "y".repeat(50);

    for tail in ["alpha", "beta", "gamma", "delta"] {
        let report = ErrorReport::new(
            ErrorCategory::Data,
            format!("{shared_prefix} diverging {tail}"),
        );
        engine.log_error(report);
    }

    let patterns = engine.all_patterns();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].frequency, 4);
}

#[test]
fn different_categories_never_share_a_pattern() {
    let engine = engine();

    engine.log_error(ErrorReport::new(ErrorCategory::Api, "timeout"));
    engine.log_error(ErrorReport::new(ErrorCategory::Runtime, "timeout"));

    assert_eq!(engine.all_patterns().len(), 2);
}

#[test]
fn is_recurring_false_only_on_first_entry() {
    let engine = engine();

    for _ in 0..3 {
        engine.log_error(api_timeout_report());
    }

    let stats = engine.statistics();
    let mut entries = stats.recent_errors.clone();
    entries.reverse(); // oldest first

    assert!(!entries[0].is_recurring);
    assert!(entries[1].is_recurring);
    assert!(entries[2].is_recurring);
}

#[test]
fn occurrence_count_is_frozen_per_entry() {
    let engine = engine();

    for _ in 0..3 {
        engine.log_error(api_timeout_report());
    }

    let stats = engine.statistics();
    let mut entries = stats.recent_errors.clone();
    entries.reverse();

    assert_eq!(entries[0].occurrence_count, 1);
    assert_eq!(entries[1].occurrence_count, 2);
    assert_eq!(entries[2].occurrence_count, 3);
}

#[test]
fn last_occurrences_lists_prior_exact_matches_only() {
    let engine = engine();

    for _ in 0..3 {
        engine.log_error(api_timeout_report());
    }

    let stats = engine.statistics();
    let mut entries = stats.recent_errors.clone();
    entries.reverse();

    assert!(entries[0].last_occurrences.is_empty());
    assert_eq!(entries[1].last_occurrences.len(), 1);
    assert_eq!(entries[2].last_occurrences.len(), 2);
}

#[test]
fn escalation_thresholds_fire_exactly_once() {
    let engine = engine();

    // Three occurrences: warned, one prevention rule, one notification.
    for _ in 0..3 {
        engine.log_error(api_timeout_report());
    }
    let pattern = engine.all_patterns()[0].clone();
    assert_eq!(
        EscalationState::for_frequency(pattern.frequency),
        EscalationState::Warned
    );
    assert_eq!(pattern.prevention_rules.len(), 1);
    assert!(!pattern.auto_fix_available);
    assert_eq!(engine.notifications().len(), 1);

    // Two more: auto-fix eligible, second notification, tooling generated.
    for _ in 0..2 {
        engine.log_error(api_timeout_report());
    }
    let pattern = engine.all_patterns()[0].clone();
    assert_eq!(
        EscalationState::for_frequency(pattern.frequency),
        EscalationState::AutoFixEligible
    );
    assert!(pattern.auto_fix_available);
    assert_eq!(pattern.prevention_rules.len(), 1);
    assert_eq!(engine.notifications().len(), 2);

    let artifacts_after_five = engine.tooling_artifacts().len();
    assert!(artifacts_after_five > 0);
    let last_seen_after_five = pattern.last_seen;

    // A sixth identical error: new ledger entry, refreshed last_seen, flag
    // still set, but no re-run of the one-time generation actions.
    engine.log_error(api_timeout_report());
    let pattern = engine.all_patterns()[0].clone();
    assert_eq!(pattern.frequency, 6);
    assert!(pattern.auto_fix_available);
    assert!(pattern.last_seen >= last_seen_after_five);
    assert_eq!(engine.tooling_artifacts().len(), artifacts_after_five);
    assert_eq!(engine.notifications().len(), 2);
    assert_eq!(engine.statistics().total_errors, 6);
}

#[test]
fn payment_gateway_scenario_matches_expected_statistics() {
    let engine = engine();

    for _ in 0..3 {
        engine.log_error(api_timeout_report());
    }

    let stats = engine.statistics();
    assert_eq!(stats.total_errors, 3);
    assert_eq!(stats.recurring_errors, 2);
    assert_eq!(stats.pattern_count, 1);
    assert_eq!(stats.most_common_category, Some(ErrorCategory::Api));

    let pattern = engine.all_patterns()[0].clone();
    assert_eq!(pattern.frequency, 3);
    assert!(!pattern.auto_fix_available);

    // Fourth and fifth identical ingestion push frequency to 5 and flip
    // auto-fix availability.
    engine.log_error(api_timeout_report());
    engine.log_error(api_timeout_report());

    let pattern = engine.all_patterns()[0].clone();
    assert_eq!(pattern.frequency, 5);
    assert!(pattern.auto_fix_available);
    assert_eq!(engine.statistics().auto_fix_count, 1);
}

#[test]
fn entries_are_classified_on_ingestion() {
    let engine = engine();
    engine.log_error(api_timeout_report());

    let stats = engine.statistics();
    let entry = &stats.recent_errors[0];
    assert_eq!(entry.trigger, "API call");
    assert_eq!(
        entry.cause_analysis,
        "external API unavailable or returned an unexpected response"
    );
}

#[test]
fn export_is_idempotent_without_ingestion() {
    let engine = engine();
    engine.log_error(api_timeout_report());
    engine.log_error(ErrorReport::new(ErrorCategory::Syntax, "unexpected token"));

    let first = engine.export_knowledge_base();
    let second = engine.export_knowledge_base();
    assert_eq!(first, second);
    assert!(first.contains("pattern_1"));
    assert!(first.contains("pattern_2"));
}

#[test]
fn document_solution_with_fabricated_id_is_a_noop() {
    let engine = engine();
    engine.log_error(api_timeout_report());

    engine.document_solution(
        "20990101T000000Z_API_never_issued_99",
        Solution::new("imaginary", "not verified"),
    );

    let pattern = engine.all_patterns()[0].clone();
    assert!(pattern.solutions.is_empty());
}

#[test]
fn document_solution_updates_entry_and_pattern_exactly_once() {
    let engine = engine();
    let entry_id = engine.log_error(api_timeout_report());

    let solution = Solution::new("Added retry with backoff", "Replayed the failing request")
        .code_change("billing/client.rs: wrap send() in retry loop")
        .prevention_step("Add health probe for the payment gateway");
    engine.document_solution(&entry_id, solution);

    let pattern = engine.all_patterns()[0].clone();
    assert_eq!(pattern.solutions, vec!["Added retry with backoff"]);
    assert_eq!(
        pattern.prevention_rules,
        vec!["Add health probe for the payment gateway"]
    );

    let stats = engine.statistics();
    let entry = &stats.recent_errors[0];
    let documented = entry.solution.as_ref().expect("solution should be set");
    assert_eq!(documented.verification, "Replayed the failing request");

    // A second call against the same entry is ignored: settable exactly once.
    engine.document_solution(&entry_id, Solution::new("something else", "unverified"));
    let pattern = engine.all_patterns()[0].clone();
    assert_eq!(pattern.solutions.len(), 1);
}

#[test]
fn unknown_category_ingestion_never_fails() {
    let engine = engine();

    let entry_id = engine.log_error(
        ErrorReport::new(ErrorCategory::parse("billing"), "mystery failure")
            .context("no known keyword here"),
    );
    assert!(!entry_id.is_empty());

    let stats = engine.statistics();
    let entry = &stats.recent_errors[0];
    assert_eq!(entry.cause_analysis, "unknown cause");
    assert_eq!(entry.trigger, "unknown trigger");
}

#[test]
fn recent_errors_are_bounded_and_newest_first() {
    let engine = engine();

    for i in 0..15 {
        engine.log_error(ErrorReport::new(
            ErrorCategory::Runtime,
            format!("failure number {i}"),
        ));
    }

    let stats = engine.statistics();
    assert_eq!(stats.total_errors, 15);
    assert_eq!(stats.recent_errors.len(), 10);
    assert!(stats.recent_errors[0]
        .original_message
        .contains("failure number 14"));
}

#[test]
fn statistics_and_patterns_serialize_to_json() {
    let engine = engine();
    engine.log_error(api_timeout_report());

    let stats =
        serde_json::to_value(engine.statistics()).expect("statistics should serialize to JSON");
    assert_eq!(stats["total_errors"], 1);
    assert_eq!(stats["recurring_errors"], 0);
    assert_eq!(stats["pattern_count"], 1);
    assert!(stats["recent_errors"].is_array());

    let patterns =
        serde_json::to_value(engine.all_patterns()).expect("patterns should serialize to JSON");
    assert_eq!(patterns[0]["id"], "pattern_1");
    assert_eq!(patterns[0]["frequency"], 1);
    assert_eq!(patterns[0]["auto_fix_available"], false);
}

#[test]
fn engine_config_from_env_is_forgiving() {
    use std::env;

    // Unset variables keep the defaults.
    env::remove_var("ERROR_LEARNING_PREFIX_LEN");
    env::remove_var("ERROR_LEARNING_RECENT_LIMIT");
    env::remove_var("ERROR_LEARNING_OCCURRENCE_LIMIT");
    let cfg = EngineConfig::from_env();
    assert_eq!(cfg.message_prefix_len, 50);
    assert_eq!(cfg.recent_errors_limit, 10);
    assert_eq!(cfg.last_occurrences_limit, 5);

    // Unparsable values fall back to the defaults instead of panicking.
    env::set_var("ERROR_LEARNING_PREFIX_LEN", "not a number");
    env::set_var("ERROR_LEARNING_RECENT_LIMIT", "-3");
    let cfg = EngineConfig::from_env();
    assert_eq!(cfg.message_prefix_len, 50);
    assert_eq!(cfg.recent_errors_limit, 10);

    // Valid values are picked up; surrounding whitespace is tolerated.
    env::set_var("ERROR_LEARNING_PREFIX_LEN", " 64 ");
    env::set_var("ERROR_LEARNING_RECENT_LIMIT", "25");
    env::set_var("ERROR_LEARNING_OCCURRENCE_LIMIT", "7");
    let cfg = EngineConfig::from_env();
    assert_eq!(cfg.message_prefix_len, 64);
    assert_eq!(cfg.recent_errors_limit, 25);
    assert_eq!(cfg.last_occurrences_limit, 7);

    env::remove_var("ERROR_LEARNING_PREFIX_LEN");
    env::remove_var("ERROR_LEARNING_RECENT_LIMIT");
    env::remove_var("ERROR_LEARNING_OCCURRENCE_LIMIT");
}

#[test]
fn zero_limits_are_rejected_at_construction() {
    let cfg = EngineConfig {
        message_prefix_len: 0,
        ..EngineConfig::default()
    };
    assert!(matches!(
        ErrorPatternEngine::new(cfg),
        Err(EngineError::InvalidConfig(_))
    ));
}

#[test]
fn injected_classifier_is_used() {
    struct FixedClassifier;

    impl ReportClassifier for FixedClassifier {
        fn classify(&self, _report: &ErrorReport) -> Classification {
            Classification {
                cause_analysis: "fixed cause".to_string(),
                trigger: "fixed trigger".to_string(),
            }
        }
    }

    let engine =
        ErrorPatternEngine::with_classifier(EngineConfig::default(), Arc::new(FixedClassifier))
            .expect("engine construction should succeed");
    engine.log_error(api_timeout_report());

    let stats = engine.statistics();
    assert_eq!(stats.recent_errors[0].cause_analysis, "fixed cause");
    assert_eq!(stats.recent_errors[0].trigger, "fixed trigger");
}

#[test]
fn concurrent_ingestion_is_serialized() {
    use std::thread;

    let engine = Arc::new(engine());
    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                engine.log_error(api_timeout_report());
            }
        }));
    }
    for handle in handles {
        handle.join().expect("ingestion thread should not panic");
    }

    let stats = engine.statistics();
    assert_eq!(stats.total_errors, 100);
    assert_eq!(stats.pattern_count, 1);
    assert_eq!(engine.all_patterns()[0].frequency, 100);
    // Threshold crossings still fired exactly once each.
    assert_eq!(engine.notifications().len(), 2);
}
