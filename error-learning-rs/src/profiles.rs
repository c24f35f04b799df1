//! # Per-Category Profiles
//!
//! One consolidated table mapping each known [`ErrorCategory`] to the texts
//! the engine derives from it: cause analysis, prevention rule, and the
//! optional tooling texts generated at escalation thresholds. Keeping these
//! in a single profile avoids drift between parallel per-type tables.
//!
//! Unknown categories have no profile; every consumer falls back to the
//! documented defaults (`UNKNOWN_CAUSE`, `UNKNOWN_TRIGGER`,
//! `GENERIC_PREVENTION_RULE`) or omits the optional texts.

use crate::types::ErrorCategory;

/// Fallback cause text for categories without a profile.
pub const UNKNOWN_CAUSE: &str = "unknown cause";

/// Fallback trigger label when no context keyword matches.
pub const UNKNOWN_TRIGGER: &str = "unknown trigger";

/// Fallback prevention rule for categories without a profile.
pub const GENERIC_PREVENTION_RULE: &str = "generic validation check";

/// Ordered `(needle, label)` pairs searched over the lowercased context
/// text. First match wins.
pub const TRIGGER_KEYWORDS: &[(&str, &str)] = &[
    ("user input", "user input"),
    ("api call", "API call"),
    ("file operation", "file operation"),
    ("database", "database operation"),
];

/// Static texts associated with one known error category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryProfile {
    /// Human-readable cause analysis
    pub cause: &'static str,
    /// Prevention rule registered when the pattern reaches the warn threshold
    pub prevention_rule: &'static str,
    /// Lint rule text, omitted for categories without one
    pub lint_rule: Option<&'static str>,
    /// Auto-fix recommendation text
    pub auto_fix: Option<&'static str>,
    /// Pre-commit hook command text
    pub pre_commit_hook: Option<&'static str>,
    /// Code template text
    pub code_template: Option<&'static str>,
}

impl CategoryProfile {
    /// Looks up the profile for a category. `Other` codes have none.
    pub fn for_category(category: &ErrorCategory) -> Option<&'static CategoryProfile> {
        match category {
            ErrorCategory::Syntax => Some(&SYNTAX),
            ErrorCategory::Import => Some(&IMPORT),
            ErrorCategory::Config => Some(&CONFIG),
            ErrorCategory::Api => Some(&API),
            ErrorCategory::Data => Some(&DATA),
            ErrorCategory::Logic => Some(&LOGIC),
            ErrorCategory::Runtime => Some(&RUNTIME),
            ErrorCategory::Routing => Some(&ROUTING),
            ErrorCategory::Permission => Some(&PERMISSION),
            ErrorCategory::Security => Some(&SECURITY),
            ErrorCategory::Other(_) => None,
        }
    }
}

static SYNTAX: CategoryProfile = CategoryProfile {
    cause: "invalid syntax in generated or edited code",
    prevention_rule: "Syntax-Validator before execution",
    lint_rule: Some("deny unparsable constructs: run the language parser over every generated file before it is written"),
    auto_fix: Some("run the formatter and re-parse; reject the file if parsing still fails"),
    pre_commit_hook: Some("pre-commit: syntax-check all staged source files"),
    code_template: Some("wrap generated snippets in a parse-check before insertion"),
};

static IMPORT: CategoryProfile = CategoryProfile {
    cause: "missing or unresolved module import",
    prevention_rule: "Import-Resolver check",
    lint_rule: Some("flag imports that do not resolve against the current module graph"),
    auto_fix: Some("resolve the import against the dependency manifest and add the missing declaration"),
    pre_commit_hook: Some("pre-commit: verify all imports resolve in a clean checkout"),
    code_template: Some("declare imports at the top of the module, grouped by origin"),
};

static CONFIG: CategoryProfile = CategoryProfile {
    cause: "missing or inconsistent configuration value",
    prevention_rule: "Config schema validation on startup",
    lint_rule: Some("flag configuration keys read without a documented default"),
    auto_fix: Some("fill the missing key from the documented default set"),
    pre_commit_hook: Some("pre-commit: validate config files against the schema"),
    code_template: None,
};

static API: CategoryProfile = CategoryProfile {
    cause: "external API unavailable or returned an unexpected response",
    prevention_rule: "API health probe and timeout budget review",
    lint_rule: Some("flag API calls without an explicit timeout or error branch"),
    auto_fix: Some("wrap the call in retry-with-backoff and surface a typed error"),
    pre_commit_hook: None,
    code_template: Some("API call scaffold with timeout, retry, and response validation"),
};

static DATA: CategoryProfile = CategoryProfile {
    cause: "unexpected data shape or invalid field content",
    prevention_rule: "Input schema validation at ingestion boundaries",
    lint_rule: Some("flag deserialization without field-level validation"),
    auto_fix: None,
    pre_commit_hook: None,
    code_template: None,
};

static LOGIC: CategoryProfile = CategoryProfile {
    cause: "incorrect control flow or business rule implementation",
    prevention_rule: "Targeted regression test for the affected rule",
    lint_rule: None,
    auto_fix: None,
    pre_commit_hook: None,
    code_template: None,
};

static RUNTIME: CategoryProfile = CategoryProfile {
    cause: "unhandled runtime condition",
    prevention_rule: "Guard clause around the failing operation",
    lint_rule: None,
    auto_fix: None,
    pre_commit_hook: Some("pre-commit: run the smoke test suite"),
    code_template: None,
};

static ROUTING: CategoryProfile = CategoryProfile {
    cause: "request routed to a missing or mismatched handler",
    prevention_rule: "Route table consistency check",
    lint_rule: None,
    auto_fix: None,
    pre_commit_hook: None,
    code_template: None,
};

static PERMISSION: CategoryProfile = CategoryProfile {
    cause: "caller lacks a required permission",
    prevention_rule: "Permission matrix review",
    lint_rule: None,
    auto_fix: None,
    pre_commit_hook: None,
    code_template: None,
};

static SECURITY: CategoryProfile = CategoryProfile {
    cause: "potential security policy violation",
    prevention_rule: "Security policy audit",
    lint_rule: Some("flag use of unsanitized external input in privileged operations"),
    auto_fix: None,
    pre_commit_hook: Some("pre-commit: run the security linter over staged files"),
    code_template: None,
};
