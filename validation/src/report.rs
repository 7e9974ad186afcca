//! Validation Report — Structured output from the validation layers
//!
//! Every validation entry point in this crate returns a [`ValidationOutcome`]:
//! an ordered list of [`ValidationIssue`]s plus optional per-layer execution
//! metadata. Issues are data, never errors — a failed validation is a normal
//! return value, and callers decide whether to block, retry, or proceed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a single validation issue.
///
/// Only `Error` affects validity; warnings and infos are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks the strategy from being considered valid.
    Error,
    /// Suspicious but non-blocking (e.g., unknown config key).
    Warning,
    /// Informational only.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// One finding from a validation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// How serious this finding is.
    pub severity: Severity,
    /// Human-readable description of the problem.
    pub message: String,
    /// 1-based source line, or 0 when not applicable (e.g., config issues).
    pub line: u32,
    /// 0-based source column, or 0 when not applicable.
    pub column: u32,
    /// The field name or config key path this issue refers to
    /// (e.g., `"收盤價"`, `"parameters[2].value"`, `"logic.entry"`).
    pub subject: String,
    /// Optional remediation hint (e.g., "did you mean '成交金額'?").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create an error issue with no source location.
    pub fn error(subject: &str, message: &str) -> Self {
        Self {
            severity: Severity::Error,
            message: message.to_string(),
            line: 0,
            column: 0,
            subject: subject.to_string(),
            suggestion: None,
        }
    }

    /// Create a warning issue with no source location.
    pub fn warning(subject: &str, message: &str) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.to_string(),
            line: 0,
            column: 0,
            subject: subject.to_string(),
            suggestion: None,
        }
    }

    /// Create an info issue with no source location.
    pub fn info(subject: &str, message: &str) -> Self {
        Self {
            severity: Severity::Info,
            message: message.to_string(),
            line: 0,
            column: 0,
            subject: subject.to_string(),
            suggestion: None,
        }
    }

    /// Attach a source location (1-based line, 0-based column).
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Attach a remediation suggestion.
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    /// Prefix the subject path (used when re-emitting nested issues,
    /// e.g. code-validator findings under `logic.entry`).
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.subject = if self.subject.is_empty() {
            prefix.to_string()
        } else {
            format!("{}.{}", prefix, self.subject)
        };
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.subject, self.message)?;
        if self.line > 0 {
            write!(f, " (line {}, col {})", self.line, self.column)?;
        }
        if let Some(s) = &self.suggestion {
            write!(f, " — {}", s)?;
        }
        Ok(())
    }
}

/// Execution record of one validation layer within a combined run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRun {
    /// Layer name ("config", "fields", "code").
    pub name: String,
    /// Whether the layer produced zero errors.
    pub passed: bool,
    /// Wall-clock time spent in this layer, in milliseconds.
    pub latency_ms: f64,
    /// Number of error-severity issues the layer emitted.
    pub error_count: usize,
}

/// Metadata attached to a combined validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMetadata {
    /// Layers that executed, in run order.
    pub layers: Vec<LayerRun>,
    /// UTC wall timestamp of the run (serializes as ISO-8601).
    pub timestamp: DateTime<Utc>,
}

impl ValidationMetadata {
    /// Names of the layers that ran.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }
}

/// The result of any validation entry point.
///
/// Validity is derived, not stored: an outcome is valid iff it contains
/// no error-severity issue. Warnings never affect validity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Issues in the order they were found.
    pub issues: Vec<ValidationIssue>,
    /// Present only for combined runs via `validate_with_metadata`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ValidationMetadata>,
}

impl ValidationOutcome {
    /// An outcome with no issues (trivially valid).
    pub fn valid() -> Self {
        Self::default()
    }

    /// Build an outcome from a list of issues.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            issues,
            metadata: None,
        }
    }

    /// Append one issue.
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Absorb all issues from another outcome.
    pub fn extend(&mut self, other: ValidationOutcome) {
        self.issues.extend(other.issues);
    }

    /// Valid iff no error-severity issue is present.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Number of error-severity issues.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Number of warning-severity issues.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Error-severity issues only.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    /// Warning-severity issues only.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Attach combined-run metadata.
    pub fn with_metadata(mut self, metadata: ValidationMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_outcome_is_valid() {
        let outcome = ValidationOutcome::valid();
        assert!(outcome.is_valid());
        assert_eq!(outcome.error_count(), 0);
        assert_eq!(outcome.warning_count(), 0);
    }

    #[test]
    fn test_warnings_do_not_affect_validity() {
        let mut outcome = ValidationOutcome::valid();
        outcome.push(ValidationIssue::warning("extra_key", "unknown key"));
        outcome.push(ValidationIssue::info("note", "fyi"));
        assert!(outcome.is_valid());
        assert_eq!(outcome.warning_count(), 1);
    }

    #[test]
    fn test_single_error_invalidates() {
        let mut outcome = ValidationOutcome::valid();
        outcome.push(ValidationIssue::error("type", "missing required key"));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.error_count(), 1);
    }

    #[test]
    fn test_issue_builders() {
        let issue = ValidationIssue::error("close", "unknown field")
            .at(3, 12)
            .with_suggestion("did you mean '收盤價'?");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.line, 3);
        assert_eq!(issue.column, 12);
        assert_eq!(issue.suggestion.as_deref(), Some("did you mean '收盤價'?"));
    }

    #[test]
    fn test_prefixed_subject() {
        let issue = ValidationIssue::error("close", "unknown field").prefixed("logic.entry");
        assert_eq!(issue.subject, "logic.entry.close");

        let bare = ValidationIssue::error("", "syntax error").prefixed("logic.exit");
        assert_eq!(bare.subject, "logic.exit");
    }

    #[test]
    fn test_extend_merges_issue_order() {
        let mut a = ValidationOutcome::from_issues(vec![ValidationIssue::error("x", "first")]);
        let b = ValidationOutcome::from_issues(vec![ValidationIssue::warning("y", "second")]);
        a.extend(b);
        assert_eq!(a.issues.len(), 2);
        assert_eq!(a.issues[0].subject, "x");
        assert_eq!(a.issues[1].subject, "y");
    }

    #[test]
    fn test_display_includes_location_and_suggestion() {
        let issue = ValidationIssue::error("volume", "unknown field")
            .at(2, 4)
            .with_suggestion("did you mean '成交金額'?");
        let text = issue.to_string();
        assert!(text.contains("[error]"));
        assert!(text.contains("line 2"));
        assert!(text.contains("成交金額"));
    }

    #[test]
    fn test_json_roundtrip() {
        let outcome = ValidationOutcome::from_issues(vec![
            ValidationIssue::error("a", "bad").at(1, 0),
            ValidationIssue::warning("b", "odd"),
        ]);
        let json = serde_json::to_string(&outcome).unwrap();
        let restored: ValidationOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.issues.len(), 2);
        assert!(!restored.is_valid());
    }

    #[test]
    fn test_metadata_layer_names() {
        let meta = ValidationMetadata {
            layers: vec![
                LayerRun {
                    name: "config".into(),
                    passed: true,
                    latency_ms: 0.4,
                    error_count: 0,
                },
                LayerRun {
                    name: "fields".into(),
                    passed: false,
                    latency_ms: 0.1,
                    error_count: 2,
                },
            ],
            timestamp: Utc::now(),
        };
        assert_eq!(meta.layer_names(), vec!["config", "fields"]);
    }
}
