//! Capability seams between validation layers
//!
//! The configuration validator and the gateway depend on these traits, not
//! on concrete types, so test doubles can stand in for the manifest, the
//! auto-corrector, and the code validator without any reflection tricks.

use crate::report::ValidationOutcome;

/// Read-only field-name resolution (implemented by `FieldManifest`).
pub trait FieldLookup: Send + Sync {
    /// Whether a name (alias or canonical) is in the catalog.
    fn exists(&self, name: &str) -> bool;

    /// Map an alias or canonical name to the canonical name.
    fn canonicalize(&self, name: &str) -> Option<String>;
}

/// Produces a human-readable correction hint for an unresolved field name
/// (implemented by `AutoCorrector`).
pub trait SuggestionProvider: Send + Sync {
    /// A formatted suggestion such as `did you mean '收盤價'?`, or `None`
    /// when no plausible correction exists.
    fn suggest_for(&self, name: &str) -> Option<String>;
}

/// Validates generated strategy code (implemented by `AstCodeValidator`).
pub trait CodeValidator: Send + Sync {
    /// Parse and check one code string. Parse failures are reported as
    /// issues in the outcome, never as panics or `Err`.
    fn validate_code(&self, source: &str) -> ValidationOutcome;
}
