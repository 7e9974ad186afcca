//! Strategy Guard — validation layers for LLM-generated trading strategies
//!
//! This library provides:
//! - A field manifest resolving market-data field names and aliases in O(1)
//! - An auto-corrector suggesting canonical names with calibrated confidence
//! - An AST code validator extracting `data.get(...)` references from Python
//! - A structural config validator for strategy configuration objects
//! - A gateway composing the layers behind feature flags, with a circuit
//!   breaker, a validate-and-retry loop, and success-rate statistics
//! - A deterministic hash-based sampler for staged rollout
//!
//! # Layers
//!
//! | Layer | Component | Guards against |
//! |---|---|---|
//! | 1 | [`FieldManifest`] + [`AutoCorrector`] | Hallucinated field names |
//! | 2 | [`AstCodeValidator`] | Invalid field references in code |
//! | 3 | [`ConfigValidator`] | Malformed strategy configurations |
//!
//! # Usage
//!
//! ```no_run
//! use strategy_guard::{Gateway, GuardConfig};
//!
//! let gateway = Gateway::with_builtin_manifest(&GuardConfig::from_env());
//! let outcome = gateway.validate_code("signal = data.get('close') > 100");
//! for issue in &outcome.issues {
//!     println!("{}", issue);
//! }
//! ```

pub mod code_validator;
pub mod config;
pub mod config_validator;
pub mod corrector;
pub mod gateway;
pub mod manifest;
pub mod metrics;
pub mod prompts;
pub mod report;
pub mod rollout;
pub mod traits;

// Re-export key report types
pub use report::{LayerRun, Severity, ValidationIssue, ValidationMetadata, ValidationOutcome};

// Re-export key manifest types
pub use manifest::{
    CatalogError, FieldCategory, FieldDescriptor, FieldManifest, Frequency, LocalizedText,
    ValueRange, ValueType,
};

// Re-export corrector types
pub use corrector::{classify, AutoCorrector, ConfidenceLevel, CorrectionReason, CorrectionResult};

// Re-export validator types
pub use code_validator::{AstCodeValidator, FieldReference};
pub use config_validator::ConfigValidator;

// Re-export gateway types
pub use gateway::{
    CircuitBreaker, Gateway, GenerationStats, RetryPhase, RetryReport, RetryTermination,
    ValidationRecord,
};

// Re-export configuration types
pub use config::GuardConfig;

// Re-export rollout types
pub use rollout::{RolloutError, RolloutSampler};

// Re-export metrics types
pub use metrics::{InMemoryMetricsCollector, MetricsCollector, MetricsSnapshot, ValidationSample};

// Re-export prompt types
pub use prompts::{DefaultPromptFormatter, PromptFormatter};

// Re-export capability seams
pub use traits::{CodeValidator, FieldLookup, SuggestionProvider};
