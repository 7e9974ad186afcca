//! Validation Gateway — layer composition, circuit breaker, retry loop
//!
//! The gateway is the one stateful component: it instantiates the enabled
//! validation layers at construction, owns the circuit breaker and the
//! generation statistics, and drives the generate → validate → retry cycle
//! against an injected LLM generation function.
//!
//! ```text
//!               ┌────────────────────────── Gateway ─────────────────────────┐
//! config ──────►│ ConfigValidator (layer 3)                                  │
//! code ────────►│ AstCodeValidator (layer 2, requires layer 1)               │
//! fields ──────►│ FieldManifest + AutoCorrector (layer 1)                    │
//!               │ CircuitBreaker · GenerationStats · bounded history (lock)  │
//!               └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Disabled layers degrade gracefully: their entry points return
//! trivially-valid outcomes instead of raising. Shared mutable state is a
//! single critical section — one mutex around the breaker, the counters,
//! and the history ring — so callers may use one gateway from many threads.

pub mod circuit;
pub mod retry;

pub use circuit::{error_signature, CircuitBreaker};
pub use retry::{RetryPhase, RetryReport, RetryTermination};

use crate::code_validator::AstCodeValidator;
use crate::config::{GuardConfig, CIRCUIT_THRESHOLD_RANGE, DEFAULT_CIRCUIT_THRESHOLD};
use crate::config_validator::ConfigValidator;
use crate::corrector::AutoCorrector;
use crate::manifest::FieldManifest;
use crate::metrics::{MetricsCollector, ValidationSample};
use crate::prompts::{DefaultPromptFormatter, PromptFormatter};
use crate::report::{LayerRun, ValidationIssue, ValidationMetadata, ValidationOutcome};
use crate::rollout::RolloutSampler;
use crate::traits::SuggestionProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, warn};

/// Validation records kept in the in-memory history ring.
const HISTORY_CAPACITY: usize = 100;

/// Success/failure counters for generated strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

impl GenerationStats {
    /// Percentage of successful outcomes; 0.0 before anything is recorded.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }
}

/// One entry of the bounded validation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRecord {
    /// Strategy identifier (config `name`, or "unnamed").
    pub strategy: String,
    pub valid: bool,
    pub error_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// All shared mutable state, behind one lock (single critical section).
#[derive(Debug)]
struct SharedState {
    breaker: CircuitBreaker,
    stats: GenerationStats,
    history: VecDeque<ValidationRecord>,
}

/// Composes the validation layers and drives the retry loop.
pub struct Gateway {
    config: GuardConfig,
    manifest: Option<Arc<FieldManifest>>,
    corrector: Option<AutoCorrector>,
    code_validator: Option<AstCodeValidator>,
    config_validator: Option<ConfigValidator>,
    sampler: RolloutSampler,
    formatter: Box<dyn PromptFormatter>,
    metrics: Option<Arc<dyn MetricsCollector>>,
    state: Mutex<SharedState>,
}

impl Gateway {
    /// Build a gateway from explicit configuration and an optional manifest.
    ///
    /// Layer rules: the field layer needs both its flag and a manifest; the
    /// code layer additionally requires the field layer; the config layer
    /// is independent. Out-of-range tunables fall back to defaults with a
    /// warning — construction itself never fails.
    pub fn new(config: &GuardConfig, manifest: Option<Arc<FieldManifest>>) -> Self {
        let manifest = if config.field_validation_enabled {
            manifest
        } else {
            None
        };
        let corrector = manifest.clone().map(AutoCorrector::new);

        let code_validator = if config.code_validation_enabled {
            manifest.clone().map(AstCodeValidator::new)
        } else {
            None
        };

        let config_validator = if config.config_validation_enabled {
            let mut validator = ConfigValidator::new();
            if let Some(manifest) = &manifest {
                validator = validator.with_field_lookup(manifest.clone());
            }
            if let Some(corrector) = &corrector {
                validator = validator.with_suggestions(Arc::new(corrector.clone()));
            }
            if let Some(code) = &code_validator {
                validator = validator.with_code_validator(Arc::new(code.clone()));
            }
            Some(validator)
        } else {
            None
        };

        Self {
            corrector,
            code_validator,
            config_validator,
            sampler: checked_sampler(config.rollout_percentage),
            formatter: Box::new(DefaultPromptFormatter),
            metrics: None,
            state: Mutex::new(SharedState {
                breaker: CircuitBreaker::new(checked_threshold(config.circuit_breaker_threshold)),
                stats: GenerationStats::default(),
                history: VecDeque::with_capacity(HISTORY_CAPACITY),
            }),
            manifest,
            config: config.clone(),
        }
    }

    /// Gateway over the embedded standard catalog.
    pub fn with_builtin_manifest(config: &GuardConfig) -> Self {
        Self::new(config, Some(Arc::new(FieldManifest::builtin())))
    }

    /// Inject a metrics collector; samples flow per validated strategy.
    /// Shared so the caller can keep a handle for reading aggregates.
    pub fn set_metrics_collector(&mut self, collector: Arc<dyn MetricsCollector>) {
        self.metrics = Some(collector);
    }

    /// Replace the prompt formatter used by the retry loop.
    pub fn set_prompt_formatter(&mut self, formatter: Box<dyn PromptFormatter>) {
        self.formatter = formatter;
    }

    /// The configuration this gateway was built with.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Whether an identifier falls inside the staged rollout.
    /// Deterministic: same identifier, same answer, every process.
    pub fn in_rollout(&self, identifier: &str) -> bool {
        self.sampler.is_enabled(identifier)
    }

    /// Validate generated strategy code. Trivially valid when the code
    /// layer is disabled.
    pub fn validate_code(&self, source: &str) -> ValidationOutcome {
        match &self.code_validator {
            Some(validator) => validator.validate(source),
            None => ValidationOutcome::valid(),
        }
    }

    /// Validate a strategy configuration. Empty issue list when the config
    /// layer is disabled.
    pub fn validate_config(&self, config: &Value) -> ValidationOutcome {
        match &self.config_validator {
            Some(validator) => validator.validate(config),
            None => ValidationOutcome::valid(),
        }
    }

    /// Run every enabled layer over a configuration, timing each
    /// independently, and return the combined outcome with metadata.
    /// Also feeds the metrics collector and the bounded history.
    pub fn validate_with_metadata(&self, config: &Value) -> ValidationOutcome {
        let started = Instant::now();
        let mut outcome = ValidationOutcome::valid();
        let mut layers = Vec::new();
        let mut field_errors = 0;

        // Layer 3: structural checks only — field and code findings are
        // attributed to their own layers below.
        if self.config_validator.is_some() {
            let (layer, issues) = run_layer("config", || ConfigValidator::new().validate(config));
            layers.push(layer);
            outcome.issues.extend(issues);
        }

        // Layer 1: field-name resolution over the declared field lists.
        if self.manifest.is_some() {
            let (layer, issues) = run_layer("fields", || self.check_declared_fields(config));
            field_errors = layer.error_count;
            layers.push(layer);
            outcome.issues.extend(issues);
        }

        // Layer 2: AST checks over the entry/exit logic.
        if let Some(validator) = &self.code_validator {
            let (layer, issues) = run_layer("code", || {
                let mut nested = ValidationOutcome::valid();
                if let Some(logic) = config.get("logic").and_then(Value::as_object) {
                    for key in ["entry", "exit"] {
                        if let Some(code) = logic.get(key).and_then(Value::as_str) {
                            for issue in validator.validate(code).issues {
                                nested.push(issue.prefixed(&format!("logic.{}", key)));
                            }
                        }
                    }
                }
                nested
            });
            layers.push(layer);
            outcome.issues.extend(issues);
        }

        let latency_ms = elapsed_ms(started);
        let strategy = config
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unnamed")
            .to_string();
        let valid = outcome.is_valid();
        debug!(strategy = %strategy, valid, layers = layers.len(), latency_ms, "validated strategy");

        if let Some(metrics) = &self.metrics {
            metrics.record(&ValidationSample {
                strategy_id: strategy.clone(),
                validation_enabled: !layers.is_empty(),
                field_error_count: field_errors,
                llm_success: valid,
                latency_ms,
            });
        }

        {
            let mut state = self.lock_state();
            if state.history.len() == HISTORY_CAPACITY {
                state.history.pop_front();
            }
            state.history.push_back(ValidationRecord {
                strategy,
                valid,
                error_count: outcome.error_count(),
                timestamp: Utc::now(),
            });
        }

        outcome.with_metadata(ValidationMetadata {
            layers,
            timestamp: Utc::now(),
        })
    }

    /// Field-layer pass: resolve every name in `required_fields` and
    /// `optional_fields` against the manifest, with corrector hints.
    fn check_declared_fields(&self, config: &Value) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();
        let (Some(manifest), Some(corrector)) = (&self.manifest, &self.corrector) else {
            return outcome;
        };

        for key in ["required_fields", "optional_fields"] {
            let Some(items) = config.get(key).and_then(Value::as_array) else {
                continue;
            };
            for (index, item) in items.iter().enumerate() {
                let name = match item {
                    Value::String(name) => Some(name.as_str()),
                    Value::Object(entry) => entry.get("canonical_name").and_then(Value::as_str),
                    _ => None,
                };
                let Some(name) = name else { continue };
                if manifest.exists(name) {
                    continue;
                }
                let mut issue = ValidationIssue::error(
                    &format!("{}[{}]", key, index),
                    &format!("unknown data field '{}'", name),
                );
                if let Some(hint) = corrector.suggest_for(name) {
                    issue = issue.with_suggestion(&hint);
                }
                outcome.push(issue);
            }
        }
        outcome
    }

    /// Prepend a task prompt with the field-reference block (valid fields
    /// by category plus known-mistake corrections), when a manifest is
    /// active.
    pub fn build_initial_prompt(&self, task: &str) -> String {
        match &self.manifest {
            Some(manifest) => format!(
                "{}\n\n{}",
                task,
                self.formatter.field_reference(manifest)
            ),
            None => task.to_string(),
        }
    }

    // ── circuit breaker ────────────────────────────────────────────────

    /// Record one occurrence of an error message; returns the new count
    /// for its signature.
    pub fn track_error(&self, message: &str) -> u32 {
        self.lock_state().breaker.track(message)
    }

    /// Whether this message's signature has reached the configured
    /// threshold.
    pub fn should_break(&self, message: &str) -> bool {
        self.lock_state().breaker.should_break(message)
    }

    /// Whether the circuit has been opened this session.
    pub fn circuit_triggered(&self) -> bool {
        self.lock_state().breaker.triggered()
    }

    /// Clear the signature table and the triggered flag.
    pub fn reset_circuit(&self) {
        self.lock_state().breaker.reset();
    }

    // ── retry loop ─────────────────────────────────────────────────────

    /// Generate → validate → retry until valid code, spent budget, or a
    /// repeating error opens the circuit. Always returns normally.
    ///
    /// `max_retries` is the total attempt budget (0 is treated as 1).
    /// `generate_fn` is the sole external-effect point; the gateway never
    /// inspects it and blocks for as long as it runs. Attempts execute
    /// strictly sequentially — each retry prompt is built from the
    /// previous attempt's issues.
    pub fn validate_and_retry<F>(
        &self,
        mut generate_fn: F,
        initial_prompt: &str,
        max_retries: u32,
    ) -> RetryReport
    where
        F: FnMut(&str) -> String,
    {
        let Some(validator) = &self.code_validator else {
            // Retrying without a validator is pointless: return the first
            // candidate with a trivially-valid outcome.
            let code = generate_fn(initial_prompt);
            let outcome = ValidationOutcome::valid();
            self.record_outcome(&outcome);
            return RetryReport {
                code,
                outcome,
                attempts: 1,
                termination: RetryTermination::ValidatorUnavailable,
            };
        };

        // One retry cycle is one circuit-breaker session.
        self.reset_circuit();

        let budget = max_retries.max(1);
        let mut prompt = initial_prompt.to_string();
        let mut final_code = String::new();
        let mut final_outcome = ValidationOutcome::valid();

        for attempt in 1..=budget {
            debug!(attempt, budget, phase = %RetryPhase::Generating, "requesting candidate");
            let code = generate_fn(&prompt);

            debug!(attempt, phase = %RetryPhase::Validating, "validating candidate");
            let outcome = validator.validate(&code);

            let circuit_open = !outcome.is_valid() && {
                let mut state = self.lock_state();
                let mut open = false;
                for issue in outcome.errors() {
                    state.breaker.track(&issue.message);
                    if state.breaker.should_break(&issue.message) {
                        open = true;
                    }
                }
                if open {
                    state.breaker.set_triggered();
                }
                open
            };

            match retry::next_phase(outcome.is_valid(), attempt < budget, circuit_open) {
                RetryPhase::Success => {
                    self.record_outcome(&outcome);
                    return RetryReport {
                        code,
                        outcome,
                        attempts: attempt,
                        termination: RetryTermination::Success,
                    };
                }
                RetryPhase::CircuitOpen => {
                    warn!(attempt, "identical error repeating, opening circuit");
                    self.record_outcome(&outcome);
                    return RetryReport {
                        code,
                        outcome,
                        attempts: attempt,
                        termination: RetryTermination::CircuitOpen,
                    };
                }
                RetryPhase::Retrying => {
                    prompt = self.formatter.retry_prompt(&code, &outcome.issues, attempt);
                    final_code = code;
                    final_outcome = outcome;
                }
                // Falls through to the final report below.
                RetryPhase::Exhausted => {
                    final_code = code;
                    final_outcome = outcome;
                }
                RetryPhase::Generating | RetryPhase::Validating => {
                    unreachable!("next_phase only returns decision phases")
                }
            }
        }

        self.record_outcome(&final_outcome);
        RetryReport {
            code: final_code,
            outcome: final_outcome,
            attempts: budget,
            termination: RetryTermination::Exhausted,
        }
    }

    // ── statistics ─────────────────────────────────────────────────────

    /// Count one validation outcome toward the success-rate statistics.
    pub fn record_outcome(&self, outcome: &ValidationOutcome) {
        let mut state = self.lock_state();
        state.stats.total += 1;
        if outcome.is_valid() {
            state.stats.successful += 1;
        } else {
            state.stats.failed += 1;
        }
    }

    /// Percentage of recorded outcomes that were valid; 0.0 when nothing
    /// has been recorded.
    pub fn success_rate(&self) -> f64 {
        self.lock_state().stats.success_rate()
    }

    /// Snapshot of the generation counters.
    pub fn stats(&self) -> GenerationStats {
        self.lock_state().stats
    }

    /// Zero all counters in one critical section.
    pub fn reset_stats(&self) {
        self.lock_state().stats = GenerationStats::default();
    }

    /// Snapshot of the bounded validation history, oldest first.
    pub fn recent_history(&self) -> Vec<ValidationRecord> {
        self.lock_state().history.iter().cloned().collect()
    }

    fn lock_state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().expect("gateway state lock poisoned")
    }
}

/// Run one layer, timing it and summarizing its issues.
fn run_layer<F>(name: &str, layer_fn: F) -> (LayerRun, Vec<ValidationIssue>)
where
    F: FnOnce() -> ValidationOutcome,
{
    let started = Instant::now();
    let outcome = layer_fn();
    let error_count = outcome.error_count();
    (
        LayerRun {
            name: name.to_string(),
            passed: error_count == 0,
            latency_ms: elapsed_ms(started),
            error_count,
        },
        outcome.issues,
    )
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Config values are range-checked at parse time, but the struct is plain
/// data — re-check here and fall back rather than fail construction.
fn checked_threshold(threshold: u32) -> u32 {
    let (lo, hi) = CIRCUIT_THRESHOLD_RANGE;
    if (lo..=hi).contains(&threshold) {
        threshold
    } else {
        warn!(
            threshold,
            default = DEFAULT_CIRCUIT_THRESHOLD,
            "circuit-breaker threshold outside [1, 10], using default"
        );
        DEFAULT_CIRCUIT_THRESHOLD
    }
}

fn checked_sampler(percentage: u8) -> RolloutSampler {
    RolloutSampler::new(percentage).unwrap_or_else(|_| {
        warn!(percentage, default = 10u8, "invalid rollout percentage, using default");
        RolloutSampler::new(crate::config::DEFAULT_ROLLOUT_PERCENTAGE)
            .expect("default rollout percentage is valid")
    })
}
