//! Retry Loop State Machine — generate → validate → retry until done
//!
//! ```text
//! Generating ──► Validating ──► Success        (valid code)
//!     ▲               │
//!     │               ├────────► Retrying ──┐  (attempts remain)
//!     └───────────────┼─────────────────────┘
//!                     ├────────► Exhausted     (budget spent)
//!                     └────────► CircuitOpen   (same error repeating)
//! ```
//!
//! The loop driver lives in [`super::Gateway::validate_and_retry`]; this
//! module holds the phase/termination types and the transition rules so
//! they can be reasoned about (and tested) independently of the driver.

use crate::report::ValidationOutcome;
use serde::{Deserialize, Serialize};

/// Live phase of one retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPhase {
    /// Waiting on the injected generation function.
    Generating,
    /// Running the code validator on the latest candidate.
    Validating,
    /// About to re-generate with a feedback prompt.
    Retrying,
    /// Terminal: candidate passed validation.
    Success,
    /// Terminal: attempt budget spent without a valid candidate.
    Exhausted,
    /// Terminal: the circuit breaker tripped on a repeating error.
    CircuitOpen,
}

impl RetryPhase {
    /// Whether this phase ends the cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Exhausted | Self::CircuitOpen)
    }
}

impl std::fmt::Display for RetryPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generating => write!(f, "generating"),
            Self::Validating => write!(f, "validating"),
            Self::Retrying => write!(f, "retrying"),
            Self::Success => write!(f, "success"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::CircuitOpen => write!(f, "circuit_open"),
        }
    }
}

/// How a retry cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryTermination {
    /// The final candidate passed validation.
    Success,
    /// Budget spent; the final candidate is still invalid.
    Exhausted,
    /// The same error repeated past the circuit-breaker threshold.
    CircuitOpen,
    /// No code validator is active; retrying would be pointless, so the
    /// first candidate was returned unvalidated.
    ValidatorUnavailable,
}

impl std::fmt::Display for RetryTermination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::CircuitOpen => write!(f, "circuit_open"),
            Self::ValidatorUnavailable => write!(f, "validator_unavailable"),
        }
    }
}

/// Final report of one `validate_and_retry` cycle. Always returned
/// normally — exhaustion and circuit breaks are data, not panics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryReport {
    /// The last generated candidate code.
    pub code: String,
    /// Validation outcome of that candidate.
    pub outcome: ValidationOutcome,
    /// Generation attempts actually made.
    pub attempts: u32,
    /// Why the cycle ended.
    pub termination: RetryTermination,
}

impl RetryReport {
    /// Whether the cycle produced validated code.
    pub fn succeeded(&self) -> bool {
        self.termination == RetryTermination::Success
    }
}

/// Transition table for one attempt's worth of the cycle. Pure function of
/// (validity, attempts remaining, circuit state).
pub fn next_phase(valid: bool, attempts_remain: bool, circuit_open: bool) -> RetryPhase {
    if valid {
        RetryPhase::Success
    } else if circuit_open {
        RetryPhase::CircuitOpen
    } else if attempts_remain {
        RetryPhase::Retrying
    } else {
        RetryPhase::Exhausted
    }
}
