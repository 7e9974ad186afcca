//! Rollout Sampler — deterministic traffic partitioning for staged rollout
//!
//! Maps an identifier (strategy name, user id, …) to an in/out decision by
//! hashing it with blake3 and comparing the low-order byte (mod 100) to the
//! configured percentage. blake3 is fixed and unsalted, so the same
//! identifier lands in the same bucket across processes and over time —
//! which is the whole point. `std` hashing is randomized per process and
//! must not be substituted here.

use serde::{Deserialize, Serialize};

/// Rejected construction inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RolloutError {
    #[error("rollout percentage {0} is outside [0, 100]")]
    PercentageOutOfRange(u8),
}

/// Stateless percentage-based sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutSampler {
    percentage: u8,
}

impl RolloutSampler {
    /// Create a sampler. `percentage` must be in [0, 100].
    pub fn new(percentage: u8) -> Result<Self, RolloutError> {
        if percentage > 100 {
            return Err(RolloutError::PercentageOutOfRange(percentage));
        }
        Ok(Self { percentage })
    }

    /// The configured percentage.
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Deterministic in/out decision for one identifier.
    ///
    /// Enabled iff `hash(identifier) mod 100 < percentage`; 0 disables
    /// everything, 100 enables everything.
    pub fn is_enabled(&self, identifier: &str) -> bool {
        bucket(identifier) < self.percentage
    }
}

/// The identifier's stable bucket in [0, 100).
fn bucket(identifier: &str) -> u8 {
    let digest = blake3::hash(identifier.as_bytes());
    // Low-order byte of the digest, little-endian view.
    digest.as_bytes()[0] % 100
}
