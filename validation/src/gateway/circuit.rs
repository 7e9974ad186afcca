//! Circuit Breaker — repeated-error detection for the retry loop
//!
//! A pure frequency detector: it counts occurrences of identical error
//! messages (by fixed-width hash) and reports when one crosses a threshold.
//! It does not stop anything itself — the retry loop consults it and sets
//! the `triggered` flag when it decides to give up.

use std::collections::HashMap;

/// Width of an error signature, in hex characters (64 bits of the digest).
const SIGNATURE_WIDTH: usize = 16;

/// Fixed-width hash of an error message. Identical text always yields an
/// identical signature; blake3 keeps it stable across processes.
pub fn error_signature(message: &str) -> String {
    let digest = blake3::hash(message.as_bytes());
    let mut hex = digest.to_hex().to_string();
    hex.truncate(SIGNATURE_WIDTH);
    hex
}

/// Session-scoped repeated-error detector.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    /// signature → occurrences this session.
    counts: HashMap<String, u32>,
    /// Set by the caller once it decides to stop retrying.
    triggered: bool,
    /// Occurrences of one signature required before `should_break`.
    threshold: u32,
}

impl CircuitBreaker {
    /// Create a breaker with a validated threshold (the config layer is
    /// responsible for range-checking and fallback).
    pub fn new(threshold: u32) -> Self {
        Self {
            counts: HashMap::new(),
            triggered: false,
            threshold,
        }
    }

    /// Record one occurrence of an error message. Returns the new count
    /// for its signature.
    pub fn track(&mut self, message: &str) -> u32 {
        let count = self.counts.entry(error_signature(message)).or_insert(0);
        *count += 1;
        *count
    }

    /// Whether this message's signature has reached the threshold.
    pub fn should_break(&self, message: &str) -> bool {
        self.should_break_at(message, self.threshold)
    }

    /// `should_break` against an explicit threshold.
    pub fn should_break_at(&self, message: &str, threshold: u32) -> bool {
        self.counts
            .get(&error_signature(message))
            .is_some_and(|count| *count >= threshold)
    }

    /// Mark the circuit as open. Consulted by callers to short-circuit
    /// further retries.
    pub fn set_triggered(&mut self) {
        self.triggered = true;
    }

    /// Whether a caller has opened the circuit this session.
    pub fn triggered(&self) -> bool {
        self.triggered
    }

    /// The configured threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Clear the signature table and the triggered flag. Called between
    /// sessions (each retry cycle starts fresh).
    pub fn reset(&mut self) {
        self.counts.clear();
        self.triggered = false;
    }

    /// Distinct error signatures seen this session.
    pub fn distinct_errors(&self) -> usize {
        self.counts.len()
    }
}
