//! Metrics Boundary — per-unit validation samples for observability
//!
//! The gateway emits one [`ValidationSample`] per validated strategy to an
//! injected [`MetricsCollector`]. Aggregation, export formatting
//! (Prometheus, CloudWatch, …), and persistence all live behind the trait,
//! outside this crate. An in-memory collector is provided so tests and
//! small deployments can observe the stream without wiring an exporter.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One validated strategy, as seen by the metrics boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSample {
    /// Identifier of the validated strategy (its config `name`).
    pub strategy_id: String,
    /// Whether any validation layer actually ran.
    pub validation_enabled: bool,
    /// Error-severity issues attributed to field resolution.
    pub field_error_count: usize,
    /// Whether the unit passed validation overall.
    pub llm_success: bool,
    /// End-to-end validation latency in milliseconds.
    pub latency_ms: f64,
}

/// Sink for validation samples. Implementations must be thread-safe; the
/// gateway may record from multiple threads.
pub trait MetricsCollector: Send + Sync {
    fn record(&self, sample: &ValidationSample);
}

/// Aggregate view of an [`InMemoryMetricsCollector`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub samples: usize,
    pub successes: usize,
    pub field_errors: usize,
    pub total_latency_ms: f64,
}

impl MetricsSnapshot {
    /// Mean validation latency, 0 when nothing was recorded.
    pub fn mean_latency_ms(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_latency_ms / self.samples as f64
        }
    }
}

/// Reference collector keeping running aggregates in memory.
#[derive(Debug, Default)]
pub struct InMemoryMetricsCollector {
    inner: Mutex<MetricsSnapshot>,
}

impl InMemoryMetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current aggregates.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().expect("metrics lock poisoned").clone()
    }
}

impl MetricsCollector for InMemoryMetricsCollector {
    fn record(&self, sample: &ValidationSample) {
        let mut inner = self.inner.lock().expect("metrics lock poisoned");
        inner.samples += 1;
        if sample.llm_success {
            inner.successes += 1;
        }
        inner.field_errors += sample.field_error_count;
        inner.total_latency_ms += sample.latency_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(success: bool, field_errors: usize, latency: f64) -> ValidationSample {
        ValidationSample {
            strategy_id: "s".into(),
            validation_enabled: true,
            field_error_count: field_errors,
            llm_success: success,
            latency_ms: latency,
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let collector = InMemoryMetricsCollector::new();
        let snap = collector.snapshot();
        assert_eq!(snap.samples, 0);
        assert_eq!(snap.mean_latency_ms(), 0.0);
    }

    #[test]
    fn test_aggregation() {
        let collector = InMemoryMetricsCollector::new();
        collector.record(&sample(true, 0, 2.0));
        collector.record(&sample(false, 3, 4.0));
        let snap = collector.snapshot();
        assert_eq!(snap.samples, 2);
        assert_eq!(snap.successes, 1);
        assert_eq!(snap.field_errors, 3);
        assert!((snap.mean_latency_ms() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_json_roundtrip() {
        let s = sample(true, 1, 0.5);
        let json = serde_json::to_string(&s).unwrap();
        let restored: ValidationSample = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.strategy_id, "s");
        assert!(restored.llm_success);
    }
}
