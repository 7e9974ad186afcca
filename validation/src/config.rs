//! Guard Configuration — explicit layer flags and tunables
//!
//! One plain struct, constructed once and passed by reference into the
//! gateway. There is no process-wide flag singleton: tests build varied
//! configurations side by side without touching the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `GUARD_FIELD_VALIDATION_ENABLED` | `true` | Manifest-backed field checks (layer 1) |
//! | `GUARD_CODE_VALIDATION_ENABLED` | `true` | AST code checks (layer 2, requires layer 1) |
//! | `GUARD_CONFIG_VALIDATION_ENABLED` | `true` | Structural config checks (layer 3) |
//! | `GUARD_CIRCUIT_BREAKER_THRESHOLD` | `2` | Identical-error repeats before breaking, in [1, 10] |
//! | `GUARD_ROLLOUT_PERCENTAGE` | `10` | Staged-rollout percentage, in [0, 100] |
//!
//! Malformed numeric values never fail construction: they fall back to the
//! documented default with a logged warning.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default circuit-breaker threshold.
pub const DEFAULT_CIRCUIT_THRESHOLD: u32 = 2;
/// Valid circuit-breaker threshold range.
pub const CIRCUIT_THRESHOLD_RANGE: (u32, u32) = (1, 10);
/// Default rollout percentage.
pub const DEFAULT_ROLLOUT_PERCENTAGE: u8 = 10;

/// Per-layer toggles and gateway tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Layer 1: manifest-backed field checks.
    pub field_validation_enabled: bool,
    /// Layer 2: AST code checks. Only effective when layer 1 is enabled
    /// too — the code validator needs the manifest.
    pub code_validation_enabled: bool,
    /// Layer 3: structural config checks. Independent of the other layers.
    pub config_validation_enabled: bool,
    /// Identical-error repeats before the circuit breaker trips.
    pub circuit_breaker_threshold: u32,
    /// Staged-rollout percentage for `Gateway::in_rollout`.
    pub rollout_percentage: u8,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            field_validation_enabled: true,
            code_validation_enabled: true,
            config_validation_enabled: true,
            circuit_breaker_threshold: DEFAULT_CIRCUIT_THRESHOLD,
            rollout_percentage: DEFAULT_ROLLOUT_PERCENTAGE,
        }
    }
}

impl GuardConfig {
    /// Read configuration from `GUARD_*` environment variables, falling
    /// back to defaults (with a warning) on malformed values.
    pub fn from_env() -> Self {
        Self {
            field_validation_enabled: parse_flag("GUARD_FIELD_VALIDATION_ENABLED", true),
            code_validation_enabled: parse_flag("GUARD_CODE_VALIDATION_ENABLED", true),
            config_validation_enabled: parse_flag("GUARD_CONFIG_VALIDATION_ENABLED", true),
            circuit_breaker_threshold: parse_threshold(
                std::env::var("GUARD_CIRCUIT_BREAKER_THRESHOLD").ok().as_deref(),
            ),
            rollout_percentage: parse_percentage(
                std::env::var("GUARD_ROLLOUT_PERCENTAGE").ok().as_deref(),
            ),
        }
    }

    /// All layers disabled (every gateway entry point degrades to
    /// trivially-valid outcomes).
    pub fn all_disabled() -> Self {
        Self {
            field_validation_enabled: false,
            code_validation_enabled: false,
            config_validation_enabled: false,
            ..Self::default()
        }
    }

    /// Names of the enabled layers.
    pub fn enabled_layers(&self) -> Vec<&'static str> {
        let mut layers = Vec::new();
        if self.field_validation_enabled {
            layers.push("fields");
        }
        if self.code_validation_enabled {
            layers.push("code");
        }
        if self.config_validation_enabled {
            layers.push("config");
        }
        layers
    }

    /// Whether any validation layer is enabled.
    pub fn any_enabled(&self) -> bool {
        self.field_validation_enabled
            || self.code_validation_enabled
            || self.config_validation_enabled
    }
}

impl std::fmt::Display for GuardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fields={} code={} config={} breaker_threshold={} rollout={}%",
            flag_str(self.field_validation_enabled),
            flag_str(self.code_validation_enabled),
            flag_str(self.config_validation_enabled),
            self.circuit_breaker_threshold,
            self.rollout_percentage,
        )
    }
}

/// Parse a boolean flag. Accepts "1"/"true"/"yes" and "0"/"false"/"no"
/// (case-insensitive); anything else keeps the default with a warning.
fn parse_flag(var: &str, default: bool) -> bool {
    match std::env::var(var) {
        Ok(value) => parse_flag_value(var, &value, default),
        Err(_) => default,
    }
}

fn parse_flag_value(var: &str, value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => true,
        "0" | "false" | "no" => false,
        other => {
            warn!(var, value = other, default, "unrecognized flag value, using default");
            default
        }
    }
}

/// Parse the circuit-breaker threshold; out-of-range or non-numeric values
/// fall back to the default with a warning, never a hard failure.
fn parse_threshold(value: Option<&str>) -> u32 {
    let Some(raw) = value else {
        return DEFAULT_CIRCUIT_THRESHOLD;
    };
    let (lo, hi) = CIRCUIT_THRESHOLD_RANGE;
    match raw.trim().parse::<u32>() {
        Ok(n) if (lo..=hi).contains(&n) => n,
        Ok(n) => {
            warn!(
                value = n,
                default = DEFAULT_CIRCUIT_THRESHOLD,
                "circuit-breaker threshold outside [1, 10], using default"
            );
            DEFAULT_CIRCUIT_THRESHOLD
        }
        Err(_) => {
            warn!(
                value = raw,
                default = DEFAULT_CIRCUIT_THRESHOLD,
                "non-numeric circuit-breaker threshold, using default"
            );
            DEFAULT_CIRCUIT_THRESHOLD
        }
    }
}

/// Parse the rollout percentage with the same fallback policy.
fn parse_percentage(value: Option<&str>) -> u8 {
    let Some(raw) = value else {
        return DEFAULT_ROLLOUT_PERCENTAGE;
    };
    match raw.trim().parse::<u8>() {
        Ok(n) if n <= 100 => n,
        _ => {
            warn!(
                value = raw,
                default = DEFAULT_ROLLOUT_PERCENTAGE,
                "invalid rollout percentage, using default"
            );
            DEFAULT_ROLLOUT_PERCENTAGE
        }
    }
}

fn flag_str(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuardConfig::default();
        assert!(config.field_validation_enabled);
        assert!(config.code_validation_enabled);
        assert!(config.config_validation_enabled);
        assert_eq!(config.circuit_breaker_threshold, 2);
        assert_eq!(config.rollout_percentage, 10);
    }

    #[test]
    fn test_flag_value_parsing() {
        // Test the parsing logic directly; env-var tests race across threads.
        assert!(parse_flag_value("V", "1", false));
        assert!(parse_flag_value("V", "TRUE", false));
        assert!(parse_flag_value("V", "Yes", false));
        assert!(!parse_flag_value("V", "0", true));
        assert!(!parse_flag_value("V", "false", true));
        assert!(!parse_flag_value("V", "No", true));
        // Unrecognized keeps the default either way.
        assert!(parse_flag_value("V", "maybe", true));
        assert!(!parse_flag_value("V", "maybe", false));
    }

    #[test]
    fn test_threshold_fallbacks() {
        assert_eq!(parse_threshold(None), 2);
        assert_eq!(parse_threshold(Some("5")), 5);
        assert_eq!(parse_threshold(Some("1")), 1);
        assert_eq!(parse_threshold(Some("10")), 10);
        assert_eq!(parse_threshold(Some("0")), 2);
        assert_eq!(parse_threshold(Some("11")), 2);
        assert_eq!(parse_threshold(Some("lots")), 2);
        assert_eq!(parse_threshold(Some("-3")), 2);
    }

    #[test]
    fn test_percentage_fallbacks() {
        assert_eq!(parse_percentage(None), 10);
        assert_eq!(parse_percentage(Some("0")), 0);
        assert_eq!(parse_percentage(Some("100")), 100);
        assert_eq!(parse_percentage(Some("101")), 10);
        assert_eq!(parse_percentage(Some("half")), 10);
    }

    #[test]
    fn test_enabled_layers() {
        let mut config = GuardConfig::default();
        assert_eq!(config.enabled_layers(), vec!["fields", "code", "config"]);
        config.code_validation_enabled = false;
        assert_eq!(config.enabled_layers(), vec!["fields", "config"]);
        assert!(config.any_enabled());
        assert!(!GuardConfig::all_disabled().any_enabled());
    }

    #[test]
    fn test_display() {
        let config = GuardConfig::default();
        let text = config.to_string();
        assert!(text.contains("fields=ON"));
        assert!(text.contains("breaker_threshold=2"));
        assert!(text.contains("rollout=10%"));
    }
}
