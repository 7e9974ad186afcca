//! Auto-Corrector — tiered field-name correction with calibrated confidence
//!
//! Given a name that may or may not resolve, tries a cascade of strategies
//! against the manifest and returns the first success with a fixed,
//! calibrated confidence:
//!
//! ```text
//! already valid            → 1.0        valid_field
//! known-mistake table hit  → 0.95       exact_match_known_mistake
//! substring of a canonical → 0.75       partial_match
//! fuzzy best score > 0.55  → 0.5–0.7    fuzzy_match
//! nothing                  → 0.0        no_match
//! ```
//!
//! The constants are calibration values, not incidental detail: tests and
//! downstream thresholds depend on them. Corrections are computed fresh per
//! call and never cached.

use crate::manifest::FieldManifest;
use crate::traits::SuggestionProvider;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Confidence for a known-mistake table hit.
const KNOWN_MISTAKE_CONFIDENCE: f64 = 0.95;
/// Confidence for a case-insensitive substring match.
const PARTIAL_MATCH_CONFIDENCE: f64 = 0.75;
/// Minimum composite similarity for a fuzzy candidate to count.
const FUZZY_SCORE_FLOOR: f64 = 0.55;
/// Fuzzy confidences map linearly into [0.5, 0.7].
const FUZZY_CONFIDENCE_BASE: f64 = 0.5;
const FUZZY_CONFIDENCE_SPAN: f64 = 0.2;

/// Coarse bucket summarizing a numeric confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// confidence == 0
    None,
    /// 0 < confidence < 0.7
    Low,
    /// 0.7 <= confidence < 0.9
    Medium,
    /// confidence >= 0.9
    High,
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Which cascade tier produced a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionReason {
    ValidField,
    ExactMatchKnownMistake,
    PartialMatch,
    FuzzyMatch,
    NoMatch,
}

impl std::fmt::Display for CorrectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidField => write!(f, "valid_field"),
            Self::ExactMatchKnownMistake => write!(f, "exact_match_known_mistake"),
            Self::PartialMatch => write!(f, "partial_match"),
            Self::FuzzyMatch => write!(f, "fuzzy_match"),
            Self::NoMatch => write!(f, "no_match"),
        }
    }
}

/// Result of one correction attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// The name as given.
    pub original: String,
    /// The proposed canonical name, absent when nothing plausible exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested: Option<String>,
    /// Calibrated confidence in [0, 1].
    pub confidence: f64,
    /// Coarse bucket of `confidence`.
    pub level: ConfidenceLevel,
    /// Which cascade tier fired.
    pub reason: CorrectionReason,
}

/// Classify a confidence score into its coarse bucket.
///
/// Pure function; monotonic; the four bands partition [0, 1] with no gaps.
pub fn classify(confidence: f64) -> ConfidenceLevel {
    if confidence >= 0.9 {
        ConfidenceLevel::High
    } else if confidence >= 0.7 {
        ConfidenceLevel::Medium
    } else if confidence > 0.0 {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::None
    }
}

/// Tiered field-name corrector over a shared manifest.
///
/// Holds only an `Arc` to the read-only manifest, so it is cheap to clone
/// and safe to call from multiple threads.
#[derive(Debug, Clone)]
pub struct AutoCorrector {
    manifest: Arc<FieldManifest>,
}

impl AutoCorrector {
    pub fn new(manifest: Arc<FieldManifest>) -> Self {
        Self { manifest }
    }

    /// Run the correction cascade for one name. First success wins.
    pub fn suggest(&self, name: &str) -> CorrectionResult {
        // Tier 1: already a valid alias or canonical name.
        if let Some(canonical) = self.manifest.canonicalize(name) {
            return self.result(name, Some(canonical.to_string()), 1.0, CorrectionReason::ValidField);
        }

        // Tier 2: documented frequent mistake.
        if let Some(canonical) = self.manifest.known_mistake(name) {
            return self.result(
                name,
                Some(canonical.to_string()),
                KNOWN_MISTAKE_CONFIDENCE,
                CorrectionReason::ExactMatchKnownMistake,
            );
        }

        if name.is_empty() {
            return self.result(name, None, 0.0, CorrectionReason::NoMatch);
        }

        // Tier 3: case-insensitive containment of the input inside a
        // canonical name. Canonical names are scanned in lexicographic
        // order so the first hit is reproducible.
        let needle = name.to_lowercase();
        for canonical in self.manifest.canonical_names() {
            if canonical.to_lowercase().contains(&needle) {
                return self.result(
                    name,
                    Some(canonical.clone()),
                    PARTIAL_MATCH_CONFIDENCE,
                    CorrectionReason::PartialMatch,
                );
            }
        }

        // Tier 4: fuzzy scan over canonical names and aliases.
        if let Some((candidate, score)) = self.best_fuzzy(name) {
            if score > FUZZY_SCORE_FLOOR {
                let confidence = FUZZY_CONFIDENCE_BASE
                    + ((score - FUZZY_SCORE_FLOOR) / (1.0 - FUZZY_SCORE_FLOOR)).min(1.0)
                        * FUZZY_CONFIDENCE_SPAN;
                // Suggest the canonical name even when an alias scored best:
                // a suggestion must itself be a resolvable field.
                let canonical = self
                    .manifest
                    .canonicalize(&candidate)
                    .unwrap_or(candidate.as_str())
                    .to_string();
                return self.result(name, Some(canonical), confidence, CorrectionReason::FuzzyMatch);
            }
        }

        self.result(name, None, 0.0, CorrectionReason::NoMatch)
    }

    /// Best-scoring candidate across canonical names and aliases, scanned
    /// in stable order. Strictly-greater comparison keeps the earliest of
    /// equal-scoring candidates.
    fn best_fuzzy(&self, name: &str) -> Option<(String, f64)> {
        let mut best: Option<(String, f64)> = None;
        for canonical in self.manifest.canonical_names() {
            let mut consider = |candidate: &str| {
                let score = similarity(name, candidate);
                if best.as_ref().map_or(true, |(_, s)| score > *s) {
                    best = Some((candidate.to_string(), score));
                }
            };
            consider(canonical);
            if let Some(aliases) = self.manifest.aliases_of(canonical) {
                for alias in aliases {
                    consider(alias);
                }
            }
        }
        best
    }

    fn result(
        &self,
        original: &str,
        suggested: Option<String>,
        confidence: f64,
        reason: CorrectionReason,
    ) -> CorrectionResult {
        CorrectionResult {
            original: original.to_string(),
            suggested,
            confidence,
            level: classify(confidence),
            reason,
        }
    }
}

impl SuggestionProvider for AutoCorrector {
    fn suggest_for(&self, name: &str) -> Option<String> {
        let correction = self.suggest(name);
        match correction.reason {
            // A name that is already valid needs no hint.
            CorrectionReason::ValidField | CorrectionReason::NoMatch => None,
            _ => correction
                .suggested
                .map(|s| format!("did you mean '{}'?", s)),
        }
    }
}

/// Composite similarity: 0.5 × character-set Jaccard + 0.3 × length ratio
/// + 0.2 containment bonus. Case-insensitive.
fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();
    let intersection = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    let jaccard = intersection / union;

    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let length_ratio = len_a.min(len_b) / len_a.max(len_b);

    let containment = if a.contains(&b) || b.contains(&a) {
        0.2
    } else {
        0.0
    };

    0.5 * jaccard + 0.3 * length_ratio + containment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::FieldManifest;

    fn corrector() -> AutoCorrector {
        AutoCorrector::new(Arc::new(FieldManifest::builtin()))
    }

    #[test]
    fn test_valid_field_is_full_confidence() {
        let result = corrector().suggest("close");
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.reason, CorrectionReason::ValidField);
        assert_eq!(result.level, ConfidenceLevel::High);
        assert_eq!(result.suggested.as_deref(), Some("收盤價"));
    }

    #[test]
    fn test_known_mistake_is_high_confidence() {
        let result = corrector().suggest("trading_volume");
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.reason, CorrectionReason::ExactMatchKnownMistake);
        assert_eq!(result.suggested.as_deref(), Some("成交金額"));
    }

    #[test]
    fn test_partial_match_is_medium_confidence() {
        // "收盤" is contained in the canonical name "收盤價".
        let result = corrector().suggest("收盤");
        assert_eq!(result.confidence, 0.75);
        assert_eq!(result.reason, CorrectionReason::PartialMatch);
        assert_eq!(result.level, ConfidenceLevel::Medium);
        assert_eq!(result.suggested.as_deref(), Some("收盤價"));
    }

    #[test]
    fn test_fuzzy_match_maps_into_band() {
        // "close_pric" is neither valid, a known mistake, nor a substring
        // of any canonical name, but is very close to the alias
        // "close_price" — similarity well above the 0.55 floor.
        let result = corrector().suggest("close_pric");
        assert_eq!(result.reason, CorrectionReason::FuzzyMatch);
        assert!(result.confidence >= 0.5 && result.confidence <= 0.7);
        assert_eq!(result.level, ConfidenceLevel::Low);
        // Alias hit is canonicalized.
        assert_eq!(result.suggested.as_deref(), Some("收盤價"));
    }

    #[test]
    fn test_gibberish_is_no_match() {
        let result = corrector().suggest("zzqx9");
        assert_eq!(result.confidence, 0.0);
        assert!(result.suggested.is_none());
        assert_eq!(result.reason, CorrectionReason::NoMatch);
        assert_eq!(result.level, ConfidenceLevel::None);
    }

    #[test]
    fn test_empty_input_is_no_match() {
        let result = corrector().suggest("");
        assert_eq!(result.confidence, 0.0);
        assert!(result.suggested.is_none());
    }

    #[test]
    fn test_classify_bands_partition_unit_interval() {
        assert_eq!(classify(0.95), ConfidenceLevel::High);
        assert_eq!(classify(0.9), ConfidenceLevel::High);
        assert_eq!(classify(0.8), ConfidenceLevel::Medium);
        assert_eq!(classify(0.7), ConfidenceLevel::Medium);
        assert_eq!(classify(0.6), ConfidenceLevel::Low);
        assert_eq!(classify(f64::MIN_POSITIVE), ConfidenceLevel::Low);
        assert_eq!(classify(0.0), ConfidenceLevel::None);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut last = ConfidenceLevel::None;
        for step in 0..=100 {
            let level = classify(step as f64 / 100.0);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn test_suggest_is_deterministic() {
        let corrector = corrector();
        let a = corrector.suggest("close_pric");
        let b = corrector.suggest("close_pric");
        assert_eq!(a.suggested, b.suggested);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn test_similarity_identical_strings() {
        // Jaccard 1.0, ratio 1.0, containment 0.2 → 1.0 total.
        assert!((similarity("close", "close") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_disjoint_strings() {
        assert_eq!(similarity("abc", "xyz"), 0.3 * 1.0);
    }

    #[test]
    fn test_suggestion_provider_formats_hint() {
        let corrector = corrector();
        let hint = corrector.suggest_for("trading_volume").unwrap();
        assert_eq!(hint, "did you mean '成交金額'?");
        // Valid names and hopeless names both yield no hint.
        assert!(corrector.suggest_for("close").is_none());
        assert!(corrector.suggest_for("zzqx9").is_none());
    }
}
