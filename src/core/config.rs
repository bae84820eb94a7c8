use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::errors::{DedupError, Result};

/// Weight factors for the four similarity signals.
///
/// This is the single configuration point for the combination policy; the
/// scoring code never carries weight literals of its own. The defaults are
/// policy, not derived, and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Weight for exact/lexical similarity (default: 0.3)
    pub exact: f64,
    /// Weight for semantic embedding similarity (default: 0.4)
    pub semantic: f64,
    /// Weight for TF-IDF cosine similarity (default: 0.2)
    pub tfidf: f64,
    /// Weight for keyword overlap (default: 0.1)
    pub keyword: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            exact: 0.3,
            semantic: 0.4,
            tfidf: 0.2,
            keyword: 0.1,
        }
    }
}

impl SimilarityWeights {
    /// Rescale weights to sum to 1.0.
    pub fn normalize(&mut self) {
        let sum = self.exact + self.semantic + self.tfidf + self.keyword;
        if sum > 0.0 {
            self.exact /= sum;
            self.semantic /= sum;
            self.tfidf /= sum;
            self.keyword /= sum;
        }
    }

    pub fn sum(&self) -> f64 {
        self.exact + self.semantic + self.tfidf + self.keyword
    }

    fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("weights.exact", self.exact),
            ("weights.semantic", self.semantic),
            ("weights.tfidf", self.tfidf),
            ("weights.keyword", self.keyword),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(DedupError::configuration_field(
                    "similarity weights must be finite and non-negative",
                    name,
                ));
            }
        }
        if self.sum() <= 0.0 {
            return Err(DedupError::configuration(
                "similarity weights must not all be zero",
            ));
        }
        Ok(())
    }
}

/// Configuration for detection behavior
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Combined-similarity decision threshold in [0.0, 1.0]
    pub similarity_threshold: f64,
    /// Signal combination weights
    pub weights: SimilarityWeights,
    /// Coarse TF-IDF cutoff for candidate pairs, independent of the decision
    /// threshold. Duplicates phrased with no shared vocabulary can fall below
    /// this and be missed; tune it down to trade speed for recall.
    pub prefilter_threshold: f64,
    /// Maximum concurrent scoring workers
    pub max_workers: usize,
    /// Overall deadline for one detection run; `None` means unbounded
    pub detection_timeout: Option<Duration>,
    /// Deadline for the one-shot batched embedding call
    pub embed_timeout: Duration,
    /// Whether to cache pair scores across workers and calls
    pub use_cache: bool,
    /// Maximum number of cached pair scores
    pub max_cache_entries: usize,
    /// Written answers at or below this length are excluded from the
    /// comparable text
    pub min_answer_chars: usize,
}

/// Worker pool size: available cores, capped at a small constant
fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(8)
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            weights: SimilarityWeights::default(),
            prefilter_threshold: 0.3,
            max_workers: default_worker_count(),
            detection_timeout: None,
            embed_timeout: Duration::from_secs(60),
            use_cache: true,
            max_cache_entries: 100_000,
            min_answer_chars: 20,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.similarity_threshold)?;
        if !(0.0..=1.0).contains(&self.prefilter_threshold) {
            return Err(DedupError::configuration_field(
                "prefilter threshold must be within [0.0, 1.0]",
                "prefilter_threshold",
            )
            .with_expectation("0.0..=1.0", format!("{}", self.prefilter_threshold)));
        }
        if self.max_workers == 0 {
            return Err(DedupError::configuration_field(
                "max_workers cannot be zero",
                "max_workers",
            ));
        }
        if self.embed_timeout.is_zero() {
            return Err(DedupError::configuration_field(
                "embed_timeout cannot be zero",
                "embed_timeout",
            ));
        }
        if self.use_cache && self.max_cache_entries == 0 {
            return Err(DedupError::configuration_field(
                "max_cache_entries cannot be zero when caching is enabled",
                "max_cache_entries",
            ));
        }
        self.weights.validate()
    }
}

/// Validate a decision threshold. Out-of-range input is rejected rather than
/// clamped.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(DedupError::configuration_field(
            "similarity threshold must be within [0.0, 1.0]",
            "similarity_threshold",
        )
        .with_expectation("0.0..=1.0", format!("{}", threshold)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.prefilter_threshold, 0.3);
        assert!(config.max_workers >= 1 && config.max_workers <= 8);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = SimilarityWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_rejected_not_clamped() {
        let mut config = DetectorConfig::default();
        config.similarity_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "configuration");

        config.similarity_threshold = -0.1;
        assert!(config.validate().is_err());

        config.similarity_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weight_normalization() {
        let mut weights = SimilarityWeights {
            exact: 3.0,
            semantic: 4.0,
            tfidf: 2.0,
            keyword: 1.0,
        };
        weights.normalize();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!((weights.exact - 0.3).abs() < 1e-9);
        assert!((weights.semantic - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = DetectorConfig::default();
        config.weights.semantic = -0.4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = DetectorConfig::default();
        config.max_workers = 0;
        assert!(config.validate().is_err());
    }
}
