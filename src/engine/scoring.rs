use std::sync::Arc;

use crate::core::cache::PairCache;
use crate::core::config::SimilarityWeights;
use crate::embed::cosine_similarity;
use crate::signals::scorers::{
    combine, exact_similarity, keyword_similarity, pair_tfidf_similarity,
};

/// Everything a worker needs to score one pair: comparable texts, their
/// normalized forms, the batch embeddings (when the backend is healthy) and
/// the shared pair cache.
///
/// Pair scores are pure functions of the inputs, so concurrent cache races
/// and duplicate computation are benign.
pub struct ScoringContext {
    pub texts: Vec<String>,
    pub normalized: Vec<String>,
    pub embeddings: Option<Vec<Vec<f32>>>,
    pub weights: SimilarityWeights,
    pub cache: Option<Arc<PairCache>>,
}

impl ScoringContext {
    /// Combined similarity of records `i` and `j` in [0, 1].
    ///
    /// A record with empty comparable text scores 0 against everything,
    /// which leaves it a singleton after clustering.
    pub fn pair_score(&self, i: usize, j: usize) -> f64 {
        if self.normalized[i].is_empty() || self.normalized[j].is_empty() {
            return 0.0;
        }

        let key = PairCache::pair_key(&self.normalized[i], &self.normalized[j]);
        if let Some(cache) = &self.cache {
            if let Some(score) = cache.get(key) {
                return score;
            }
        }

        let exact = exact_similarity(&self.texts[i], &self.texts[j]);
        let keyword = keyword_similarity(&self.texts[i], &self.texts[j]);
        let tfidf = pair_tfidf_similarity(&self.texts[i], &self.texts[j]);
        let semantic = match &self.embeddings {
            Some(embeddings) => cosine_similarity(&embeddings[i], &embeddings[j]),
            None => 0.0,
        };

        let combined = combine(&self.weights, exact, semantic, tfidf, keyword);
        if let Some(cache) = &self.cache {
            cache.insert(key, combined);
        }
        combined
    }
}
