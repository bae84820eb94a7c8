use std::collections::HashSet;
use std::hash::Hash;

use crate::core::config::SimilarityWeights;
use crate::text::keywords::extract_keywords;
use crate::text::normalize::normalize;

use super::tfidf::{sparse_cosine, TfIdfModel};

/// Jaccard similarity of two sets
fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// Exact/lexical similarity: 1.0 for texts identical after normalization,
/// otherwise Jaccard over whitespace-split word sets. 0.0 when either side
/// is empty.
pub fn exact_similarity(text1: &str, text2: &str) -> f64 {
    let norm1 = normalize(text1);
    let norm2 = normalize(text2);

    if norm1.is_empty() || norm2.is_empty() {
        return 0.0;
    }
    if norm1 == norm2 {
        return 1.0;
    }

    let words1: HashSet<&str> = norm1.split_whitespace().collect();
    let words2: HashSet<&str> = norm2.split_whitespace().collect();
    jaccard(&words1, &words2)
}

/// Keyword overlap: Jaccard over the stemmed-and-surface keyword sets
pub fn keyword_similarity(text1: &str, text2: &str) -> f64 {
    let keywords1 = extract_keywords(text1);
    let keywords2 = extract_keywords(text2);
    jaccard(&keywords1, &keywords2)
}

/// TF-IDF cosine over exactly the two input texts. 0.0 when the vectorizer
/// cannot fit, e.g. both texts reduce to stop words only.
pub fn pair_tfidf_similarity(text1: &str, text2: &str) -> f64 {
    if text1.is_empty() || text2.is_empty() {
        return 0.0;
    }
    match TfIdfModel::fit(&[text1.to_string(), text2.to_string()]) {
        Some(model) => sparse_cosine(&model.transform(text1), &model.transform(text2)),
        None => 0.0,
    }
}

/// Merge the four signals into one score in [0, 1]
pub fn combine(
    weights: &SimilarityWeights,
    exact: f64,
    semantic: f64,
    tfidf: f64,
    keyword: f64,
) -> f64 {
    (exact * weights.exact
        + semantic * weights.semantic
        + tfidf * weights.tfidf
        + keyword * weights.keyword)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_identity() {
        assert_eq!(exact_similarity("What is Rust?", "what is  rust?"), 1.0);
    }

    #[test]
    fn test_exact_empty_inputs() {
        assert_eq!(exact_similarity("", "what is rust?"), 0.0);
        assert_eq!(exact_similarity("", ""), 0.0);
        assert_eq!(exact_similarity("???", "what"), 0.0);
    }

    #[test]
    fn test_exact_partial_overlap() {
        // "what is rust?" vs "what is go?": overlap {what, is} of 4 words
        let similarity = exact_similarity("what is rust?", "what is go?");
        assert!((similarity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_exact_symmetric() {
        let a = "Python is a programming language.";
        let b = "Is Python a language for programming?";
        assert_eq!(exact_similarity(a, b), exact_similarity(b, a));
    }

    #[test]
    fn test_keyword_identity_and_disjoint() {
        assert_eq!(
            keyword_similarity("boiling point of water", "boiling point of water"),
            1.0
        );
        assert_eq!(
            keyword_similarity("boiling point of water", "rust borrow checker"),
            0.0
        );
    }

    #[test]
    fn test_keyword_morphological_variance() {
        // Stemmed forms overlap even though surface forms differ
        let similarity = keyword_similarity("running programs", "run a program");
        assert!(similarity > 0.0);
    }

    #[test]
    fn test_pair_tfidf_identity() {
        let similarity =
            pair_tfidf_similarity("what is a borrow checker?", "what is a borrow checker?");
        assert!((similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pair_tfidf_stop_words_only() {
        assert_eq!(pair_tfidf_similarity("is the of", "a an and"), 0.0);
        assert_eq!(pair_tfidf_similarity("", "anything"), 0.0);
    }

    #[test]
    fn test_combine_weights_and_clamp() {
        let weights = SimilarityWeights::default();
        let combined = combine(&weights, 1.0, 1.0, 1.0, 1.0);
        assert!((combined - 1.0).abs() < 1e-9);

        let combined = combine(&weights, 1.0, 0.0, 0.0, 0.0);
        assert!((combined - 0.3).abs() < 1e-9);

        assert_eq!(combine(&weights, 0.0, 0.0, 0.0, 0.0), 0.0);
    }
}
