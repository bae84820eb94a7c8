use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

use super::normalize::normalize;
use super::stopwords::is_stop_word;

/// Extract the keyword set used for Jaccard comparison.
///
/// Tokens of length <= 2, stop words and pure punctuation are dropped. Both
/// the surface token and its stemmed form are kept: the doubled recall
/// tolerates minor morphological variance without a full lemmatizer.
pub fn extract_keywords(text: &str) -> HashSet<String> {
    let normalized = normalize(text);
    let stemmer = Stemmer::create(Algorithm::English);

    let mut keywords = HashSet::new();
    for raw in normalized.split_whitespace() {
        // Question marks survive normalization; detach them from the word
        let token = raw.trim_matches('?');
        if token.chars().count() <= 2
            || is_stop_word(token)
            || !token.chars().any(|c| c.is_alphanumeric())
        {
            continue;
        }
        keywords.insert(token.to_string());
        keywords.insert(stemmer.stem(token).to_string());
    }
    keywords
}
