use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// English stop words filtered out of keyword sets and TF-IDF vocabularies
    static ref STOP_WORDS: HashSet<&'static str> = [
        "a", "about", "above", "after", "again", "against", "all", "am", "an",
        "and", "any", "are", "aren", "as", "at", "be", "because", "been",
        "before", "being", "below", "between", "both", "but", "by", "can",
        "cannot", "could", "couldn", "did", "didn", "do", "does", "doesn",
        "doing", "don", "down", "during", "each", "few", "for", "from",
        "further", "had", "hadn", "has", "hasn", "have", "haven", "having",
        "he", "her", "here", "hers", "herself", "him", "himself", "his",
        "how", "i", "if", "in", "into", "is", "isn", "it", "its", "itself",
        "just", "may", "me", "might", "more", "most", "must", "mustn", "my",
        "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
        "only", "or", "other", "ought", "our", "ours", "ourselves", "out",
        "over", "own", "same", "shall", "shan", "she", "should", "shouldn",
        "so", "some", "such", "than", "that", "the", "their", "theirs",
        "them", "themselves", "then", "there", "these", "they", "this",
        "those", "through", "to", "too", "under", "until", "up", "very",
        "was", "wasn", "we", "were", "weren", "what", "when", "where",
        "which", "while", "who", "whom", "why", "will", "with", "won",
        "would", "wouldn", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect();
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}
