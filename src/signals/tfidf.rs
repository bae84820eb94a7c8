use ndarray::Array2;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;

use crate::text::normalize::normalize;
use crate::text::stopwords::is_stop_word;

/// An l2-normalized sparse TF-IDF vector, term index -> weight
pub type SparseVector = HashMap<usize, f64>;

/// TF-IDF vectorizer over unigrams and bigrams of stop-word-filtered,
/// stemmed tokens, with smoothed inverse document frequency.
///
/// Fit is per call site: the pair signal fits over exactly two texts, the
/// prefilter fits once over the whole corpus.
#[derive(Debug)]
pub struct TfIdfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// Unigram + bigram terms of one document
fn terms(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    let normalized = normalize(text);

    let tokens: Vec<String> = normalized
        .split_whitespace()
        .map(|raw| raw.trim_matches('?'))
        .filter(|t| t.chars().count() >= 2 && !is_stop_word(t))
        .map(|t| stemmer.stem(t).to_string())
        .collect();

    let mut out = tokens.clone();
    for pair in tokens.windows(2) {
        out.push(format!("{} {}", pair[0], pair[1]));
    }
    out
}

impl TfIdfModel {
    /// Fit a model over the documents. Returns `None` when fewer than two
    /// documents produce at least one term, which downstream treats as the
    /// vectorizer-failure case.
    pub fn fit(docs: &[String]) -> Option<Self> {
        let per_doc_terms: Vec<Vec<String>> = docs.iter().map(|d| terms(d)).collect();
        if per_doc_terms.iter().filter(|t| !t.is_empty()).count() < 2 {
            return None;
        }

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();
        for doc_terms in &per_doc_terms {
            let mut seen: Vec<usize> = Vec::new();
            for term in doc_terms {
                let index = match vocabulary.get(term) {
                    Some(&index) => index,
                    None => {
                        let index = vocabulary.len();
                        vocabulary.insert(term.clone(), index);
                        document_frequency.push(0);
                        index
                    }
                };
                if !seen.contains(&index) {
                    seen.push(index);
                    document_frequency[index] += 1;
                }
            }
        }

        let n = docs.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Some(Self { vocabulary, idf })
    }

    /// Transform a document into an l2-normalized sparse vector. Documents
    /// with no in-vocabulary terms map to the zero vector.
    pub fn transform(&self, doc: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms(doc) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        for (index, value) in counts.iter_mut() {
            *value *= self.idf[*index];
        }

        let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }
        counts
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Cosine similarity of two l2-normalized sparse vectors
pub fn sparse_cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(index, value)| large.get(index).map(|other| value * other))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Full pairwise cosine matrix over the corpus, computed once for the
/// candidate prefilter. `None` when the corpus fit fails.
pub fn pairwise_cosine(docs: &[String]) -> Option<Array2<f64>> {
    let model = TfIdfModel::fit(docs)?;
    let vectors: Vec<SparseVector> = docs.iter().map(|d| model.transform(d)).collect();

    let n = docs.len();
    let mut matrix = Array2::zeros((n, n));
    for i in 0..n {
        if !vectors[i].is_empty() {
            matrix[[i, i]] = 1.0;
        }
        for j in (i + 1)..n {
            let similarity = sparse_cosine(&vectors[i], &vectors[j]);
            matrix[[i, j]] = similarity;
            matrix[[j, i]] = similarity;
        }
    }
    Some(matrix)
}
