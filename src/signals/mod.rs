pub mod scorers;
pub mod tfidf;

pub use scorers::{combine, exact_similarity, keyword_similarity, pair_tfidf_similarity};
pub use tfidf::{pairwise_cosine, sparse_cosine, SparseVector, TfIdfModel};
