//! qdedup - duplicate exam-question detection and clustering.
//!
//! Given a batch of question records, the engine decides which records are
//! near-duplicates, groups them transitively, picks one representative per
//! group and renders the result either as per-record annotations or as a
//! filtered list with removal entries.
//!
//! Four similarity signals (exact/lexical, keyword overlap, TF-IDF cosine,
//! semantic embedding cosine) are merged under fixed weights; a corpus-wide
//! TF-IDF prefilter keeps the expensive signals off the full O(n^2) pair
//! space. The embedding backend is an injected service and its absence only
//! degrades precision, never fails a run.

// Core infrastructure modules
pub mod core {
    pub mod cache;
    pub mod config;
    pub mod errors;
}

pub mod embed;
pub mod engine;
pub mod record;
pub mod signals;
pub mod text;

// Re-exports for convenience
pub use crate::core::cache::{CacheStats, PairCache};
pub use crate::core::config::{DetectorConfig, SimilarityWeights};
pub use crate::core::errors::{DedupError, Result};
pub use embed::TextEmbedder;
pub use engine::{DetectionMode, DetectionOutput, DuplicateDetector};
pub use record::{
    AnnotatedRecord, DetectionReport, DuplicateAnnotation, GroupMember, GroupSummary,
    QuestionRecord, QuestionType, RemovalEntry, WrittenKind,
};

/// Annotate duplicate questions without removing them. Convenience wrapper
/// over a default detector (no embedding backend, so the semantic signal is
/// degraded).
pub async fn annotate_duplicates(
    records: &[QuestionRecord],
    threshold: f64,
) -> Result<(Vec<AnnotatedRecord>, DetectionReport)> {
    let detector = DuplicateDetector::default();
    match detector
        .detect_with_threshold(records, threshold, DetectionMode::Annotate)
        .await?
    {
        DetectionOutput::Annotated { records, report } => Ok((records, report)),
        DetectionOutput::Filtered { .. } => {
            Err(DedupError::internal("annotate mode produced filtered output"))
        }
    }
}

/// Remove duplicate questions, keeping one representative per group.
/// Convenience wrapper over a default detector.
pub async fn remove_duplicates(
    records: &[QuestionRecord],
    threshold: f64,
) -> Result<(Vec<QuestionRecord>, Vec<RemovalEntry>, DetectionReport)> {
    let detector = DuplicateDetector::default();
    match detector
        .detect_with_threshold(records, threshold, DetectionMode::Remove)
        .await?
    {
        DetectionOutput::Filtered {
            kept,
            removed,
            report,
        } => Ok((kept, removed, report)),
        DetectionOutput::Annotated { .. } => {
            Err(DedupError::internal("remove mode produced annotated output"))
        }
    }
}
