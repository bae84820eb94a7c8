//! Engine-level properties: signal symmetry and identity, threshold
//! monotonicity, representative dominance, mode consistency, idempotence.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use qdedup::engine::completeness_score;
use qdedup::signals::{
    combine, exact_similarity, keyword_similarity, pair_tfidf_similarity,
};
use qdedup::{
    DetectionMode, DetectionOutput, DetectorConfig, DuplicateDetector, QuestionRecord,
    QuestionType, SimilarityWeights, TextEmbedder,
};

struct BagEmbedder;

#[async_trait]
impl TextEmbedder for BagEmbedder {
    fn name(&self) -> &str {
        "bag-embedder"
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; 64];
                for token in text.to_lowercase().split_whitespace() {
                    let mut hasher = DefaultHasher::new();
                    token.hash(&mut hasher);
                    vector[(hasher.finish() % 64) as usize] += 1.0;
                }
                vector
            })
            .collect())
    }
}

fn graded_batch() -> Vec<QuestionRecord> {
    vec![
        QuestionRecord::new(QuestionType::TrueFalse, "What is the capital of France?"),
        QuestionRecord::new(QuestionType::TrueFalse, "What is the capital of France?"),
        QuestionRecord::new(QuestionType::TrueFalse, "What is the capital city of France?"),
        QuestionRecord::new(QuestionType::TrueFalse, "Name the capital of France."),
        QuestionRecord::new(QuestionType::TrueFalse, "Water boils at 100 degrees."),
        QuestionRecord::new(QuestionType::TrueFalse, ""),
    ]
}

async fn annotate_at(threshold: f64) -> (Vec<Option<u32>>, qdedup::DetectionReport) {
    let detector = DuplicateDetector::new(DetectorConfig::default())
        .unwrap()
        .with_embedder(Arc::new(BagEmbedder));
    let output = detector
        .detect_with_threshold(&graded_batch(), threshold, DetectionMode::Annotate)
        .await
        .unwrap();
    let DetectionOutput::Annotated { records, report } = output else {
        panic!("expected annotated output");
    };
    let ids = records
        .iter()
        .map(|r| r.annotation.as_ref().map(|a| a.group_id))
        .collect();
    (ids, report)
}

fn same_group(ids: &[Option<u32>], i: usize, j: usize) -> bool {
    matches!((ids[i], ids[j]), (Some(a), Some(b)) if a == b)
}

#[test]
fn signal_symmetry() {
    let pairs = [
        ("What is the capital of France?", "Name the capital of France."),
        ("Python is a programming language.", "Water boils at 100 degrees."),
        ("running programs quickly", "run the program"),
        ("", "non-empty"),
    ];
    for (a, b) in pairs {
        assert_eq!(exact_similarity(a, b), exact_similarity(b, a));
        assert_eq!(keyword_similarity(a, b), keyword_similarity(b, a));
        assert_eq!(pair_tfidf_similarity(a, b), pair_tfidf_similarity(b, a));
    }
}

#[test]
fn signal_identity() {
    let text = "What is the boiling point of water?";
    assert_eq!(exact_similarity(text, text), 1.0);
    assert_eq!(keyword_similarity(text, text), 1.0);
    assert!((pair_tfidf_similarity(text, text) - 1.0).abs() < 1e-9);

    let weights = SimilarityWeights::default();
    assert!((combine(&weights, 1.0, 1.0, 1.0, 1.0) - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn threshold_monotonicity() {
    let thresholds = [0.9, 0.7, 0.5, 0.3];
    let mut previous: Option<Vec<Option<u32>>> = None;

    for threshold in thresholds {
        let (ids, _) = annotate_at(threshold).await;
        if let Some(stricter) = &previous {
            // Lowering the threshold may only merge groups, never split:
            // group-mates at the stricter threshold stay group-mates
            let n = ids.len();
            for i in 0..n {
                for j in (i + 1)..n {
                    if same_group(stricter, i, j) {
                        assert!(
                            same_group(&ids, i, j),
                            "records {i} and {j} split when threshold dropped to {threshold}"
                        );
                    }
                }
            }
        }
        previous = Some(ids);
    }
}

#[tokio::test]
async fn exact_duplicates_merge_even_at_strict_threshold() {
    let (ids, _) = annotate_at(0.9).await;
    assert!(same_group(&ids, 0, 1));
    // The malformed record never joins a group
    assert_eq!(ids[5], None);
}

#[tokio::test]
async fn representative_dominance() {
    let detector = DuplicateDetector::new(DetectorConfig::default())
        .unwrap()
        .with_embedder(Arc::new(BagEmbedder));
    let records = graded_batch();
    let output = detector
        .detect_with_threshold(&records, 0.5, DetectionMode::Annotate)
        .await
        .unwrap();
    let DetectionOutput::Annotated { records: annotated, report } = output else {
        panic!("expected annotated output");
    };
    assert!(report.group_count >= 1);

    for summary in &report.groups {
        let members: Vec<&QuestionRecord> = annotated
            .iter()
            .filter(|r| {
                r.annotation.as_ref().map(|a| a.group_id) == Some(summary.group_id)
            })
            .map(|r| &r.record)
            .collect();
        let representative = annotated
            .iter()
            .find(|r| {
                r.annotation
                    .as_ref()
                    .is_some_and(|a| a.group_id == summary.group_id && a.representative)
            })
            .map(|r| &r.record)
            .expect("every group has a representative");

        for member in members {
            assert!(completeness_score(representative) >= completeness_score(member));
        }
    }
}

#[tokio::test]
async fn mode_consistency() {
    let detector = DuplicateDetector::new(DetectorConfig::default())
        .unwrap()
        .with_embedder(Arc::new(BagEmbedder));
    let records = graded_batch();

    let annotate = detector
        .detect_with_threshold(&records, 0.5, DetectionMode::Annotate)
        .await
        .unwrap();
    let DetectionOutput::Annotated { records: annotated, report } = annotate else {
        panic!("expected annotated output");
    };
    assert_eq!(annotated.len(), records.len());

    let remove = detector
        .detect_with_threshold(&records, 0.5, DetectionMode::Remove)
        .await
        .unwrap();
    let DetectionOutput::Filtered { kept, removed, .. } = remove else {
        panic!("expected filtered output");
    };

    // One kept record per distinct group, singletons included
    let group_total = records.len() - report.duplicate_question_count + report.group_count;
    assert_eq!(kept.len(), group_total);
    assert_eq!(kept.len() + removed.len(), records.len());
}

#[tokio::test]
async fn annotate_is_idempotent() {
    let detector = DuplicateDetector::new(DetectorConfig::default())
        .unwrap()
        .with_embedder(Arc::new(BagEmbedder));
    let records = graded_batch();

    let mut runs = Vec::new();
    for _ in 0..2 {
        let output = detector
            .detect_with_threshold(&records, 0.5, DetectionMode::Annotate)
            .await
            .unwrap();
        let DetectionOutput::Annotated { records: annotated, report } = output else {
            panic!("expected annotated output");
        };
        let annotations: Vec<_> = annotated.into_iter().map(|r| r.annotation).collect();
        runs.push((annotations, report.groups));
    }

    let (first_annotations, first_groups) = &runs[0];
    let (second_annotations, second_groups) = &runs[1];
    assert_eq!(first_annotations, second_annotations);
    assert_eq!(first_groups, second_groups);
}
