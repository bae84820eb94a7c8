use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

use crate::record::{
    AnnotatedRecord, DetectionReport, DuplicateAnnotation, GroupMember, GroupSummary,
    QuestionRecord, RemovalEntry,
};

use super::representative::select_representative;
use super::scoring::ScoringContext;

/// How detection results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    /// Keep every record, attach group annotations to members of groups of
    /// size > 1
    Annotate,
    /// Keep one representative per group, emit a removal entry for every
    /// other member
    Remove,
}

/// Result of one detection run
#[derive(Debug, Clone)]
pub enum DetectionOutput {
    Annotated {
        records: Vec<AnnotatedRecord>,
        report: DetectionReport,
    },
    Filtered {
        kept: Vec<QuestionRecord>,
        removed: Vec<RemovalEntry>,
        report: DetectionReport,
    },
}

impl DetectionOutput {
    pub fn report(&self) -> &DetectionReport {
        match self {
            Self::Annotated { report, .. } => report,
            Self::Filtered { report, .. } => report,
        }
    }
}

/// Degraded-signal and prefilter observations carried into the report
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunStats {
    pub candidate_pair_count: usize,
    pub semantic_degraded: bool,
    pub tfidf_degraded: bool,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn report_text(text: &str) -> String {
    text.chars().take(120).collect()
}

/// Render clustered groups as the caller-facing output for `mode`.
///
/// Member similarity is recomputed once against the group representative
/// rather than inherited from clustering, since cluster membership may be
/// transitive. The representative itself is 1.0 by definition.
pub(crate) fn project(
    records: &[QuestionRecord],
    groups: &[Vec<usize>],
    ctx: &ScoringContext,
    mode: DetectionMode,
    threshold: f64,
    stats: RunStats,
    started: Instant,
) -> DetectionOutput {
    let mut summaries: Vec<GroupSummary> = Vec::new();
    let mut duplicate_question_count = 0usize;

    // (group assignments by record index; only groups of size > 1 get ids)
    let mut annotations: Vec<Option<DuplicateAnnotation>> = vec![None; records.len()];
    let mut representatives: Vec<usize> = Vec::with_capacity(groups.len());

    let mut group_id = 0u32;
    for members in groups {
        let representative = select_representative(members, records);
        representatives.push(representative);

        if members.len() <= 1 {
            continue;
        }
        group_id += 1;
        duplicate_question_count += members.len();

        let mut group_members = Vec::with_capacity(members.len());
        for &index in members {
            let similarity = if index == representative {
                1.0
            } else {
                round4(ctx.pair_score(index, representative))
            };
            annotations[index] = Some(DuplicateAnnotation {
                group_id,
                representative: index == representative,
                similarity,
            });
            group_members.push(GroupMember {
                question_text: report_text(&records[index].question),
                is_representative: index == representative,
                similarity,
            });
        }

        debug!(
            group_id,
            size = members.len(),
            representative,
            "duplicate group assembled"
        );
        summaries.push(GroupSummary {
            group_id,
            size: members.len(),
            representative_text: report_text(&records[representative].question),
            members: group_members,
        });
    }

    let report = DetectionReport {
        group_count: summaries.len(),
        groups: summaries,
        duplicate_question_count,
        similarity_threshold: threshold,
        candidate_pair_count: stats.candidate_pair_count,
        semantic_degraded: stats.semantic_degraded,
        tfidf_degraded: stats.tfidf_degraded,
        elapsed_ms: started.elapsed().as_millis() as u64,
        generated_at: Utc::now(),
    };

    info!(
        groups = report.group_count,
        duplicates = report.duplicate_question_count,
        elapsed_ms = report.elapsed_ms,
        "duplicate detection finished"
    );

    match mode {
        DetectionMode::Annotate => {
            let annotated = records
                .iter()
                .cloned()
                .zip(annotations)
                .map(|(record, annotation)| AnnotatedRecord { record, annotation })
                .collect();
            DetectionOutput::Annotated {
                records: annotated,
                report,
            }
        }
        DetectionMode::Remove => {
            let mut kept = Vec::with_capacity(groups.len());
            let mut removed = Vec::new();
            for (members, &representative) in groups.iter().zip(&representatives) {
                kept.push(records[representative].clone());
                for &index in members {
                    if index != representative {
                        removed.push(RemovalEntry {
                            question: records[index].clone(),
                            kept_instead: records[representative].clone(),
                            similarity: round4(ctx.pair_score(index, representative)),
                        });
                    }
                }
            }
            DetectionOutput::Filtered {
                kept,
                removed,
                report,
            }
        }
    }
}
