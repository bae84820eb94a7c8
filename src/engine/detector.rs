use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::cache::{CacheStats, PairCache};
use crate::core::config::{validate_threshold, DetectorConfig};
use crate::core::errors::{DedupError, Result};
use crate::embed::TextEmbedder;
use crate::record::QuestionRecord;
use crate::signals::tfidf::pairwise_cosine;
use crate::text::normalize::{comparable_text, normalize};

use super::project::{project, DetectionMode, DetectionOutput, RunStats};
use super::scoring::ScoringContext;
use super::union_find::UnionFind;

/// Duplicate-question detection engine.
///
/// Construct once and reuse across batches: the pair cache and the injected
/// embedding backend are shared between calls. The input slice is only read;
/// a failed run (timeout, cancellation) leaves the caller's records exactly
/// as they were.
pub struct DuplicateDetector {
    config: DetectorConfig,
    embedder: Option<Arc<dyn TextEmbedder>>,
    cache: Arc<PairCache>,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        // Default config is statically valid
        Self::new(DetectorConfig::default()).expect("default config must validate")
    }
}

impl DuplicateDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(PairCache::new(config.max_cache_entries));
        Ok(Self {
            config,
            embedder: None,
            cache,
        })
    }

    /// Inject the sentence-embedding backend. Without one the semantic
    /// signal contributes 0 for all pairs (degraded mode, not a failure).
    pub fn with_embedder(mut self, embedder: Arc<dyn TextEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Pay the embedding backend's initialization cost before the first real
    /// batch. Returns whether the semantic signal will be available.
    pub async fn warm_up(&self) -> bool {
        let Some(embedder) = &self.embedder else {
            debug!("no embedding backend configured; skipping warm-up");
            return false;
        };
        let probe = vec!["warm up".to_string()];
        match timeout(self.config.embed_timeout, embedder.embed_batch(&probe)).await {
            Ok(Ok(_)) => {
                info!(backend = embedder.name(), "embedding backend ready");
                true
            }
            Ok(Err(error)) => {
                warn!(backend = embedder.name(), %error, "embedding backend warm-up failed");
                false
            }
            Err(_) => {
                warn!(
                    backend = embedder.name(),
                    timeout_ms = self.config.embed_timeout.as_millis() as u64,
                    "embedding backend warm-up timed out"
                );
                false
            }
        }
    }

    /// Detect duplicates at the configured threshold
    pub async fn detect(
        &self,
        records: &[QuestionRecord],
        mode: DetectionMode,
    ) -> Result<DetectionOutput> {
        self.detect_with_threshold(records, self.config.similarity_threshold, mode)
            .await
    }

    /// Detect duplicates at a per-call threshold, validated in [0.0, 1.0]
    /// before any work begins
    pub async fn detect_with_threshold(
        &self,
        records: &[QuestionRecord],
        threshold: f64,
        mode: DetectionMode,
    ) -> Result<DetectionOutput> {
        self.detect_with_cancel(records, threshold, mode, Arc::new(AtomicBool::new(false)))
            .await
    }

    /// Full-control variant: the caller holds the cancellation flag. Setting
    /// it stops workers at the next pair boundary and the run returns
    /// `DedupError::Cancelled`.
    pub async fn detect_with_cancel(
        &self,
        records: &[QuestionRecord],
        threshold: f64,
        mode: DetectionMode,
        cancel: Arc<AtomicBool>,
    ) -> Result<DetectionOutput> {
        validate_threshold(threshold)?;

        match self.config.detection_timeout {
            Some(limit) => {
                match timeout(limit, self.run(records, threshold, mode, cancel.clone())).await {
                    Ok(result) => result,
                    Err(_) => {
                        // Detached workers observe the flag and stop
                        cancel.store(true, Ordering::Relaxed);
                        Err(DedupError::timeout(
                            "duplicate detection",
                            limit.as_millis() as u64,
                        ))
                    }
                }
            }
            None => self.run(records, threshold, mode, cancel).await,
        }
    }

    async fn run(
        &self,
        records: &[QuestionRecord],
        threshold: f64,
        mode: DetectionMode,
        cancel: Arc<AtomicBool>,
    ) -> Result<DetectionOutput> {
        let started = Instant::now();
        let n = records.len();
        info!(records = n, threshold, "starting duplicate detection");

        let texts: Vec<String> = records
            .iter()
            .map(|r| comparable_text(r, self.config.min_answer_chars))
            .collect();
        let normalized: Vec<String> = texts.iter().map(|t| normalize(t)).collect();

        let mut stats = RunStats::default();
        let candidates = self.candidate_pairs(&texts, &mut stats);
        stats.candidate_pair_count = candidates.len();
        debug!(
            candidates = candidates.len(),
            "candidate pairs after prefilter"
        );

        if cancelled(&cancel) {
            return Err(DedupError::cancelled("duplicate detection"));
        }

        let embeddings = self
            .embed_corpus(&texts, !candidates.is_empty(), &mut stats)
            .await;

        let ctx = Arc::new(ScoringContext {
            texts,
            normalized,
            embeddings,
            weights: self.config.weights,
            cache: self.config.use_cache.then(|| self.cache.clone()),
        });

        let pairs = Arc::new(candidates);
        let scores = self.score_candidates(ctx.clone(), pairs.clone(), cancel.clone()).await?;

        let mut union_find = UnionFind::new(n);
        for (&(i, j), &score) in pairs.iter().zip(scores.iter()) {
            if score >= threshold {
                union_find.union(i, j);
            }
        }
        let groups = union_find.into_groups();

        if cancelled(&cancel) {
            return Err(DedupError::cancelled("duplicate detection"));
        }

        Ok(project(records, &groups, &ctx, mode, threshold, stats, started))
    }

    /// Corpus-wide TF-IDF pass narrowing all-pairs comparison down to the
    /// candidate set. When the corpus fit itself fails the prefilter cannot
    /// discriminate, so every pair stays a candidate rather than silently
    /// reporting zero duplicates.
    fn candidate_pairs(&self, texts: &[String], stats: &mut RunStats) -> Vec<(usize, usize)> {
        let n = texts.len();
        if n < 2 {
            return Vec::new();
        }

        match pairwise_cosine(texts) {
            Some(matrix) => {
                let mut candidates = Vec::new();
                for i in 0..n {
                    for j in (i + 1)..n {
                        if matrix[[i, j]] >= self.config.prefilter_threshold {
                            candidates.push((i, j));
                        }
                    }
                }
                candidates
            }
            None => {
                stats.tfidf_degraded = true;
                warn!("corpus TF-IDF fit failed; comparing all pairs without prefilter");
                let mut candidates = Vec::with_capacity(n * (n - 1) / 2);
                for i in 0..n {
                    for j in (i + 1)..n {
                        candidates.push((i, j));
                    }
                }
                candidates
            }
        }
    }

    /// One batched embedding call for the whole corpus, indexed by record
    /// position. Backend absence, failure or timeout degrades the semantic
    /// signal to 0 for all pairs; it never fails the run.
    async fn embed_corpus(
        &self,
        texts: &[String],
        have_candidates: bool,
        stats: &mut RunStats,
    ) -> Option<Vec<Vec<f32>>> {
        let embedder = match &self.embedder {
            Some(embedder) => embedder,
            None => {
                stats.semantic_degraded = true;
                warn!("no embedding backend configured; semantic signal contributes 0");
                return None;
            }
        };
        if !have_candidates {
            return None;
        }

        match timeout(self.config.embed_timeout, embedder.embed_batch(texts)).await {
            Ok(Ok(vectors)) if vectors.len() == texts.len() => {
                debug!(
                    backend = embedder.name(),
                    vectors = vectors.len(),
                    "batch embedding complete"
                );
                Some(vectors)
            }
            Ok(Ok(vectors)) => {
                stats.semantic_degraded = true;
                warn!(
                    backend = embedder.name(),
                    expected = texts.len(),
                    actual = vectors.len(),
                    "embedding batch size mismatch; semantic signal degraded"
                );
                None
            }
            Ok(Err(error)) => {
                stats.semantic_degraded = true;
                warn!(
                    backend = embedder.name(),
                    %error,
                    "batch embedding failed; semantic signal degraded"
                );
                None
            }
            Err(_) => {
                stats.semantic_degraded = true;
                warn!(
                    backend = embedder.name(),
                    timeout_ms = self.config.embed_timeout.as_millis() as u64,
                    "batch embedding timed out; semantic signal degraded"
                );
                None
            }
        }
    }

    /// Score candidate pairs on a bounded worker pool. Workers drain a
    /// shared index over the pair list and check the cancellation flag
    /// between pairs; each result lands in its own cell, so the score vector
    /// is a pure function of the inputs regardless of scheduling.
    async fn score_candidates(
        &self,
        ctx: Arc<ScoringContext>,
        pairs: Arc<Vec<(usize, usize)>>,
        cancel: Arc<AtomicBool>,
    ) -> Result<Vec<f64>> {
        let mut scores = vec![0.0f64; pairs.len()];
        if pairs.is_empty() {
            return Ok(scores);
        }

        let worker_count = self.config.max_workers.min(pairs.len());
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let next = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for worker in 0..worker_count {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| DedupError::internal("scoring semaphore closed"))?;
            let ctx = ctx.clone();
            let pairs = pairs.clone();
            let next = next.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = permit;
                loop {
                    if cancel.load(Ordering::Relaxed) {
                        debug!(worker, "scoring worker observed cancellation");
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    if index >= pairs.len() {
                        break;
                    }
                    let (i, j) = pairs[index];
                    let score = ctx.pair_score(i, j);
                    if tx.send((index, score)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        while let Some((index, score)) = rx.recv().await {
            scores[index] = score;
        }

        if cancelled(&cancel) {
            return Err(DedupError::cancelled_with_reason(
                "duplicate detection",
                "cancellation flag set during pair scoring",
            ));
        }
        Ok(scores)
    }
}

fn cancelled(flag: &AtomicBool) -> bool {
    flag.load(Ordering::Relaxed)
}
