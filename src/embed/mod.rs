use async_trait::async_trait;

/// Sentence-embedding service boundary.
///
/// Implementations wrap whatever backend the surrounding system provides
/// (a local model, a remote API). The service is constructed once by the
/// caller and injected into the detector; the engine itself never
/// initializes models. Backend failure is a degraded-mode condition for the
/// engine, never a fatal one.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Backend name for logs and reports
    fn name(&self) -> &str;

    /// Encode a batch of texts into fixed-length vectors, one per input, in
    /// input order. Called once per detection run with the full corpus so
    /// model-invocation overhead is amortized.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Cosine similarity for f32 embedding vectors, clamped to [0, 1]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (f64::from(dot) / (f64::from(norm_a) * f64::from(norm_b))).clamp(0.0, 1.0)
}
