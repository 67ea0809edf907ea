//! In-process retriever with cosine similarity search.
//!
//! Passages come from a JSONL file (one passage object per line) or the
//! built-in seed set, and are embedded once at construction.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use manual_core::{AppError, AppResult};

use crate::embeddings::EmbeddingProvider;
use crate::health::ComponentHealth;
use crate::retriever::{normalize_scope, Retriever};
use crate::types::Passage;

/// Retriever holding passages and their embeddings in memory.
pub struct InMemoryRetriever {
    entries: Vec<(Passage, Vec<f32>)>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl InMemoryRetriever {
    /// Embed all passages and build the index.
    pub async fn build(
        passages: Vec<Passage>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != passages.len() {
            return Err(AppError::Retrieval(format!(
                "Embedding provider returned {} vectors for {} passages",
                embeddings.len(),
                passages.len()
            )));
        }

        tracing::info!(
            passages = passages.len(),
            provider = embedder.provider_name(),
            "Built in-memory passage index"
        );

        Ok(Self {
            entries: passages.into_iter().zip(embeddings).collect(),
            embedder,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl Retriever for InMemoryRetriever {
    fn name(&self) -> &str {
        "memory"
    }

    async fn search(
        &self,
        query: &str,
        scope: Option<&str>,
        top_k: usize,
    ) -> AppResult<Vec<Passage>> {
        if query.trim().is_empty() {
            tracing::warn!("search called with blank query; returning no passages");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await.map_err(|e| match e {
            AppError::Retrieval(_) => e,
            other => AppError::Retrieval(format!("Query embedding failed: {}", other)),
        })?;

        let scope = normalize_scope(scope);

        let mut scored: Vec<(&Passage, f32)> = self
            .entries
            .iter()
            .filter(|(passage, _)| scope.map_or(true, |s| passage.scope_tag == s))
            .map(|(passage, embedding)| (passage, cosine_similarity(&query_embedding, embedding)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let results: Vec<Passage> = scored
            .into_iter()
            .take(top_k)
            .map(|(passage, _)| passage.clone())
            .collect();

        tracing::debug!(results = results.len(), top_k, "In-memory search complete");

        Ok(results)
    }

    async fn health(&self) -> ComponentHealth {
        ComponentHealth::up()
            .with_detail("passages", self.entries.len())
            .merge("embedding", self.embedder.health().await)
    }
}

/// Load passages from a JSONL file.
pub fn load_passages_jsonl(path: &Path) -> AppResult<Vec<Passage>> {
    let file = File::open(path).map_err(|e| {
        AppError::Config(format!("Failed to open passages file {:?}: {}", path, e))
    })?;

    let reader = BufReader::new(file);
    let mut passages = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        let passage: Passage = serde_json::from_str(&line).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse line {} in {:?}: {}",
                line_num + 1,
                path,
                e
            ))
        })?;
        passage.validate().map_err(|e| {
            AppError::Config(format!("Invalid passage on line {}: {}", line_num + 1, e))
        })?;

        passages.push(passage);
    }

    tracing::debug!("Loaded {} passages from {:?}", passages.len(), path);
    Ok(passages)
}

/// Cosine similarity; zero for mismatched lengths or zero vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::seed::{seed_passages, SEED_VEHICLE_MODEL};
    use std::io::Write;
    use tempfile::NamedTempFile;

    async fn seeded() -> InMemoryRetriever {
        InMemoryRetriever::build(seed_passages(), Arc::new(TrigramProvider::new(384)))
            .await
            .unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn test_relevant_passage_ranks_first() {
        let retriever = seeded().await;
        assert_eq!(retriever.len(), 5);

        let results = retriever
            .search("How often should I change the oil?", None, 5)
            .await
            .unwrap();
        assert_eq!(results[0].id, "seed-chunk-1");

        let results = retriever.search("tire pressure", None, 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "seed-chunk-2");
    }

    #[tokio::test]
    async fn test_top_k_bounds_results() {
        let retriever = seeded().await;
        assert_eq!(retriever.search("maintenance", None, 3).await.unwrap().len(), 3);
        assert_eq!(retriever.search("maintenance", None, 50).await.unwrap().len(), 5);
        assert!(retriever.search("maintenance", None, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_returns_empty() {
        let retriever = seeded().await;
        assert!(retriever.search("   ", None, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scope_filter() {
        let retriever = seeded().await;

        let scoped = retriever
            .search("brake fluid", Some(SEED_VEHICLE_MODEL), 5)
            .await
            .unwrap();
        assert_eq!(scoped.len(), 5);

        let other = retriever
            .search("brake fluid", Some("other-model"), 5)
            .await
            .unwrap();
        assert!(other.is_empty());

        // Blank scope means no filter
        let blank = retriever.search("brake fluid", Some("  "), 5).await.unwrap();
        assert_eq!(blank.len(), 5);
    }

    #[tokio::test]
    async fn test_health_reports_passage_count() {
        let health = seeded().await.health().await;
        assert!(health.is_up());
        assert_eq!(health.details["passages"], 5);
        assert_eq!(health.details["embedding"]["status"], "UP");
    }

    #[test]
    fn test_load_passages_jsonl() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id":"p1","text":"Rotate tires every 6000 miles.","manualId":"m1","vehicleModel":"model-a","section":"Tires","page":12}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"id":"p2","text":"","manualId":"m1","vehicleModel":"model-a"}}"#
        )
        .unwrap();

        let passages = load_passages_jsonl(file.path()).unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].page, Some(12));
        assert_eq!(passages[1].section, None);
    }

    #[test]
    fn test_load_passages_rejects_blank_id() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id":" ","text":"x","manualId":"m1","vehicleModel":"model-a"}}"#
        )
        .unwrap();

        let err = load_passages_jsonl(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_load_passages_missing_file() {
        assert!(load_passages_jsonl(Path::new("/nonexistent/passages.jsonl")).is_err());
    }
}
