//! Embedding provider trait and factory.

use crate::health::ComponentHealth;
use manual_core::config::EmbeddingConfig;
use manual_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Failures are reported as `AppError::Retrieval` since embedding the query
/// is part of searching.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Retrieval("No embedding returned".to_string()))
    }

    /// Embed a tiny fixed input and report the outcome.
    async fn health(&self) -> ComponentHealth {
        match self.embed(HEALTH_CHECK_TEXT).await {
            Ok(embedding) => ComponentHealth::up()
                .with_detail("provider", self.provider_name())
                .with_detail("dimensions", embedding.len()),
            Err(e) => {
                tracing::warn!("Embedding health check failed: {}", e);
                ComponentHealth::down(e.to_string()).with_detail("provider", self.provider_name())
            }
        }
    }
}

const HEALTH_CHECK_TEXT: &str = "health";

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    match config.provider.to_lowercase().as_str() {
        "trigram" => Ok(Arc::new(super::providers::TrigramProvider::new(
            config.dimensions,
        ))),

        "ollama" => Ok(Arc::new(super::providers::OllamaProvider::new(config)?)),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            config.provider
        ))),
    }
}
