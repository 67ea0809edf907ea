//! Retriever contract and backend selection.

use std::path::Path;
use std::sync::Arc;

use manual_core::config::RetrieverBackend;
use manual_core::{AppConfig, AppResult};

use crate::embeddings::create_provider;
use crate::health::ComponentHealth;
use crate::memory::{load_passages_jsonl, InMemoryRetriever};
use crate::qdrant::QdrantRetriever;
use crate::seed::seed_passages;
use crate::types::Passage;

/// Nearest-neighbour search over manual passages.
///
/// Implementations return at most `top_k` passages ordered nearest-first,
/// return an empty list for a blank query without searching, apply no
/// filter when `scope` is absent or blank, and report backend, connectivity
/// and timeout failures as `AppError::Retrieval`.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Backend name for health reporting (e.g., "memory", "qdrant").
    fn name(&self) -> &str;

    async fn search(&self, query: &str, scope: Option<&str>, top_k: usize)
        -> AppResult<Vec<Passage>>;

    /// Reachability of the backing store and query embedder.
    async fn health(&self) -> ComponentHealth {
        ComponentHealth::up()
    }
}

/// Treat an absent, empty or whitespace-only scope as "no filter".
pub fn normalize_scope(scope: Option<&str>) -> Option<&str> {
    scope.filter(|s| !s.trim().is_empty())
}

/// Build the retriever selected by `retriever.backend`.
pub async fn create_retriever(config: &AppConfig) -> AppResult<Arc<dyn Retriever>> {
    let embedder = create_provider(&config.retriever.embedding)?;

    tracing::info!(
        backend = config.retriever.backend.as_str(),
        embedding_provider = embedder.provider_name(),
        embedding_model = embedder.model_name(),
        "Creating retriever"
    );

    match config.retriever.backend {
        RetrieverBackend::Memory => {
            let passages = match &config.retriever.passages_file {
                Some(file) => load_passages_jsonl(&resolve_path(&config.workspace, file))?,
                None => seed_passages(),
            };
            let retriever = InMemoryRetriever::build(passages, embedder).await?;
            Ok(Arc::new(retriever))
        }
        RetrieverBackend::Qdrant => {
            let retriever = QdrantRetriever::connect(&config.retriever.qdrant, embedder)?;
            Ok(Arc::new(retriever))
        }
    }
}

fn resolve_path(workspace: &Path, file: &Path) -> std::path::PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        workspace.join(file)
    }
}
