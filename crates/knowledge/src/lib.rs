//! Retrieval and answer orchestration over an owner's manual.
//!
//! Provides:
//! - Passage, citation and answer types
//! - Retriever adapters (in-memory cosine search, Qdrant)
//! - Query embedding providers
//! - The answer orchestrator: retrieve, bound context, prompt, generate, cite

pub mod embeddings;
pub mod health;
pub mod memory;
pub mod qdrant;
pub mod rag;
pub mod retriever;
pub mod seed;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use health::{ComponentHealth, HealthReport, HealthStatus};
pub use memory::InMemoryRetriever;
pub use qdrant::QdrantRetriever;
pub use rag::{AnswerOrchestrator, Generator, LlmGenerator, QueryOptions, NO_RELEVANT_SECTIONS};
pub use retriever::{create_retriever, normalize_scope, Retriever};
pub use types::{AnswerResult, Citation, Passage};
