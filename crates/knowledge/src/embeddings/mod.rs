//! Query embedding for vector retrieval.
//!
//! Provider-agnostic embedding generation; the provider is chosen from the
//! `retriever.embedding` configuration section.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
