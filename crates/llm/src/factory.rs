//! LLM provider factory.
//!
//! This module provides a factory for creating LLM clients based on
//! application configuration. It handles provider resolution and secret
//! injection.

use std::sync::Arc;
use std::time::Duration;

use crate::client::LlmClient;
use crate::providers::openai_compat::{GROQ_BASE_URL, OPENAI_BASE_URL};
use crate::providers::{OllamaClient, OpenAiCompatClient};
use crate::types::ProviderType;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai", "groq")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for OpenAI-compatible providers)
/// * `timeout` - Per-request timeout applied to the HTTP client
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required secrets are missing
/// - Client initialization fails
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client =
                OllamaClient::with_base_url(base_url, timeout).map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI | ProviderType::Groq => {
            let name = provider_type.as_str();
            let api_key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| format!("{} provider requires API key", name))?;

            let default_base = if provider_type == ProviderType::Groq {
                GROQ_BASE_URL
            } else {
                OPENAI_BASE_URL
            };
            let base_url = endpoint.unwrap_or(default_base);

            let client = OpenAiCompatClient::new(name, base_url, api_key, timeout)
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
    }
}
