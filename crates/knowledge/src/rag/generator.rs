//! Generation adapter: system instruction + user message in, answer text out.

use std::sync::Arc;

use manual_core::{AppConfig, AppError, AppResult};
use manual_llm::{LlmClient, LlmRequest};

use crate::health::ComponentHealth;

const HEALTH_CHECK_MESSAGE: &str = "Reply with exactly: ok";

/// Produces answer text from a prompt.
///
/// The returned text may be blank. Timeouts, rate limits and upstream errors
/// are reported as `AppError::Generation`.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Generator name for health reporting (e.g., "groq:llama-3.1-8b-instant").
    fn name(&self) -> &str;

    async fn generate(&self, system_instruction: &str, user_message: &str) -> AppResult<String>;

    /// Whether the model currently answers at all.
    async fn health(&self) -> ComponentHealth {
        ComponentHealth::up()
    }
}

/// Generator backed by any [`LlmClient`].
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    name: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: format!("{}:{}", client.provider_name(), model),
            client,
            model,
            temperature: 0.1,
            max_tokens: 1024,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait::async_trait]
impl Generator for LlmGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, system_instruction: &str, user_message: &str) -> AppResult<String> {
        let request = LlmRequest::new(user_message, &self.model)
            .with_system(system_instruction)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self.client.complete(&request).await.map_err(|e| match e {
            AppError::Generation(_) => e,
            other => AppError::Generation(other.to_string()),
        })?;

        tracing::debug!(
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "Generation complete"
        );

        Ok(response.content)
    }

    async fn health(&self) -> ComponentHealth {
        let request = LlmRequest::new(HEALTH_CHECK_MESSAGE, &self.model)
            .with_temperature(0.0)
            .with_max_tokens(8);

        match self.client.complete(&request).await {
            Ok(response) => ComponentHealth::up()
                .with_detail("model", self.model.as_str())
                .with_detail("responseReceived", !response.content.trim().is_empty()),
            Err(e) => {
                tracing::warn!("Generator health check failed: {}", e);
                ComponentHealth::down(e.to_string()).with_detail("model", self.model.as_str())
            }
        }
    }
}

/// Build the generator for the configured provider and model.
pub fn create_generator(config: &AppConfig) -> AppResult<Arc<dyn Generator>> {
    let provider = config.provider.to_lowercase();
    let endpoint = config.provider_endpoint(&provider);
    let api_key = config.resolve_api_key(&provider);

    let client = manual_llm::create_client(
        &provider,
        endpoint.as_deref(),
        api_key.as_deref(),
        config.provider_timeout(&provider),
    )
    .map_err(|e| AppError::Config(format!("Failed to create LLM client: {}", e)))?;

    let generator = LlmGenerator::new(client, config.model.clone())
        .with_temperature(config.generation.temperature)
        .with_max_tokens(config.generation.max_tokens);

    tracing::info!(generator = generator.name(), "Generator ready");

    Ok(Arc::new(generator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use manual_llm::{LlmResponse, LlmUsage};
    use std::sync::Mutex;

    /// LLM client that records requests and replays a canned outcome.
    struct StubClient {
        outcome: Result<String, String>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    #[async_trait::async_trait]
    impl LlmClient for StubClient {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.outcome {
                Ok(content) => Ok(LlmResponse {
                    content: content.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::default(),
                }),
                Err(msg) => Err(AppError::Other(msg.clone())),
            }
        }
    }

    fn stub(outcome: Result<&str, &str>) -> Arc<StubClient> {
        Arc::new(StubClient {
            outcome: outcome.map(str::to_string).map_err(str::to_string),
            requests: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_generate_passes_prompt_and_settings() {
        let client = stub(Ok("Every 5000 miles."));
        let generator = LlmGenerator::new(client.clone(), "llama-3.1-8b-instant")
            .with_temperature(0.2)
            .with_max_tokens(256);

        assert_eq!(generator.name(), "stub:llama-3.1-8b-instant");

        let answer = generator.generate("system", "user").await.unwrap();
        assert_eq!(answer, "Every 5000 miles.");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("system"));
        assert_eq!(requests[0].prompt, "user");
        assert_eq!(requests[0].temperature, Some(0.2));
        assert_eq!(requests[0].max_tokens, Some(256));
    }

    #[tokio::test]
    async fn test_client_errors_become_generation_failures() {
        let generator = LlmGenerator::new(stub(Err("connection reset")), "m");
        let err = generator.generate("s", "u").await.unwrap_err();
        assert!(matches!(err, AppError::Generation(ref msg) if msg.contains("connection reset")));
    }

    #[tokio::test]
    async fn test_health_sends_small_request() {
        let client = stub(Ok("ok"));
        let generator = LlmGenerator::new(client.clone(), "llama3.2");

        let health = generator.health().await;
        assert!(health.is_up());
        assert_eq!(health.details["responseReceived"], true);

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].prompt, HEALTH_CHECK_MESSAGE);
        assert_eq!(requests[0].max_tokens, Some(8));
    }

    #[tokio::test]
    async fn test_health_down_on_client_error() {
        let generator = LlmGenerator::new(stub(Err("rate limit exceeded")), "m");
        let health = generator.health().await;
        assert!(!health.is_up());
        assert_eq!(health.details["model"], "m");
    }

    #[test]
    fn test_create_generator_for_default_config() {
        let generator = create_generator(&AppConfig::default()).unwrap();
        assert_eq!(generator.name(), "ollama:llama3.2");
    }

    #[test]
    fn test_create_generator_requires_key() {
        let mut config = AppConfig::default();
        config.provider = "groq".to_string();
        config.llm = None;
        // No explicit key; only fails if GROQ_API_KEY is also unset
        if std::env::var("GROQ_API_KEY").is_err() {
            assert!(matches!(create_generator(&config), Err(AppError::Config(_))));
        }
    }
}
