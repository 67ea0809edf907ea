//! OpenAI-compatible chat completions provider.
//!
//! Works with Groq, OpenAI and any endpoint exposing `/chat/completions`
//! with bearer-token authentication.

use std::time::Duration;

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use manual_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct OpenAiCompatClient {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Groq client with the public Groq base URL.
    pub fn groq(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Self::new("groq", GROQ_BASE_URL, api_key, timeout)
    }

    fn to_chat_request<'a>(&self, request: &'a LlmRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    fn convert_response(&self, response: ChatResponse, requested_model: &str) -> LlmResponse {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let model = if response.model.is_empty() {
            requested_model.to_string()
        } else {
            response.model
        };

        LlmResponse {
            content,
            model,
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiCompatClient {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::info!(provider = %self.name, model = %request.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Generation(format!("{} request timed out", self.name))
                } else {
                    AppError::Generation(format!("Failed to send request to {}: {}", self.name, e))
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(provider = %self.name, "Provider rate limit reached");
            return Err(AppError::Generation(format!(
                "{} rate limit exceeded",
                self.name
            )));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = %self.name, status = status.as_u16(), "Provider returned error");
            return Err(AppError::Generation(format!(
                "{} API error ({}): {}",
                self.name, status, error_body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AppError::Generation(format!("Failed to parse {} response: {}", self.name, e))
        })?;

        Ok(self.convert_response(chat_response, &request.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiCompatClient {
        OpenAiCompatClient::groq("gsk-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_groq_defaults() {
        let client = client();
        assert_eq!(client.provider_name(), "groq");
        assert_eq!(client.base_url, GROQ_BASE_URL);
    }

    #[test]
    fn test_system_message_first() {
        let client = client();
        let request = LlmRequest::new("Question: oil?", "llama-3.1-8b-instant")
            .with_system("Use only the excerpts.")
            .with_temperature(0.1)
            .with_max_tokens(1024);

        let chat = client.to_chat_request(&request);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(
            chat.messages[0],
            ChatMessage {
                role: "system",
                content: "Use only the excerpts."
            }
        );
        assert_eq!(chat.messages[1].role, "user");
        assert_eq!(chat.max_tokens, Some(1024));

        let body = serde_json::to_value(&chat).unwrap();
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][1]["content"], "Question: oil?");
    }

    #[test]
    fn test_user_only_without_system() {
        let client = client();
        let request = LlmRequest::new("hello", "m");
        assert_eq!(client.to_chat_request(&request).messages.len(), 1);
    }

    #[test]
    fn test_response_without_content_is_empty() {
        let client = client();
        let raw: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();

        let response = client.convert_response(raw, "llama-3.1-8b-instant");
        assert_eq!(response.content, "");
        assert_eq!(response.model, "llama-3.1-8b-instant");
        assert_eq!(response.usage, LlmUsage::default());
    }

    #[test]
    fn test_response_with_usage() {
        let client = client();
        let raw: ChatResponse = serde_json::from_str(
            r#"{"model":"llama-3.1-8b-instant","choices":[{"message":{"content":"Every 5000 miles."}}],"usage":{"prompt_tokens":50,"completion_tokens":5,"total_tokens":55}}"#,
        )
        .unwrap();

        let response = client.convert_response(raw, "ignored");
        assert_eq!(response.content, "Every 5000 miles.");
        assert_eq!(response.usage.total_tokens, 55);
    }
}
