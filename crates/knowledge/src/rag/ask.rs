//! Answer orchestration.
//!
//! One call to [`AnswerOrchestrator::answer`] runs the whole pipeline for a
//! single question, strictly in sequence:
//! 1. Normalize the scope filter
//! 2. Retrieve the top-k passages
//! 3. Short-circuit with a fixed answer when nothing was retrieved
//! 4. Bound the passages to the context budget
//! 5. Render the grounding prompt
//! 6. Generate the answer
//! 7. Cite exactly the passages that were in the prompt
//!
//! Retrieval and generation failures abort the run; there are no retries and
//! no partial answers.

use std::sync::Arc;

use manual_core::config::QueryConfig;
use manual_core::logging::mask_for_log;
use manual_core::{AppConfig, AppResult};
use manual_prompt::types::DEFAULT_PROMPT_ID;
use manual_prompt::{build_prompt, resolve_prompt, Excerpt, PromptDefinition, PromptInput};

use crate::health::HealthReport;
use crate::rag::budget::select_within_budget;
use crate::rag::citations::build_citations;
use crate::rag::generator::{create_generator, Generator};
use crate::retriever::{create_retriever, normalize_scope, Retriever};
use crate::types::{AnswerResult, Passage};

/// Answer returned when retrieval finds nothing.
pub const NO_RELEVANT_SECTIONS: &str = "No relevant sections found.";

/// Per-orchestrator retrieval settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Passages requested from the retriever
    pub top_k: usize,

    /// Character budget for passage text in the prompt
    pub max_context_chars: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from(&QueryConfig::default())
    }
}

impl From<&QueryConfig> for QueryOptions {
    fn from(config: &QueryConfig) -> Self {
        Self {
            top_k: config.top_k as usize,
            max_context_chars: config.max_context_chars as usize,
        }
    }
}

/// Retrieval-augmented answering over a retriever and a generator.
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct AnswerOrchestrator {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
    prompt: PromptDefinition,
    options: QueryOptions,
}

impl AnswerOrchestrator {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
        options: QueryOptions,
    ) -> Self {
        Self {
            retriever,
            generator,
            prompt: PromptDefinition::grounding_default(),
            options,
        }
    }

    /// Replace the built-in grounding prompt.
    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }

    /// Validate the configuration and wire up retriever, generator and prompt.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let retriever = create_retriever(config).await?;
        let generator = create_generator(config)?;
        let prompt = resolve_prompt(&config.workspace, DEFAULT_PROMPT_ID)?;

        Ok(Self::new(retriever, generator, QueryOptions::from(&config.query)).with_prompt(prompt))
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    pub fn retriever_name(&self) -> &str {
        self.retriever.name()
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Check retriever and generator concurrently.
    pub async fn health(&self) -> HealthReport {
        let (retriever, generator) =
            tokio::join!(self.retriever.health(), self.generator.health());
        let report = HealthReport::new(retriever, generator);

        if report.is_up() {
            tracing::debug!(?report, "Health check passed");
        } else {
            tracing::warn!(?report, "Health check failed");
        }

        report
    }

    /// Retrieve passages for a question without generating an answer.
    ///
    /// A blank question yields no passages and no search.
    pub async fn search_passages(
        &self,
        question: &str,
        scope: Option<&str>,
    ) -> AppResult<Vec<Passage>> {
        if question.trim().is_empty() {
            return Ok(Vec::new());
        }

        let scope = normalize_scope(scope);

        tracing::debug!(
            query = %mask_for_log(question),
            scope = scope.unwrap_or("<all>"),
            top_k = self.options.top_k,
            "Searching passages"
        );

        self.retriever
            .search(question, scope, self.options.top_k)
            .await
    }

    /// Answer a question from the manual.
    pub async fn answer(&self, question: &str, scope: Option<&str>) -> AppResult<AnswerResult> {
        let passages = self.search_passages(question, scope).await?;

        if passages.is_empty() {
            tracing::info!(query = %mask_for_log(question), "No passages retrieved");
            return Ok(AnswerResult::new(NO_RELEVANT_SECTIONS, None));
        }

        let included = select_within_budget(&passages, self.options.max_context_chars);

        tracing::info!(
            retrieved = passages.len(),
            included = included.len(),
            max_context_chars = self.options.max_context_chars,
            "Passages selected for prompt"
        );

        let input = PromptInput {
            question: question.to_string(),
            excerpts: included
                .iter()
                .map(|p| Excerpt::new(p.section.as_deref(), p.page, p.text.clone()))
                .collect(),
        };
        let prompt = build_prompt(&self.prompt, &input)?;

        let generated = self.generator.generate(&prompt.system, &prompt.user).await?;
        let answer = if generated.trim().is_empty() {
            String::new()
        } else {
            generated
        };

        Ok(AnswerResult::new(answer, Some(build_citations(included))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let options = QueryOptions::from(&QueryConfig {
            top_k: 7,
            max_context_chars: 1200,
        });
        assert_eq!(options.top_k, 7);
        assert_eq!(options.max_context_chars, 1200);
    }

    #[test]
    fn test_default_options() {
        let options = QueryOptions::default();
        assert_eq!(options.top_k, 5);
        assert_eq!(options.max_context_chars, 8000);
    }

    #[tokio::test]
    async fn test_from_default_config_uses_seed_passages() {
        let orchestrator = AnswerOrchestrator::from_config(&AppConfig::default())
            .await
            .unwrap();

        assert_eq!(orchestrator.retriever_name(), "memory");
        assert_eq!(orchestrator.generator_name(), "ollama:llama3.2");

        let passages = orchestrator
            .search_passages("tire pressure", Some("mvp-manual"))
            .await
            .unwrap();
        assert_eq!(passages[0].id, "seed-chunk-2");
    }
}
