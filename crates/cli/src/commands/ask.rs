//! Ask command handler.
//!
//! Runs the full answer pipeline for one question and prints the answer
//! followed by its citations.

use clap::Args;
use manual_core::{config::AppConfig, AppError, AppResult};
use manual_knowledge::{AnswerOrchestrator, AnswerResult};

/// Ask a question about the manual
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Restrict retrieval to one vehicle model
    #[arg(long)]
    pub vehicle_model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let orchestrator = AnswerOrchestrator::from_config(config).await?;
        tracing::debug!(
            "Pipeline: retriever={}, generator={}",
            orchestrator.retriever_name(),
            orchestrator.generator_name()
        );

        let result = orchestrator
            .answer(&self.question, self.vehicle_model.as_deref())
            .await?;

        if self.json {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            print!("{}", render_answer(&result));
        }

        Ok(())
    }
}

/// Human-readable answer with a numbered source list.
fn render_answer(result: &AnswerResult) -> String {
    let mut out = format!("{}\n", result.answer);

    if !result.citations.is_empty() {
        out.push_str("\nSources:\n");
        for (i, citation) in result.citations.iter().enumerate() {
            let section = citation.section.as_deref().unwrap_or("(no section)");
            match citation.page {
                Some(page) => out.push_str(&format!(
                    "  [{}] {} (p. {}) - {}\n",
                    i + 1,
                    section,
                    page,
                    citation.passage_id
                )),
                None => out.push_str(&format!(
                    "  [{}] {} - {}\n",
                    i + 1,
                    section,
                    citation.passage_id
                )),
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use manual_knowledge::Citation;

    #[test]
    fn test_render_without_citations() {
        let result = AnswerResult::new("No relevant sections found.", None);
        assert_eq!(render_answer(&result), "No relevant sections found.\n");
    }

    #[test]
    fn test_render_with_citations() {
        let result = AnswerResult::new(
            "Every 5000 miles.",
            Some(vec![
                Citation {
                    passage_id: "c1".to_string(),
                    section: Some("Maintenance".to_string()),
                    snippet: None,
                    page: Some(12),
                },
                Citation {
                    passage_id: "c2".to_string(),
                    section: None,
                    snippet: None,
                    page: None,
                },
            ]),
        );

        let rendered = render_answer(&result);
        assert!(rendered.starts_with("Every 5000 miles.\n\nSources:\n"));
        assert!(rendered.contains("  [1] Maintenance (p. 12) - c1\n"));
        assert!(rendered.contains("  [2] (no section) - c2\n"));
    }
}
