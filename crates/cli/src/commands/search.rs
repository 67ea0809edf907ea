//! Search command handler.
//!
//! Retrieves passages for a query and prints them, without calling the
//! language model. Useful for checking what the answer pipeline would see.

use clap::Args;
use manual_core::{config::AppConfig, AppError, AppResult};
use manual_knowledge::rag::citations::{truncate_snippet, MAX_SNIPPET_CHARS};
use manual_knowledge::AnswerOrchestrator;

/// Show the passages retrieved for a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// The search query
    pub query: String,

    /// Restrict retrieval to one vehicle model
    #[arg(long)]
    pub vehicle_model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let orchestrator = AnswerOrchestrator::from_config(config).await?;
        let passages = orchestrator
            .search_passages(&self.query, self.vehicle_model.as_deref())
            .await?;

        tracing::debug!(
            "Retriever '{}' returned {} passages",
            orchestrator.retriever_name(),
            passages.len()
        );

        if self.json {
            let json = serde_json::to_string_pretty(&passages)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        if passages.is_empty() {
            println!("No passages found.");
            return Ok(());
        }

        for (i, passage) in passages.iter().enumerate() {
            println!(
                "{}. {} [{} / {}]",
                i + 1,
                passage.id,
                passage.scope_tag,
                passage.section.as_deref().unwrap_or("-")
            );
            println!("   {}", truncate_snippet(&passage.text, MAX_SNIPPET_CHARS));
        }

        Ok(())
    }
}
