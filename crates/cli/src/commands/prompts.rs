//! Prompts command handler.
//!
//! Lists the prompt overrides found under `.manual/prompts/` and shows which
//! prompt the answer pipeline will use.

use clap::Args;
use manual_core::{config::AppConfig, AppResult};
use manual_prompt::list_prompts;
use manual_prompt::types::DEFAULT_PROMPT_ID;

/// List prompt overrides in the workspace
#[derive(Args, Debug)]
pub struct PromptsCommand {}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        let prompt_ids = list_prompts(&config.workspace)?;
        tracing::debug!("Found {} prompt overrides", prompt_ids.len());

        print!("{}", render_prompt_list(&prompt_ids));
        Ok(())
    }
}

fn render_prompt_list(prompt_ids: &[String]) -> String {
    let mut out = String::new();

    let source = if prompt_ids.iter().any(|id| id == DEFAULT_PROMPT_ID) {
        "workspace override"
    } else {
        "built-in"
    };
    out.push_str(&format!("Answer prompt: {} ({})\n", DEFAULT_PROMPT_ID, source));

    if prompt_ids.is_empty() {
        out.push_str("No prompt overrides found.\n");
        return out;
    }

    out.push_str("Overrides:\n");
    for id in prompt_ids {
        out.push_str(&format!("  {}\n", id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_when_no_overrides() {
        let out = render_prompt_list(&[]);
        assert_eq!(
            out,
            "Answer prompt: manual.answer.default (built-in)\nNo prompt overrides found.\n"
        );
    }

    #[test]
    fn test_override_of_default_prompt() {
        let ids = vec!["manual.answer.default".to_string(), "terse".to_string()];
        let out = render_prompt_list(&ids);

        assert!(out.starts_with("Answer prompt: manual.answer.default (workspace override)\n"));
        assert!(out.contains("  terse\n"));
    }

    #[test]
    fn test_unrelated_overrides_keep_builtin() {
        let out = render_prompt_list(&["terse".to_string()]);
        assert!(out.contains("(built-in)"));
        assert!(out.contains("Overrides:\n  terse\n"));
    }
}
