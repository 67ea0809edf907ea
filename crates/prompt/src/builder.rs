//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition, PromptInput};
use handlebars::Handlebars;
use manual_core::{AppError, AppResult};
use serde::Serialize;

/// Build a prompt from a definition and the question/excerpt variables.
///
/// The system instruction is taken verbatim from the definition; the user
/// message is the rendered template.
///
/// # Example
/// ```no_run
/// use manual_prompt::{build_prompt, Excerpt, PromptDefinition, PromptInput};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let input = PromptInput {
///     question: "How often should I change the oil?".to_string(),
///     excerpts: vec![Excerpt::new(Some("Maintenance"), Some(1), "Oil change interval is 5000 miles.")],
/// };
///
/// let built = build_prompt(&PromptDefinition::grounding_default(), &input)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(definition: &PromptDefinition, input: &PromptInput) -> AppResult<BuiltPrompt> {
    tracing::debug!(
        prompt_id = %definition.id,
        excerpts = input.excerpts.len(),
        "Building prompt"
    );

    let user = render_template(&definition.template, input)?;

    Ok(BuiltPrompt::new(
        definition.system.clone(),
        user,
        definition.id.clone(),
        input.excerpts.len(),
    ))
}

/// Render a Handlebars template with variables.
fn render_template<T: Serialize>(template: &str, data: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
