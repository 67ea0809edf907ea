//! Prompt types for the owner-manual assistant.
//!
//! This module defines the domain entities for the prompt system.

use serde::{Deserialize, Serialize};

/// Identifier of the built-in grounding prompt.
pub const DEFAULT_PROMPT_ID: &str = "manual.answer.default";

/// Fixed instruction telling the model to stay within the excerpts.
pub const GROUNDING_SYSTEM_INSTRUCTION: &str = "You are an assistant that answers questions using only the provided manual excerpts. Base your answer strictly on the excerpts; if the excerpts do not contain relevant information, say so. Do not invent details.";

/// User message template: the question, a fixed header, then one block per
/// excerpt terminated by the `---` delimiter.
pub const GROUNDING_USER_TEMPLATE: &str = "Question: {{question}}\n\nManual excerpts (use only these to answer):\n{{#each excerpts}}[section: {{section}}; page: {{page}}]\n{{text}}\n---\n{{/each}}";

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// System instruction sent alongside the user message
    pub system: String,

    /// User message template with Handlebars syntax
    pub template: String,
}

impl PromptDefinition {
    /// The built-in grounding prompt.
    pub fn grounding_default() -> Self {
        Self {
            id: DEFAULT_PROMPT_ID.to_string(),
            title: "Answer from owner's manual excerpts".to_string(),
            api_version: "1.0".to_string(),
            created_by: "builtin".to_string(),
            system: GROUNDING_SYSTEM_INSTRUCTION.to_string(),
            template: GROUNDING_USER_TEMPLATE.to_string(),
        }
    }
}

impl Default for PromptDefinition {
    fn default() -> Self {
        Self::grounding_default()
    }
}

/// One manual excerpt as exposed to the template.
///
/// Absent section or page render as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Excerpt {
    pub section: String,
    pub page: String,
    pub text: String,
}

impl Excerpt {
    pub fn new(section: Option<&str>, page: Option<u32>, text: impl Into<String>) -> Self {
        Self {
            section: section.unwrap_or_default().to_string(),
            page: page.map(|p| p.to_string()).unwrap_or_default(),
            text: text.into(),
        }
    }
}

/// Variables available to a prompt template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptInput {
    /// The user's question, verbatim
    pub question: String,

    /// Included excerpts in retrieval order
    pub excerpts: Vec<Excerpt>,
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System instruction
    pub system: String,

    /// User message
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Number of excerpts rendered into the user message
    #[serde(rename = "excerptCount")]
    pub excerpt_count: usize,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(system: String, user: String, source_prompt_id: String, excerpt_count: usize) -> Self {
        Self {
            system,
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                excerpt_count,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: manual.answer.short
title: Short answers
apiVersion: "1.0"
createdBy: docs-team
system: "Answer in one sentence using only the excerpts."
template: "Q: {{question}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "manual.answer.short");
        assert_eq!(def.created_by, "docs-team");
        assert!(def.system.starts_with("Answer in one sentence"));
    }

    #[test]
    fn test_grounding_default() {
        let def = PromptDefinition::default();
        assert_eq!(def.id, DEFAULT_PROMPT_ID);
        assert!(def.system.contains("only the provided manual excerpts"));
        assert!(def.system.contains("Do not invent details"));
        assert!(def.template.contains("use only these to answer"));
    }

    #[test]
    fn test_excerpt_absent_fields_are_empty() {
        let excerpt = Excerpt::new(None, None, "Check tire pressure monthly.");
        assert_eq!(excerpt.section, "");
        assert_eq!(excerpt.page, "");

        let excerpt = Excerpt::new(Some("Safety"), Some(2), "x");
        assert_eq!(excerpt.section, "Safety");
        assert_eq!(excerpt.page, "2");
    }
}
