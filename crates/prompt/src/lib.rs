//! Grounding prompt system for the owner-manual assistant.
//!
//! This crate provides:
//! - The built-in grounding prompt (system instruction + user template)
//! - YAML-based prompt overrides under `.manual/prompts/`
//! - Handlebars template rendering of the question and manual excerpts

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt, resolve_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, Excerpt, PromptDefinition, PromptInput};
