//! Core types for manual passages and answers.

use manual_core::{AppError, AppResult, FieldError};
use serde::{Deserialize, Serialize};

/// One retrievable excerpt of an owner's manual.
///
/// Identifier, source document and scope tag are never blank; text may be
/// empty but is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Unique passage identifier
    pub id: String,

    /// Passage content
    #[serde(default)]
    pub text: String,

    /// Manual the passage was taken from
    #[serde(rename = "manualId")]
    pub source_doc_id: String,

    /// Partition key used for filtering (e.g., vehicle model)
    #[serde(rename = "vehicleModel")]
    pub scope_tag: String,

    /// Section label, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Page number, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Passage {
    /// Create a passage, rejecting blank identifiers.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        source_doc_id: impl Into<String>,
        scope_tag: impl Into<String>,
    ) -> AppResult<Self> {
        let passage = Self {
            id: id.into(),
            text: text.into(),
            source_doc_id: source_doc_id.into(),
            scope_tag: scope_tag.into(),
            section: None,
            page: None,
        };
        passage.validate()?;
        Ok(passage)
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Check the non-blank invariants (used for passages loaded from files).
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();

        if self.id.trim().is_empty() {
            errors.push(FieldError::new("id", "passage id must not be blank"));
        }
        if self.source_doc_id.trim().is_empty() {
            errors.push(FieldError::new("manualId", "manual id must not be blank"));
        }
        if self.scope_tag.trim().is_empty() {
            errors.push(FieldError::new("vehicleModel", "vehicle model must not be blank"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

/// Reference from an answer back to a passage the model was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Identifier of the cited passage
    #[serde(rename = "chunkId")]
    pub passage_id: String,

    pub section: Option<String>,

    /// Leading part of the passage text
    pub snippet: Option<String>,

    pub page: Option<u32>,
}

/// Final answer plus its citations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated answer text; may be empty
    pub answer: String,

    /// One citation per passage included in the prompt, in prompt order
    pub citations: Vec<Citation>,
}

impl AnswerResult {
    /// Build a result; an absent citation list becomes an empty one.
    pub fn new(answer: impl Into<String>, citations: Option<Vec<Citation>>) -> Self {
        Self {
            answer: answer.into(),
            citations: citations.unwrap_or_default(),
        }
    }
}
