//! Error types for the owner-manual assistant.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! the two downstream failure kinds of the answer pipeline (retrieval and
//! generation), prompt rendering and request validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field (e.g. "text", "topK")
    pub field: String,

    /// Human-readable constraint message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Unified error type for the owner-manual assistant.
///
/// All functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The retriever could not complete a search (connectivity, timeout,
    /// index-side or query-embedding failure)
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// The language model could not produce an answer (timeout, rate limit,
    /// upstream error)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Prompt definition or rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Invalid input, with one entry per offending field
    #[error("Validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    /// True for the failure kinds caused by an unavailable downstream
    /// dependency rather than by the caller's input.
    pub fn is_downstream(&self) -> bool {
        matches!(self, AppError::Retrieval(_) | AppError::Generation(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("text", "query text is required"),
            FieldError::new("vehicleModel", "must not exceed 255 characters"),
        ]);

        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed"));
        assert!(msg.contains("text: query text is required"));
        assert!(msg.contains("vehicleModel: must not exceed 255 characters"));
    }

    #[test]
    fn test_downstream_classification() {
        assert!(AppError::Retrieval("down".into()).is_downstream());
        assert!(AppError::Generation("429".into()).is_downstream());
        assert!(!AppError::Config("bad".into()).is_downstream());
        assert!(!AppError::Validation(vec![]).is_downstream());
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
