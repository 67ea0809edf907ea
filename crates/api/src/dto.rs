//! Request and response bodies for the HTTP API.

use manual_core::FieldError;
use manual_knowledge::{AnswerResult, Citation, HealthStatus};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/query`.
///
/// `text` is optional at the serde level so a missing field is reported as a
/// field error instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub text: Option<String>,

    /// Restricts retrieval to one vehicle model
    #[serde(default)]
    pub vehicle_model: Option<String>,

    /// Accepted and validated, not used by retrieval
    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub image_base64: Option<String>,
}

/// Body of a successful query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
}

impl From<AnswerResult> for QueryResponse {
    fn from(result: AnswerResult) -> Self {
        Self {
            answer: result.answer,
            citations: result.citations,
        }
    }
}

/// Body of `GET /health`. Failure reasons are logged, not returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub retriever: ComponentStatus,
    pub generator: ComponentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: String,
    pub status: HealthStatus,
}

/// Error body shared by every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub status: u16,
    pub message: String,
    pub trace_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,
}
