//! Route handlers.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use manual_core::logging::mask_for_log;

use crate::dto::{ComponentStatus, HealthResponse, QueryRequest, QueryResponse};
use crate::error::ApiError;
use crate::validation::validate_query;
use crate::ApiState;

/// `POST /api/v1/query`
pub async fn query_handler(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    validate_query(&request).map_err(ApiError::Validation)?;

    let text = request.text.unwrap_or_default();

    tracing::info!(
        query = %mask_for_log(&text),
        vehicle_model = request.vehicle_model.as_deref().unwrap_or("<all>"),
        has_image = request.image_url.is_some() || request.image_base64.is_some(),
        "Query received"
    );

    let result = state
        .orchestrator
        .answer(&text, request.vehicle_model.as_deref())
        .await?;

    tracing::info!(citations = result.citations.len(), "Query answered");

    Ok(Json(QueryResponse::from(result)))
}

/// `GET /health`
///
/// 200 when retriever and generator both respond, 503 otherwise.
pub async fn health_handler(
    State(state): State<Arc<ApiState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let orchestrator = &state.orchestrator;
    let report = orchestrator.health().await;

    let code = if report.is_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: report.status,
        retriever: ComponentStatus {
            name: orchestrator.retriever_name().to_string(),
            status: report.retriever.status,
        },
        generator: ComponentStatus {
            name: orchestrator.generator_name().to_string(),
            status: report.generator.status,
        },
    };

    (code, Json(body))
}
