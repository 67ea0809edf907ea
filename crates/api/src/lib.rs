//! HTTP API for the owner-manual assistant.
//!
//! Exposes `POST /api/v1/query` for answering questions and `GET /health`
//! for downstream health checks. Built on Axum; one [`AnswerOrchestrator`] is
//! shared by all requests.

pub mod dto;
pub mod error;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use manual_core::{AppConfig, AppResult};
use manual_knowledge::AnswerOrchestrator;
use tokio::signal;

pub use error::ApiError;

/// Shared application state.
pub struct ApiState {
    pub orchestrator: AnswerOrchestrator,
}

impl ApiState {
    pub fn new(orchestrator: AnswerOrchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Build the router with all API routes.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(routes::health_handler))
        .route("/api/v1/query", post(routes::query_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire the pipeline from configuration and serve until Ctrl+C.
pub async fn start(config: &AppConfig) -> AppResult<()> {
    let orchestrator = AnswerOrchestrator::from_config(config).await?;

    tracing::info!(
        retriever = orchestrator.retriever_name(),
        generator = orchestrator.generator_name(),
        top_k = orchestrator.options().top_k,
        max_context_chars = orchestrator.options().max_context_chars,
        "Answer pipeline ready"
    );

    let app = build_router(Arc::new(ApiState::new(orchestrator)));

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use manual_core::{AppError, AppResult};
    use manual_knowledge::{ComponentHealth, Generator, Passage, QueryOptions, Retriever};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    enum Outcome {
        Passages(Vec<Passage>),
        Fail,
    }

    struct StubRetriever(Outcome);

    #[async_trait::async_trait]
    impl Retriever for StubRetriever {
        fn name(&self) -> &str {
            "stub"
        }

        async fn search(
            &self,
            _query: &str,
            scope: Option<&str>,
            _top_k: usize,
        ) -> AppResult<Vec<Passage>> {
            match &self.0 {
                Outcome::Passages(p) => Ok(p
                    .iter()
                    .filter(|p| scope.map_or(true, |s| p.scope_tag == s))
                    .cloned()
                    .collect()),
                Outcome::Fail => Err(AppError::Retrieval("connection refused".into())),
            }
        }

        async fn health(&self) -> ComponentHealth {
            match self.0 {
                Outcome::Passages(_) => ComponentHealth::up(),
                Outcome::Fail => ComponentHealth::down("connection refused"),
            }
        }
    }

    struct StubGenerator(Option<&'static str>);

    #[async_trait::async_trait]
    impl Generator for StubGenerator {
        fn name(&self) -> &str {
            "stub-llm"
        }

        async fn generate(&self, _system: &str, _user: &str) -> AppResult<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| AppError::Generation("upstream 500".into()))
        }

        async fn health(&self) -> ComponentHealth {
            match self.0 {
                Some(_) => ComponentHealth::up(),
                None => ComponentHealth::down("upstream 500"),
            }
        }
    }

    fn app(retriever: Outcome, answer: Option<&'static str>) -> Router {
        let orchestrator = AnswerOrchestrator::new(
            Arc::new(StubRetriever(retriever)),
            Arc::new(StubGenerator(answer)),
            QueryOptions::default(),
        );
        build_router(Arc::new(ApiState::new(orchestrator)))
    }

    fn oil_passage() -> Passage {
        Passage::new("c1", "Oil change interval is 5000 miles.", "m1", "model-a")
            .unwrap()
            .with_section("Maintenance")
            .with_page(1)
    }

    async fn post_query(app: Router, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/query")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_health(app: Router) -> (StatusCode, Value) {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get_health(app(Outcome::Passages(vec![]), Some("ok"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "status": "UP",
                "retriever": { "name": "stub", "status": "UP" },
                "generator": { "name": "stub-llm", "status": "UP" }
            })
        );
    }

    #[tokio::test]
    async fn health_reports_unreachable_retriever() {
        let (status, body) = get_health(app(Outcome::Fail, Some("ok"))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "DOWN");
        assert_eq!(body["retriever"]["status"], "DOWN");
        assert_eq!(body["generator"]["status"], "UP");
        assert!(!body.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn health_reports_failing_generator() {
        let (status, body) = get_health(app(Outcome::Passages(vec![]), None)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "DOWN");
        assert_eq!(body["retriever"]["status"], "UP");
        assert_eq!(body["generator"]["name"], "stub-llm");
        assert_eq!(body["generator"]["status"], "DOWN");
    }

    #[tokio::test]
    async fn query_returns_answer_and_citations() {
        let app = app(Outcome::Passages(vec![oil_passage()]), Some("Every 5000 miles."));
        let (status, body) =
            post_query(app, r#"{"text":"What is the oil change interval?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "answer": "Every 5000 miles.",
                "citations": [{
                    "chunkId": "c1",
                    "section": "Maintenance",
                    "snippet": "Oil change interval is 5000 miles.",
                    "page": 1
                }]
            })
        );
    }

    #[tokio::test]
    async fn vehicle_model_filters_passages() {
        let app = app(Outcome::Passages(vec![oil_passage()]), Some("unused"));
        let (status, body) =
            post_query(app, r#"{"text":"oil?","vehicleModel":"model-b"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "No relevant sections found.");
        assert_eq!(body["citations"], json!([]));
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let app = app(Outcome::Passages(vec![oil_passage()]), Some("ok"));
        let (status, body) = post_query(app, r#"{"text":"  "}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["fieldErrors"][0]["field"], "text");
        assert_eq!(body["fieldErrors"][0]["message"], "query text is required");
        assert!(body["traceId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let app = app(Outcome::Passages(vec![]), Some("ok"));
        let (status, body) = post_query(app, "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fieldErrors"][0]["field"], "body");
    }

    #[tokio::test]
    async fn retrieval_failure_maps_to_503() {
        let app = app(Outcome::Fail, Some("ok"));
        let (status, body) = post_query(app, r#"{"text":"oil?"}"#).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["message"],
            "Search is temporarily unavailable. Please try again later."
        );
        assert!(body.get("fieldErrors").is_none());
        assert!(!body.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn generation_failure_maps_to_503() {
        let app = app(Outcome::Passages(vec![oil_passage()]), None);
        let (status, body) = post_query(app, r#"{"text":"oil?"}"#).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["message"],
            "Answer could not be generated. Please try again later."
        );
        assert!(!body.to_string().contains("upstream 500"));
    }
}
