//! Qdrant-backed retriever.
//!
//! The query is embedded locally, searched against the configured collection
//! with an optional `vehicle_model` keyword filter, and each hit's payload is
//! mapped back to a [`Passage`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use manual_core::config::QdrantConfig;
use manual_core::{AppError, AppResult};
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{Condition, Filter, ScoredPoint, SearchPointsBuilder, Value as QValue};
use qdrant_client::Qdrant;
use serde_json::{Map, Value};

use crate::embeddings::EmbeddingProvider;
use crate::health::ComponentHealth;
use crate::retriever::{normalize_scope, Retriever};
use crate::types::Passage;

const KEY_CHUNK_ID: &str = "chunk_id";
/// Body field written by document-oriented vector store clients.
const KEY_DOC_CONTENT: &str = "doc_content";
const KEY_TEXT: &str = "text";
const KEY_MANUAL_ID: &str = "manual_id";
const KEY_VEHICLE_MODEL: &str = "vehicle_model";
const KEY_SECTION: &str = "section";
const KEY_PAGE: &str = "page";

/// Upper bound on the collection lookup done by health checks.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Placeholder for required payload fields that are missing or blank.
const UNKNOWN: &str = "unknown";

pub struct QdrantRetriever {
    client: Qdrant,
    collection: String,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl QdrantRetriever {
    /// Build the client. No connection is made until the first search.
    pub fn connect(config: &QdrantConfig, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        let mut builder =
            Qdrant::from_url(&config.url).timeout(Duration::from_secs(config.timeout));

        if let Some(key) = config.resolve_api_key() {
            builder = builder.api_key(key);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build Qdrant client: {}", e)))?;

        tracing::info!(url = %config.url, collection = %config.collection, "Qdrant retriever ready");

        Ok(Self {
            client,
            collection: config.collection.clone(),
            embedder,
        })
    }
}

#[async_trait::async_trait]
impl Retriever for QdrantRetriever {
    fn name(&self) -> &str {
        "qdrant"
    }

    async fn search(
        &self,
        query: &str,
        scope: Option<&str>,
        top_k: usize,
    ) -> AppResult<Vec<Passage>> {
        if query.trim().is_empty() {
            tracing::warn!("search called with blank query; returning no passages");
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await.map_err(|e| match e {
            AppError::Retrieval(_) => e,
            other => AppError::Retrieval(format!("Query embedding failed: {}", other)),
        })?;

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k as u64).with_payload(true);

        if let Some(filter) = scope_filter(scope) {
            builder = builder.filter(filter);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| AppError::Retrieval(format!("Qdrant search failed: {}", e)))?;

        tracing::debug!(hits = response.result.len(), "Qdrant search complete");

        Ok(response.result.into_iter().map(point_to_passage).collect())
    }

    /// Any answer to the collection lookup (present or not) counts as
    /// reachable; errors and timeouts do not.
    async fn health(&self) -> ComponentHealth {
        let lookup = tokio::time::timeout(
            HEALTH_CHECK_TIMEOUT,
            self.client.collection_exists(&self.collection),
        )
        .await;

        let store = match lookup {
            Ok(Ok(exists)) => ComponentHealth::up().with_detail("collectionExists", exists),
            Ok(Err(e)) => {
                tracing::warn!("Qdrant health check failed: {}", e);
                ComponentHealth::down(e.to_string())
            }
            Err(_) => {
                tracing::warn!("Qdrant health check timed out after {:?}", HEALTH_CHECK_TIMEOUT);
                ComponentHealth::down("timeout")
            }
        };

        store
            .with_detail("collection", self.collection.as_str())
            .merge("embedding", self.embedder.health().await)
    }
}

/// Keyword match on `vehicle_model`, or no filter for a blank scope.
fn scope_filter(scope: Option<&str>) -> Option<Filter> {
    normalize_scope(scope)
        .map(|s| Filter::must([Condition::matches(KEY_VEHICLE_MODEL, s.to_string())]))
}

fn point_to_passage(point: ScoredPoint) -> Passage {
    let point_id = point
        .id
        .and_then(|id| id.point_id_options)
        .map(|options| match options {
            PointIdOptions::Uuid(s) => s,
            PointIdOptions::Num(n) => n.to_string(),
        });

    passage_from_payload(point_id, &payload_to_json(point.payload))
}

/// Convert scalar payload values to JSON; nested values become `Null`.
fn payload_to_json(payload: HashMap<String, QValue>) -> Map<String, Value> {
    payload
        .into_iter()
        .map(|(key, value)| {
            let json = match value.kind {
                Some(Kind::StringValue(s)) => Value::String(s),
                Some(Kind::IntegerValue(i)) => Value::from(i),
                Some(Kind::DoubleValue(f)) => Value::from(f),
                Some(Kind::BoolValue(b)) => Value::Bool(b),
                _ => Value::Null,
            };
            (key, json)
        })
        .collect()
}

/// Map a search hit's payload to a passage.
///
/// The id prefers the `chunk_id` payload field over the point id. Text comes
/// from `doc_content`, falling back to `text`. Missing required fields become
/// `"unknown"`; a page may be stored as a number or a numeric string.
fn passage_from_payload(point_id: Option<String>, payload: &Map<String, Value>) -> Passage {
    let required = |key: &str| non_blank(string_field(payload, key));

    let id = required(KEY_CHUNK_ID)
        .or_else(|| non_blank(point_id))
        .unwrap_or_else(|| UNKNOWN.to_string());

    Passage {
        id,
        text: string_field(payload, KEY_DOC_CONTENT)
            .or_else(|| string_field(payload, KEY_TEXT))
            .unwrap_or_default(),
        source_doc_id: required(KEY_MANUAL_ID).unwrap_or_else(|| UNKNOWN.to_string()),
        scope_tag: required(KEY_VEHICLE_MODEL).unwrap_or_else(|| UNKNOWN.to_string()),
        section: string_field(payload, KEY_SECTION),
        page: page_field(payload),
    }
}

fn string_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn page_field(payload: &Map<String, Value>) -> Option<u32> {
    match payload.get(KEY_PAGE)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|p| u32::try_from(p).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
