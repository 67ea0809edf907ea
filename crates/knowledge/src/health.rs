//! Component health reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Up => "UP",
            HealthStatus::Down => "DOWN",
        }
    }
}

/// Status of one downstream dependency plus free-form details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

impl ComponentHealth {
    pub fn up() -> Self {
        Self {
            status: HealthStatus::Up,
            details: BTreeMap::new(),
        }
    }

    /// Down, with a short reason under the `error` detail.
    pub fn down(error: impl Into<String>) -> Self {
        Self::up()
            .with_status(HealthStatus::Down)
            .with_detail("error", error.into())
    }

    pub fn with_status(mut self, status: HealthStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }

    /// Fold another component into this one: down if either is down, with
    /// the other's details stored under `key`.
    pub fn merge(mut self, key: &str, other: ComponentHealth) -> Self {
        if !other.is_up() {
            self.status = HealthStatus::Down;
        }
        let nested = serde_json::to_value(&other).unwrap_or(Value::Null);
        self.details.insert(key.to_string(), nested);
        self
    }
}

/// Health of the whole answer pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Up only when every component is up
    pub status: HealthStatus,
    pub retriever: ComponentHealth,
    pub generator: ComponentHealth,
}

impl HealthReport {
    pub fn new(retriever: ComponentHealth, generator: ComponentHealth) -> Self {
        let status = if retriever.is_up() && generator.is_up() {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };

        Self {
            status,
            retriever,
            generator,
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}
