//! Configuration management for the owner-manual assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config file (.manual/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Validation of ranges and provider requirements happens in
//! [`AppConfig::validate`], before any query is answered.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult, FieldError};

/// Allowed range for the number of passages retrieved per question.
pub const TOP_K_RANGE: std::ops::RangeInclusive<u32> = 1..=50;

/// Allowed range for the total passage text forwarded to the model.
pub const MAX_CONTEXT_CHARS_RANGE: std::ops::RangeInclusive<u32> = 500..=100_000;

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["ollama", "openai", "groq"];

const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 60;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .manual/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("ollama", "openai", "groq")
    pub provider: String,

    /// Chat model identifier
    pub model: String,

    /// Explicit API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Retrieval and context-budget settings
    pub query: QueryConfig,

    /// Sampling settings for answer generation
    pub generation: GenerationConfig,

    /// Which vector index backs retrieval
    pub retriever: RetrieverConfig,

    /// HTTP listener settings
    pub server: ServerConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    /// Any OpenAI-compatible chat completions endpoint (OpenAI, Groq, ...)
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::OpenAI { model, .. } | ProviderConfig::Ollama { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    pub fn timeout(&self) -> Option<u64> {
        match self {
            ProviderConfig::OpenAI { timeout, .. } | ProviderConfig::Ollama { timeout, .. } => {
                *timeout
            }
        }
    }
}

/// Retrieval settings consumed by the answer orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum passages requested from the retriever
    #[serde(rename = "topK")]
    pub top_k: u32,

    /// Maximum cumulative passage text (in characters) sent to the model
    #[serde(rename = "maxContextChars")]
    pub max_context_chars: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chars: 8_000,
        }
    }
}

impl QueryConfig {
    /// Check both settings against their allowed ranges.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if !TOP_K_RANGE.contains(&self.top_k) {
            errors.push(FieldError::new(
                "query.topK",
                format!(
                    "must be between {} and {}",
                    TOP_K_RANGE.start(),
                    TOP_K_RANGE.end()
                ),
            ));
        }

        if !MAX_CONTEXT_CHARS_RANGE.contains(&self.max_context_chars) {
            errors.push(FieldError::new(
                "query.maxContextChars",
                format!(
                    "must be between {} and {}",
                    MAX_CONTEXT_CHARS_RANGE.start(),
                    MAX_CONTEXT_CHARS_RANGE.end()
                ),
            ));
        }

        errors
    }
}

/// Sampling settings for answer generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,

    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1024,
        }
    }
}

/// Vector index backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverBackend {
    /// Passages held in process, loaded from JSONL or the built-in seed set
    #[default]
    Memory,
    /// Remote Qdrant collection
    Qdrant,
}

impl RetrieverBackend {
    /// Parse backend from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Some(Self::Memory),
            "qdrant" => Some(Self::Qdrant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Qdrant => "qdrant",
        }
    }
}

/// Retriever configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub backend: RetrieverBackend,

    /// JSONL file of passages for the in-memory backend (seed set if absent)
    #[serde(rename = "passagesFile", skip_serializing_if = "Option::is_none")]
    pub passages_file: Option<PathBuf>,

    pub qdrant: QdrantConfig,

    pub embedding: EmbeddingConfig,
}

/// Qdrant connectivity settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    /// gRPC URL (e.g., "http://localhost:6334")
    pub url: String,

    pub collection: String,

    /// Environment variable holding the API key (required for TLS endpoints)
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "owner_manual_chunks".to_string(),
            api_key_env: "QDRANT_API_KEY".to_string(),
            timeout: 10,
        }
    }
}

impl QdrantConfig {
    pub fn uses_tls(&self) -> bool {
        self.url.trim().to_lowercase().starts_with("https://")
    }

    /// Resolve the API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Query embedding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    pub model: String,

    pub dimensions: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            timeout: 30,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    query: Option<QueryConfig>,
    generation: Option<GenerationConfig>,
    retriever: Option<RetrieverConfig>,
    server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            query: QueryConfig::default(),
            generation: GenerationConfig::default(),
            retriever: RetrieverConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `MANUAL_WORKSPACE`: Override workspace path
    /// - `MANUAL_CONFIG`: Path to config file
    /// - `MANUAL_PROVIDER`: LLM provider
    /// - `MANUAL_MODEL`: Model identifier
    /// - `MANUAL_API_KEY`: API key
    /// - `MANUAL_TOP_K`, `MANUAL_MAX_CONTEXT_CHARS`: Query settings
    /// - `MANUAL_RETRIEVER`: "memory" or "qdrant"
    /// - `QDRANT_URL`: Qdrant gRPC URL
    /// - `MANUAL_HOST`, `MANUAL_PORT`: HTTP listener
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use manual_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Top-k: {}", config.query.top_k);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(
            std::env::var("MANUAL_WORKSPACE").ok().map(PathBuf::from),
            std::env::var("MANUAL_CONFIG").ok().map(PathBuf::from),
        )
    }

    /// Like [`AppConfig::load`], with the workspace and config file given
    /// explicitly (e.g. from CLI flags) so the right YAML file is read.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.manual_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        config.apply_env()?;

        Ok(config)
    }

    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(provider) = std::env::var("MANUAL_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("MANUAL_MODEL") {
            self.model = model;
        }

        if let Ok(key) = std::env::var("MANUAL_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(top_k) = std::env::var("MANUAL_TOP_K") {
            self.query.top_k = parse_env("MANUAL_TOP_K", &top_k)?;
        }

        if let Ok(max_chars) = std::env::var("MANUAL_MAX_CONTEXT_CHARS") {
            self.query.max_context_chars = parse_env("MANUAL_MAX_CONTEXT_CHARS", &max_chars)?;
        }

        if let Ok(backend) = std::env::var("MANUAL_RETRIEVER") {
            self.retriever.backend = RetrieverBackend::parse(&backend).ok_or_else(|| {
                AppError::Config(format!(
                    "Unknown retriever backend in MANUAL_RETRIEVER: {}",
                    backend
                ))
            })?;
        }

        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.retriever.qdrant.url = url;
        }

        if let Ok(host) = std::env::var("MANUAL_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("MANUAL_PORT") {
            self.server.port = parse_env("MANUAL_PORT", &port)?;
        }

        if self.log_level.is_none() {
            self.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(query) = config_file.query {
            result.query = query;
        }

        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }

        if let Some(retriever) = config_file.retriever {
            result.retriever = retriever;
        }

        if let Some(server) = config_file.server {
            result.server = server;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the YAML file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .manual directory.
    pub fn manual_dir(&self) -> PathBuf {
        self.workspace.join(".manual")
    }

    /// Get the active provider configuration.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Endpoint configured for a provider, if any.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint().map(str::to_string))
    }

    /// Request timeout for a provider (configured or default).
    pub fn provider_timeout(&self, provider: &str) -> Duration {
        let secs = self
            .get_provider_config(provider)
            .and_then(|pc| pc.timeout())
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Resolve API key from explicit setting or environment.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => Some(api_key_env),
            Some(ProviderConfig::Ollama { .. }) => None,
            None => default_api_key_env(provider).map(str::to_string),
        };

        env_var
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate configuration before serving queries.
    pub fn validate(&self) -> AppResult<()> {
        let field_errors = self.query.validate();
        if !field_errors.is_empty() {
            return Err(AppError::Validation(field_errors));
        }

        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Chat model is required".to_string()));
        }

        if provider != "ollama" && self.resolve_api_key(&provider).is_none() {
            return Err(AppError::Config(format!(
                "API key for provider '{}' not found; set {} or MANUAL_API_KEY",
                self.provider,
                self.api_key_env_name(&provider)
            )));
        }

        if self.retriever.backend == RetrieverBackend::Qdrant {
            let qdrant = &self.retriever.qdrant;
            if qdrant.url.trim().is_empty() {
                return Err(AppError::Config(
                    "Qdrant URL is required; set QDRANT_URL".to_string(),
                ));
            }
            if qdrant.collection.trim().is_empty() {
                return Err(AppError::Config(
                    "Qdrant collection name is required".to_string(),
                ));
            }
            if qdrant.uses_tls() && qdrant.resolve_api_key().is_none() {
                return Err(AppError::Config(format!(
                    "Qdrant API key is required for TLS endpoints; set {}",
                    qdrant.api_key_env
                )));
            }
        }

        Ok(())
    }

    fn api_key_env_name(&self, provider: &str) -> String {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => api_key_env,
            _ => default_api_key_env(provider)
                .unwrap_or("MANUAL_API_KEY")
                .to_string(),
        }
    }
}

fn default_api_key_env(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("OPENAI_API_KEY"),
        "groq" => Some("GROQ_API_KEY"),
        _ => None,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        AppError::Config(format!(
            "Failed to parse environment variable {} = '{}'",
            key, value
        ))
    })
}
