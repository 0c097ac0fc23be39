//! Configuration and data directory management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Paths to the service's on-disk data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Review-log JSONL files, one per UTC day (`data/reviews/`).
    pub reviews: PathBuf,
    /// Cache/token usage log (`data/cache-stats.jsonl`).
    pub cache_stats_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            reviews: root.join("reviews"),
            cache_stats_file: root.join("cache-stats.jsonl"),
            root,
        };
        std::fs::create_dir_all(&paths.reviews)?;
        Ok(paths)
    }
}

/// Neo4j connection settings. The graph is an optional collaborator;
/// when absent the workflow layer falls back to built-in rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jSettings {
    /// HTTP endpoint, e.g. `http://localhost:7474`.
    pub endpoint: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct DocqaConfig {
    /// HTTP server port.
    pub port: u16,
    pub data_paths: DataPaths,
    /// Gemini API key. Required — startup fails without it.
    pub gemini_api_key: String,
    /// Model names tried in order on rate-limit.
    pub gemini_models: Vec<String>,
    pub neo4j: Option<Neo4jSettings>,
    /// Hard deadline for one workspace request.
    pub request_timeout_secs: u64,
}

const DEFAULT_GEMINI_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];

impl DocqaConfig {
    /// Create configuration from environment and defaults.
    ///
    /// A missing Gemini API key is a hard configuration error: the
    /// LLM is a required dependency and must fail at startup, not deep
    /// inside request handling.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8600);

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY is not set".into()))?;

        let gemini_models = std::env::var("GEMINI_MODELS")
            .ok()
            .map(|v| v.split(',').map(|m| m.trim().to_string()).collect())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect());

        let neo4j = std::env::var("NEO4J_URI").ok().map(|endpoint| Neo4jSettings {
            endpoint,
            database: std::env::var("NEO4J_DATABASE").unwrap_or_else(|_| "neo4j".into()),
            username: std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".into()),
            password: std::env::var("NEO4J_PASSWORD").unwrap_or_default(),
        });

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            gemini_api_key,
            gemini_models,
            neo4j,
            request_timeout_secs,
        })
    }
}
