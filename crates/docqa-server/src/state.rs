//! Shared application state.

use docqa_core::DocqaConfig;
use docqa_graph::Neo4jClient;
use docqa_llm::GeminiClient;

use crate::cache_stats::CacheStats;
use crate::review_log::ReviewLog;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: DocqaConfig,
    pub llm: GeminiClient,
    /// Absent when NEO4J_URI is not configured; the executor degrades
    /// to built-in rules.
    pub graph: Option<Neo4jClient>,
    pub review_log: ReviewLog,
    pub cache_stats: CacheStats,
}

impl AppState {
    pub fn new(config: DocqaConfig) -> Self {
        let llm = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_models.clone());
        let graph = config.neo4j.as_ref().map(Neo4jClient::new);
        let review_log = ReviewLog::new(&config.data_paths.reviews);
        let cache_stats = CacheStats::new(&config.data_paths.cache_stats_file);

        Self {
            config,
            llm,
            graph,
            review_log,
            cache_stats,
        }
    }
}
