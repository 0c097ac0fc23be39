//! Docqa — document QA-generation server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod cache_stats;
mod review_log;
mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("DOCQA_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    // A missing GEMINI_API_KEY fails here, not inside request handling.
    let config = docqa_core::DocqaConfig::from_env(&data_dir)?;
    let port = config.port;

    if config.neo4j.is_none() {
        info!("NEO4J_URI not set, rule graph disabled");
    }

    let state = Arc::new(AppState::new(config));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Docqa server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
