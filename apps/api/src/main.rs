mod config;
mod embedding;
mod errors;
mod jobs;
mod matching;
mod models;
mod resume;
mod routes;
mod skills;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::embedding::{EmbeddingProvider, HttpEmbeddingProvider};
use crate::jobs::fixtures::SampleJobSource;
use crate::jobs::jsearch::JSearchSource;
use crate::jobs::{JobCatalog, JobSource};
use crate::matching::engine::{EngineSettings, MatchEngine};
use crate::resume::resolver::ResumeResolver;
use crate::routes::build_router;
use crate::skills::extractor::TaxonomyExtractor;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    let embedder = build_embedder(&config).await?;
    info!("Embedding provider initialized (model: {})", embedder.name());

    let engine = Arc::new(MatchEngine::new(
        embedder.clone(),
        Arc::new(TaxonomyExtractor::default()),
        EngineSettings {
            default_threshold: config.match_threshold,
            embed_timeout: config.embedding_timeout,
            concurrency: config.embedding_concurrency.max(1),
        },
    ));

    let catalog = Arc::new(build_catalog(&config)?);
    info!("Job sources: {:?}", catalog.source_names());

    let resolver = ResumeResolver::new(
        &config.backend_url,
        config.request_timeout,
        config.max_file_bytes(),
    )?;

    let state = AppState {
        config: config.clone(),
        engine,
        embedder,
        catalog,
        resolver,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding_backend {
        EmbeddingBackend::Http => Ok(Arc::new(HttpEmbeddingProvider::new(
            config.embedding_api_url.clone(),
            config.embedding_api_key.clone(),
            config.embedding_model.clone(),
            config.embedding_timeout,
        )?)),
        #[cfg(feature = "local-embeddings")]
        EmbeddingBackend::Local => Ok(Arc::new(
            embedding::local::LocalEmbeddingProvider::new(&config.embedding_model).await?,
        )),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingBackend::Local => anyhow::bail!(
            "EMBEDDING_BACKEND=local requires building with the `local-embeddings` feature"
        ),
    }
}

/// JSearch first when a key is configured, built-in samples after it.
fn build_catalog(config: &Config) -> Result<JobCatalog> {
    let mut sources: Vec<Arc<dyn JobSource>> = Vec::new();

    if let Some(key) = &config.jsearch_api_key {
        sources.push(Arc::new(JSearchSource::new(
            &config.jsearch_base_url,
            key.clone(),
            config.request_timeout,
        )?));
    }
    if config.use_mock_data {
        sources.push(Arc::new(SampleJobSource));
    }
    if sources.is_empty() {
        tracing::warn!("No job sources configured; searches will return nothing");
    }

    Ok(JobCatalog::new(sources))
}
