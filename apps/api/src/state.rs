use std::sync::Arc;

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::jobs::JobCatalog;
use crate::matching::engine::MatchEngine;
use crate::resume::resolver::ResumeResolver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<MatchEngine>,
    /// Same provider the engine holds; used directly by the embeddings endpoint.
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub catalog: Arc<JobCatalog>,
    pub resolver: ResumeResolver,
}
