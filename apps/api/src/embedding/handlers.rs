use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::{check_batch, EmbeddingError};
use crate::errors::AppError;
use crate::state::AppState;

const MAX_TEXTS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct EmbeddingsRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingsResponse {
    pub model: String,
    pub dimensions: usize,
    pub embeddings: Vec<Vec<f32>>,
}

/// POST /api/v1/embeddings
pub async fn handle_embeddings(
    State(state): State<AppState>,
    Json(req): Json<EmbeddingsRequest>,
) -> Result<Json<EmbeddingsResponse>, AppError> {
    validate_texts(&req.texts)?;

    let budget = state.config.embedding_timeout;
    let embeddings = tokio::time::timeout(budget, state.embedder.embed(&req.texts))
        .await
        .map_err(|_| EmbeddingError::Timeout(budget))??;
    check_batch(req.texts.len(), &embeddings)?;
    debug!("Embedded {} texts with {}", req.texts.len(), state.embedder.name());

    Ok(Json(EmbeddingsResponse {
        model: state.embedder.name().to_string(),
        dimensions: embeddings.first().map_or(0, Vec::len),
        embeddings,
    }))
}

fn validate_texts(texts: &[String]) -> Result<(), AppError> {
    if texts.is_empty() {
        return Err(AppError::Validation("texts cannot be empty".to_string()));
    }
    if texts.len() > MAX_TEXTS {
        return Err(AppError::Validation(format!(
            "at most {MAX_TEXTS} texts per request, got {}",
            texts.len()
        )));
    }
    Ok(())
}
