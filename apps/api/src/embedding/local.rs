//! In-process embedding backend on fastembed (all-MiniLM-L6-v2, 384 dims).
//!
//! `TextEmbedding::embed` takes `&mut self` and is CPU-bound, so the model
//! sits behind a `Mutex` and every call runs on a blocking thread.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{check_batch, EmbeddingError, EmbeddingProvider};

pub struct LocalEmbeddingProvider {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
}

impl LocalEmbeddingProvider {
    /// Loads the model, downloading it on first run.
    pub async fn new(model_name: &str) -> Result<Self, EmbeddingError> {
        let model_enum = parse_model_name(model_name)?;
        let model = tokio::task::spawn_blocking(move || {
            TextEmbedding::try_new(InitOptions::new(model_enum).with_show_download_progress(true))
        })
        .await
        .map_err(|e| EmbeddingError::Model(format!("spawn_blocking join error: {e}")))?
        .map_err(|e| EmbeddingError::Model(format!("model initialization failed: {e}")))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: model_name.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = Arc::clone(&self.model);
        let inputs = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| EmbeddingError::Model(format!("model lock poisoned: {e}")))?;
            model
                .embed(inputs, None)
                .map_err(|e| EmbeddingError::Model(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Model(format!("spawn_blocking join error: {e}")))??;

        check_batch(texts.len(), &vectors)?;
        Ok(vectors)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

fn parse_model_name(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
    let short = name.rsplit('/').next().unwrap_or(name).to_lowercase();
    match short.as_str() {
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l6-v2-q" => Ok(EmbeddingModel::AllMiniLML6V2Q),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        _ => Err(EmbeddingError::Model(format!("unsupported local model '{name}'"))),
    }
}
