use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint.
    Http,
    /// In-process fastembed model (`local-embeddings` feature).
    Local,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(EmbeddingBackend::Http),
            "local" => Ok(EmbeddingBackend::Local),
            other => bail!("unknown embedding backend '{other}' (expected 'http' or 'local')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every key has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub embedding_api_url: String,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_timeout: Duration,
    pub embedding_concurrency: usize,
    pub match_threshold: f64,
    pub max_jobs_per_search: usize,
    pub use_mock_data: bool,
    pub jsearch_api_key: Option<String>,
    pub jsearch_base_url: String,
    pub backend_url: String,
    pub request_timeout: Duration,
    pub max_file_size_mb: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let match_threshold: f64 = parse_or(&lookup, "MATCH_THRESHOLD", 0.7)?;
        if !(0.0..=1.0).contains(&match_threshold) {
            bail!("MATCH_THRESHOLD must be between 0 and 1, got {match_threshold}");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: text("RUST_LOG", "info"),
            embedding_api_url: text("EMBEDDING_API_URL", "http://localhost:8081/v1"),
            embedding_api_key: optional("EMBEDDING_API_KEY"),
            embedding_model: text("EMBEDDING_MODEL", "sentence-transformers/all-MiniLM-L6-v2"),
            embedding_backend: parse_or(&lookup, "EMBEDDING_BACKEND", EmbeddingBackend::Http)?,
            embedding_timeout: Duration::from_secs(parse_or(
                &lookup,
                "EMBEDDING_TIMEOUT_SECS",
                30,
            )?),
            embedding_concurrency: parse_or(&lookup, "EMBEDDING_CONCURRENCY", 8)?,
            match_threshold,
            max_jobs_per_search: parse_or(&lookup, "MAX_JOBS_PER_SEARCH", 50)?,
            use_mock_data: parse_or(&lookup, "USE_MOCK_DATA", true)?,
            jsearch_api_key: optional("JSEARCH_API_KEY"),
            jsearch_base_url: text("JSEARCH_BASE_URL", "https://jsearch.p.rapidapi.com"),
            backend_url: text("BACKEND_URL", "http://localhost:8080"),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
            max_file_size_mb: parse_or(&lookup, "MAX_FILE_SIZE_MB", 10)?,
        })
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        _ => Ok(default),
    }
}
