//! JSearch (RapidAPI) job source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::jobs::{JobQuery, JobSource};

#[derive(Debug, Deserialize)]
struct JSearchResponse {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Clone)]
pub struct JSearchSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl JSearchSource {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn host(&self) -> &str {
        host_of(&self.base_url)
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>, AppError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", self.host())
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("JSearch request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("JSearch returned {status}: {body}")));
        }

        let parsed: JSearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("JSearch response was not valid JSON: {e}")))?;
        Ok(parsed.data)
    }
}

#[async_trait]
impl JobSource for JSearchSource {
    fn name(&self) -> &str {
        "jsearch"
    }

    /// Failures degrade to an empty page so the next source can answer.
    async fn search(&self, query: &JobQuery) -> Result<Vec<Value>, AppError> {
        let params = search_params(query);
        match self.get("search", &params).await {
            Ok(mut jobs) => {
                jobs.truncate(query.limit);
                debug!("JSearch returned {} postings", jobs.len());
                Ok(jobs)
            }
            Err(e) => {
                warn!("JSearch search failed, continuing without it: {e}");
                Ok(Vec::new())
            }
        }
    }

    async fn fetch(&self, id: &str) -> Result<Option<Value>, AppError> {
        let jobs = self
            .get("job-details", &[("job_id", id.to_string())])
            .await?;
        Ok(jobs.into_iter().next())
    }
}

fn search_params(query: &JobQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("query", query.query.clone()),
        ("num_pages", "1".to_string()),
    ];
    if let Some(location) = query.location.as_deref().filter(|l| !l.trim().is_empty()) {
        params.push(("location", location.to_string()));
    }
    if query.remote_only {
        params.push(("remote_jobs_only", "true".to_string()));
    }
    params
}

fn host_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}
