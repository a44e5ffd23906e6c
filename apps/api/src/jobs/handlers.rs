use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::jobs::normalize::normalize_job;
use crate::jobs::JobQuery;
use crate::matching::aggregation::search_insights;
use crate::matching::dedup::dedup_jobs;
use crate::matching::engine::validate_threshold;
use crate::models::job::JobPosting;
use crate::models::matching::{MatchReport, RankOutcome, SearchInsights};
use crate::resume::resolver::ResumeRef;
use crate::state::AppState;

const MAX_LIMIT: usize = 100;

fn default_search_limit() -> usize {
    20
}

fn default_rank_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remote_only: bool,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    /// When present, the fetched postings are also ranked against it.
    #[serde(flatten)]
    pub resume: ResumeRef,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub jobs: Vec<JobPosting>,
    pub insights: SearchInsights,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked: Option<RankOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(flatten)]
    pub resume: ResumeRef,
    pub jobs: Vec<Value>,
    #[serde(default = "default_rank_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(flatten)]
    pub resume: ResumeRef,
    pub jobs: Vec<Value>,
    /// Falls back to `MATCH_THRESHOLD`.
    #[serde(default)]
    pub match_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub jobs: Vec<Value>,
}

/// POST /api/v1/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    validate_limit(req.limit)?;
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let query = JobQuery {
        query: req.query.trim().to_string(),
        location: req.location.clone(),
        remote_only: req.remote_only,
        limit: req.limit.min(state.config.max_jobs_per_search),
    };
    let jobs = state.catalog.search(&query).await?;
    let insights = search_insights(&jobs);

    let ranked = if req.resume.is_empty() {
        None
    } else {
        let resume_text = state.resolver.resolve(&req.resume).await?;
        Some(state.engine.rank(&resume_text, &jobs, req.limit).await?)
    };

    Ok(Json(SearchResponse {
        total: jobs.len(),
        jobs,
        insights,
        ranked,
    }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobPosting>, AppError> {
    let job = state.catalog.find(&id).await?;
    Ok(Json(job))
}

/// POST /api/v1/jobs/rank
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<RankOutcome>, AppError> {
    validate_limit(req.limit)?;
    let jobs = normalize_batch(&req.jobs);
    let resume_text = state.resolver.resolve(&req.resume).await?;
    let outcome = state.engine.rank(&resume_text, &jobs, req.limit).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/jobs/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchReport>, AppError> {
    let threshold = req
        .match_threshold
        .unwrap_or_else(|| state.engine.default_threshold());
    validate_threshold(threshold)?;

    let jobs = normalize_batch(&req.jobs);
    let resume_text = state.resolver.resolve(&req.resume).await?;
    let report = state
        .engine
        .match_jobs(&resume_text, &jobs, Some(threshold))
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/jobs/insights
pub async fn handle_insights(
    Json(req): Json<InsightsRequest>,
) -> Result<Json<SearchInsights>, AppError> {
    let jobs = normalize_batch(&req.jobs);
    Ok(Json(search_insights(&jobs)))
}

fn validate_limit(limit: usize) -> Result<(), AppError> {
    if (1..=MAX_LIMIT).contains(&limit) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {limit}"
        )))
    }
}

/// Caller-supplied postings go through the same adapter and dedup as
/// catalog results.
fn normalize_batch(raw: &[Value]) -> Vec<JobPosting> {
    dedup_jobs(raw.iter().map(normalize_job).collect())
}
