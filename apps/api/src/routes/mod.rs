pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::embedding::handlers as embedding_handlers;
use crate::jobs::handlers as job_handlers;
use crate::resume::handlers as resume_handlers;
use crate::state::AppState;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_file_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs
        .route("/api/v1/jobs/search", post(job_handlers::handle_search))
        .route("/api/v1/jobs/rank", post(job_handlers::handle_rank))
        .route("/api/v1/jobs/match", post(job_handlers::handle_match))
        .route("/api/v1/jobs/insights", post(job_handlers::handle_insights))
        .route("/api/v1/jobs/:id", get(job_handlers::handle_get_job))
        // Resumes
        .route("/api/v1/resumes/analyze", post(resume_handlers::handle_analyze))
        .route(
            "/api/v1/resumes/ats-score",
            post(resume_handlers::handle_ats_score),
        )
        .route(
            "/api/v1/resumes/optimize",
            post(resume_handlers::handle_optimize),
        )
        .route("/api/v1/resumes/skills", post(resume_handlers::handle_skills))
        .route(
            "/api/v1/resumes/skill-gap",
            post(resume_handlers::handle_skill_gap),
        )
        .route(
            "/api/v1/resumes/upload",
            post(resume_handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Embeddings
        .route(
            "/api/v1/embeddings",
            post(embedding_handlers::handle_embeddings),
        )
        .with_state(state)
}
