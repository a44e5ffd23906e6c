use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::SkillRecord;
use crate::resume::analysis::{analyze, ResumeAnalysis};
use crate::resume::ats::{ats_report, AtsReport};
use crate::resume::extract::{extract_file, ExtractedFile};
use crate::resume::optimize::{optimize, OptimizationReport};
use crate::resume::resolver::ResumeRef;
use crate::skills::find_skill_gap;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    #[serde(flatten)]
    pub resume: ResumeRef,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    pub resume: ResumeRef,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    #[serde(flatten)]
    pub resume: ResumeRef,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct SkillGapRequest {
    #[serde(flatten)]
    pub resume: ResumeRef,
    pub job_skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub total: usize,
    pub skills: Vec<SkillRecord>,
}

#[derive(Debug, Serialize)]
pub struct SkillGapResponse {
    pub missing_skills: Vec<String>,
    pub matched_count: usize,
    pub total_required: usize,
}

/// POST /api/v1/resumes/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let resume_text = state.resolver.resolve(&req.resume).await?;
    let analysis = analyze(
        &resume_text,
        req.job_description.as_deref(),
        state.engine.extractor(),
    )?;
    info!(
        "Analyzed resume: ATS {:.1}, {} skills",
        analysis.ats_score,
        analysis.skills.len()
    );
    Ok(Json(analysis))
}

/// POST /api/v1/resumes/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<AtsReport>, AppError> {
    let resume_text = state.resolver.resolve(&req.resume).await?;
    Ok(Json(ats_report(&resume_text, state.engine.extractor())))
}

/// POST /api/v1/resumes/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizationReport>, AppError> {
    if req.job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }
    let resume_text = state.resolver.resolve(&req.resume).await?;
    let report = optimize(&resume_text, &req.job_description, state.engine.extractor())?;
    Ok(Json(report))
}

/// POST /api/v1/resumes/skills
pub async fn handle_skills(
    State(state): State<AppState>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<SkillsResponse>, AppError> {
    let resume_text = state.resolver.resolve(&req.resume).await?;
    let skills = state.engine.extractor().extract_skills(&resume_text);
    Ok(Json(SkillsResponse {
        total: skills.len(),
        skills,
    }))
}

/// POST /api/v1/resumes/skill-gap
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    Json(req): Json<SkillGapRequest>,
) -> Result<Json<SkillGapResponse>, AppError> {
    let resume_text = state.resolver.resolve(&req.resume).await?;
    let missing_skills = find_skill_gap(&req.job_skills, &resume_text);
    Ok(Json(SkillGapResponse {
        matched_count: req.job_skills.len() - missing_skills.len(),
        total_required: req.job_skills.len(),
        missing_skills,
    }))
}

/// POST /api/v1/resumes/upload
///
/// Expects a multipart form with a `file` field (.pdf, .docx or .txt).
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractedFile>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("uploaded file has no file name".to_string()))?;
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let extracted = extract_file(file_name, bytes, state.config.max_file_bytes()).await?;
        info!(
            "Processed upload {}: {} bytes, {} words",
            extracted.file_name, extracted.file_size, extracted.word_count
        );
        return Ok(Json(extracted));
    }

    Err(AppError::Validation(format!(
        "multipart form must contain a '{UPLOAD_FIELD}' field"
    )))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("invalid multipart body: {}", e.body_text()))
    }
}
