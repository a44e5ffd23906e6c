//! Match Engine: scores a resume against an ordered list of postings.
//!
//! Per job: semantic score from embeddings, keyword score from token overlap,
//! tier from the semantic score. Rank and match modes share the scoring pass
//! and differ only in filtering and the extra fields match mode fills in.
//!
//! Failure policy: the resume embedding failing aborts the call; a single
//! job's embedding failing (or timing out) skips that job and is reported in
//! `partial`.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::embedding::{check_batch, EmbeddingError, EmbeddingProvider};
use crate::errors::AppError;
use crate::matching::aggregation::{match_summary, recommendations};
use crate::matching::keywords::keyword_overlap;
use crate::matching::normalizer::prepare_for_embedding;
use crate::matching::similarity::similarity;
use crate::models::job::JobPosting;
use crate::models::matching::{
    MatchQuality, MatchReport, MatchResult, PartialFailure, RankOutcome, SkippedJob,
};
use crate::models::resume::ResumeDocument;
use crate::skills::jd_parser::derive_requirements;
use crate::skills::{find_skill_gap, SkillExtractor};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Used by match mode when the caller gives no threshold.
    pub default_threshold: f64,
    /// Budget for a single provider call.
    pub embed_timeout: Duration,
    /// Max in-flight per-job embedding calls.
    pub concurrency: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_threshold: 0.7,
            embed_timeout: Duration::from_secs(30),
            concurrency: 8,
        }
    }
}

/// Which extra fields a scoring pass fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Rank,
    Match,
}

struct ScoredSet {
    results: Vec<MatchResult>,
    skipped: Vec<SkippedJob>,
}

pub struct MatchEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn SkillExtractor>,
    settings: EngineSettings,
}

impl MatchEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        extractor: Arc<dyn SkillExtractor>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            embedder,
            extractor,
            settings,
        }
    }

    pub fn extractor(&self) -> &dyn SkillExtractor {
        self.extractor.as_ref()
    }

    pub fn default_threshold(&self) -> f64 {
        self.settings.default_threshold
    }

    /// All jobs, best semantic score first (ties keep input order), at most
    /// `limit`. Threshold plays no part here.
    pub async fn rank(
        &self,
        resume_text: &str,
        jobs: &[JobPosting],
        limit: usize,
    ) -> Result<RankOutcome, AppError> {
        if limit == 0 {
            return Err(AppError::Validation("limit must be at least 1".to_string()));
        }

        let ScoredSet {
            mut results,
            skipped,
        } = self.score(resume_text, jobs, Mode::Rank).await?;

        sort_by_semantic(&mut results);
        results.truncate(limit);

        info!(
            "Ranked {} jobs: returned={}, skipped={}",
            jobs.len(),
            results.len(),
            skipped.len()
        );

        Ok(RankOutcome {
            results,
            partial: PartialFailure::from_skipped(skipped),
        })
    }

    /// Jobs with `semantic_score >= threshold`, with matching keywords,
    /// missing skills, a summary and recommendations.
    pub async fn match_jobs(
        &self,
        resume_text: &str,
        jobs: &[JobPosting],
        threshold: Option<f64>,
    ) -> Result<MatchReport, AppError> {
        let threshold = threshold.unwrap_or(self.settings.default_threshold);
        validate_threshold(threshold)?;

        let ScoredSet {
            mut results,
            skipped,
        } = self.score(resume_text, jobs, Mode::Match).await?;

        results.retain(|r| r.semantic_score >= threshold);
        sort_by_semantic(&mut results);

        info!(
            "Matched {} of {} jobs at threshold {:.2} (skipped={})",
            results.len(),
            jobs.len(),
            threshold,
            skipped.len()
        );

        Ok(MatchReport {
            summary: match_summary(&results),
            recommendations: recommendations(&results),
            results,
            partial: PartialFailure::from_skipped(skipped),
        })
    }

    /// Fixed field order: title, description, declared skills, derived requirements.
    pub fn job_embedding_text(&self, job: &JobPosting) -> String {
        let requirements = derive_requirements(&job.description, self.extractor.as_ref());
        let parts = [
            job.title.clone(),
            job.description.clone(),
            job.skills.join(", "),
            requirements.join(", "),
        ];
        prepare_for_embedding(&parts.join("\n"))
    }

    /// Embeds one text under the configured time budget.
    pub async fn embed_one(&self, text: String) -> Result<Vec<f32>, EmbeddingError> {
        let budget = self.settings.embed_timeout;
        let batch = [text];
        let mut vectors = tokio::time::timeout(budget, self.embedder.embed(&batch))
            .await
            .map_err(|_| EmbeddingError::Timeout(budget))??;
        check_batch(1, &vectors)?;
        vectors.pop().ok_or(EmbeddingError::EmptyResponse)
    }

    async fn score(
        &self,
        resume_text: &str,
        jobs: &[JobPosting],
        mode: Mode,
    ) -> Result<ScoredSet, AppError> {
        let resume = ResumeDocument::new(resume_text, self.extractor.as_ref());
        if resume.is_empty() {
            return Err(AppError::Validation("resume_text cannot be empty".to_string()));
        }

        let resume_embedding = self
            .embed_one(prepare_for_embedding(&resume.normalized))
            .await?;

        // Completion order is arbitrary; each vector lands in its job's slot.
        let mut slots: Vec<Option<Result<Vec<f32>, EmbeddingError>>> =
            (0..jobs.len()).map(|_| None).collect();
        let texts: Vec<String> = jobs.iter().map(|j| self.job_embedding_text(j)).collect();

        let mut pending = stream::iter(texts.into_iter().enumerate())
            .map(|(idx, text)| async move {
                if text.is_empty() {
                    return (idx, Err(EmbeddingError::EmptyResponse));
                }
                (idx, self.embed_one(text).await)
            })
            .buffer_unordered(self.settings.concurrency.max(1));

        while let Some((idx, outcome)) = pending.next().await {
            slots[idx] = Some(outcome);
        }

        let mut results = Vec::with_capacity(jobs.len());
        let mut skipped = Vec::new();

        for (index, (job, slot)) in jobs.iter().zip(slots).enumerate() {
            let job_embedding = match slot {
                Some(Ok(v)) => v,
                Some(Err(e)) => {
                    warn!("Skipping job {} ({}): {}", index, job.id, e);
                    skipped.push(SkippedJob {
                        index,
                        job_id: job.id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
                None => {
                    skipped.push(SkippedJob {
                        index,
                        job_id: job.id.clone(),
                        reason: "embedding was never produced".to_string(),
                    });
                    continue;
                }
            };

            let semantic_score = similarity(&resume_embedding, &job_embedding);
            let overlap = keyword_overlap(&resume.keywords, &job.description);

            let (matching_keywords, missing_skills) = match mode {
                Mode::Rank => (Vec::new(), Vec::new()),
                Mode::Match => (
                    overlap.matching_keywords(),
                    find_skill_gap(&job.skills, &resume.normalized),
                ),
            };

            results.push(MatchResult {
                job: job.clone(),
                semantic_score,
                keyword_score: overlap.score,
                quality: MatchQuality::from_score(semantic_score),
                matching_keywords,
                missing_skills,
            });
        }

        Ok(ScoredSet { results, skipped })
    }
}

pub fn validate_threshold(threshold: f64) -> Result<(), AppError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AppError::Validation(format!(
            "match_threshold must be between 0 and 1, got {threshold}"
        )));
    }
    Ok(())
}

/// Descending by semantic score; `sort_by` is stable so ties keep input order.
fn sort_by_semantic(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.semantic_score.total_cmp(&a.semantic_score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{engine_with, fake_engine, FakeEmbedder};

    const RESUME: &str = "Senior Rust backend engineer. 5 years building distributed systems \
        with Rust, Kafka and PostgreSQL on AWS. Python and Docker experience.";

    fn job(id: &str, title: &str, description: &str, skills: &[&str]) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: title.to_string(),
            company: format!("{id} Inc"),
            description: description.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample_jobs() -> Vec<JobPosting> {
        vec![
            job("chef", "Pastry Chef", "Bake croissants and bread every morning", &["Baking"]),
            job(
                "rust",
                "Rust Backend Engineer",
                "Build distributed systems in Rust with Kafka and PostgreSQL on AWS",
                &["Rust", "Kafka", "Kubernetes"],
            ),
            job(
                "py",
                "Python Developer",
                "Python services running in Docker",
                &["Python", "Docker"],
            ),
        ]
    }

    #[tokio::test]
    async fn test_rank_sorted_and_limited() {
        let engine = fake_engine();
        let outcome = engine.rank(RESUME, &sample_jobs(), 2).await.unwrap();
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].job.id, "rust");
        assert!(outcome.results[0].semantic_score >= outcome.results[1].semantic_score);
        assert!(outcome.partial.is_none());
    }

    #[tokio::test]
    async fn test_rank_does_not_fill_match_fields() {
        let engine = fake_engine();
        let outcome = engine.rank(RESUME, &sample_jobs(), 10).await.unwrap();
        assert_eq!(outcome.results.len(), 3);
        for r in &outcome.results {
            assert!(r.matching_keywords.is_empty());
            assert!(r.missing_skills.is_empty());
            assert!((0.0..=1.0).contains(&r.semantic_score));
            assert!((0.0..=1.0).contains(&r.keyword_score));
            assert_eq!(r.quality, MatchQuality::from_score(r.semantic_score));
        }
    }

    #[tokio::test]
    async fn test_rank_ties_keep_input_order() {
        let engine = fake_engine();
        let a = job("a", "Rust Engineer", "Rust services", &[]);
        let mut b = a.clone();
        b.id = "b".to_string();
        let mut c = a.clone();
        c.id = "c".to_string();
        let outcome = engine.rank(RESUME, &[a, b, c], 10).await.unwrap();
        let ids: Vec<_> = outcome.results.iter().map(|r| r.job.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_rank_zero_limit_rejected() {
        let err = fake_engine().rank(RESUME, &sample_jobs(), 0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_match_filters_by_threshold() {
        let engine = fake_engine();
        let all = engine.match_jobs(RESUME, &sample_jobs(), Some(0.0)).await.unwrap();
        assert_eq!(all.results.len(), 3);
        let none = engine.match_jobs(RESUME, &sample_jobs(), Some(1.0)).await.unwrap();
        assert!(none.results.is_empty());
        assert_eq!(none.summary.total_matches, 0);
    }

    #[tokio::test]
    async fn test_match_missing_skills_and_keywords() {
        let engine = fake_engine();
        let resume = "5 years Python and AWS experience, AWS Certified Solutions Architect";
        let jobs = vec![job(
            "cloud",
            "Cloud Engineer",
            "Python automation on AWS with Kubernetes",
            &["Python", "AWS", "Kubernetes"],
        )];
        let report = engine.match_jobs(resume, &jobs, Some(0.0)).await.unwrap();
        let result = &report.results[0];
        assert_eq!(result.missing_skills, vec!["Kubernetes"]);
        assert_eq!(result.matching_keywords, vec!["python", "aws"]);
        // job vocabulary: python, automation, aws, kubernetes
        assert!((result.keyword_score - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_match_invalid_threshold() {
        let embedder = Arc::new(FakeEmbedder::default());
        let engine = engine_with(embedder.clone());
        let err = engine.match_jobs(RESUME, &sample_jobs(), Some(1.5)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_resume_rejected_before_any_call() {
        let embedder = Arc::new(FakeEmbedder::default());
        let engine = engine_with(embedder.clone());
        let err = engine.rank("   \n ", &sample_jobs(), 5).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_resume_embedding_failure_is_fatal() {
        let engine = engine_with(Arc::new(FakeEmbedder::failing_on("Senior Rust backend")));
        let err = engine.rank(RESUME, &sample_jobs(), 5).await.unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_embedding_timeout_is_fatal() {
        let embedder = Arc::new(FakeEmbedder::stalling_on(
            "Senior Rust backend",
            Duration::from_secs(120),
        ));
        let engine = engine_with(embedder.clone());
        let err = engine.match_jobs(RESUME, &sample_jobs(), Some(0.0)).await.unwrap_err();
        assert!(matches!(err, AppError::Provider(EmbeddingError::Timeout(_))));
        // No job is embedded once the resume has failed.
        assert_eq!(embedder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_job_embedding_failure_is_skipped() {
        let engine = engine_with(Arc::new(FakeEmbedder::failing_on("croissants")));
        let outcome = engine.rank(RESUME, &sample_jobs(), 10).await.unwrap();
        assert_eq!(outcome.results.len(), 2);
        let partial = outcome.partial.unwrap();
        assert_eq!(partial.skipped_count, 1);
        assert_eq!(partial.skipped[0].index, 0);
        assert_eq!(partial.skipped[0].job_id, "chef");
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_embedding_timeout_is_skipped() {
        let engine = engine_with(Arc::new(FakeEmbedder::stalling_on(
            "croissants",
            Duration::from_secs(120),
        )));
        let report = engine.match_jobs(RESUME, &sample_jobs(), Some(0.0)).await.unwrap();
        assert_eq!(report.results.len(), 2);
        let partial = report.partial.unwrap();
        assert_eq!(partial.skipped[0].job_id, "chef");
        assert!(partial.skipped[0].reason.contains("exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_completion_keeps_attribution() {
        let embedder = Arc::new(FakeEmbedder {
            jitter: true,
            ..Default::default()
        });
        let engine = engine_with(embedder);
        let jobs = sample_jobs();
        let outcome = engine.rank(RESUME, &jobs, 10).await.unwrap();

        let resume_vec = crate::test_support::bag_of_words(&prepare_for_embedding(RESUME));
        for r in &outcome.results {
            let expected = similarity(
                &resume_vec,
                &crate::test_support::bag_of_words(&engine.job_embedding_text(&r.job)),
            );
            assert!((r.semantic_score - expected).abs() < 1e-12, "{}", r.job.id);
        }
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let outcome = fake_engine().rank(RESUME, &[], 5).await.unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.partial.is_none());
    }
}
