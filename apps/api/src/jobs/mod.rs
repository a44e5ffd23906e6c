pub mod fixtures;
pub mod handlers;
pub mod jsearch;
pub mod normalize;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::dedup::dedup_jobs;
use crate::models::job::JobPosting;

use self::normalize::normalize_job;

#[derive(Debug, Clone)]
pub struct JobQuery {
    pub query: String,
    pub location: Option<String>,
    pub remote_only: bool,
    /// Max raw postings to collect across all sources.
    pub limit: usize,
}

/// A provider of raw (un-normalized) job postings.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &JobQuery) -> Result<Vec<Value>, AppError>;

    /// `Ok(None)` when the source does not know the id.
    async fn fetch(&self, id: &str) -> Result<Option<Value>, AppError>;
}

/// Ordered set of job sources: primary first, fallbacks after.
#[derive(Clone, Default)]
pub struct JobCatalog {
    sources: Vec<Arc<dyn JobSource>>,
}

impl JobCatalog {
    pub fn new(sources: Vec<Arc<dyn JobSource>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Collects up to `query.limit` raw postings in source order, then
    /// normalizes, deduplicates (first occurrence wins) and filters.
    pub async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, AppError> {
        let mut raw: Vec<Value> = Vec::new();

        for source in &self.sources {
            let remaining = query.limit.saturating_sub(raw.len());
            if remaining == 0 {
                break;
            }
            let page_query = JobQuery {
                limit: remaining,
                ..query.clone()
            };
            let page = source.search(&page_query).await?;
            info!("Source '{}' returned {} postings", source.name(), page.len());
            raw.extend(page.into_iter().take(remaining));
        }

        let jobs = dedup_jobs(raw.iter().map(normalize_job).collect());
        Ok(apply_filters(jobs, query))
    }

    /// First source that knows the id wins.
    pub async fn find(&self, id: &str) -> Result<JobPosting, AppError> {
        let mut last_error = None;

        for source in &self.sources {
            match source.fetch(id).await {
                Ok(Some(raw)) => return Ok(normalize_job(&raw)),
                Ok(None) => {}
                Err(e) => {
                    warn!("Source '{}' failed to fetch job {}: {}", source.name(), id, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::NotFound(format!("Job {id} not found"))))
    }
}

fn apply_filters(jobs: Vec<JobPosting>, query: &JobQuery) -> Vec<JobPosting> {
    let location = query
        .location
        .as_deref()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty());

    jobs.into_iter()
        .filter(|job| !query.remote_only || job.is_remote())
        .filter(|job| match &location {
            Some(wanted) => job
                .location
                .as_deref()
                .map_or(false, |l| l.to_lowercase().contains(wanted.as_str())),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::fixtures::SampleJobSource;
    use serde_json::json;

    struct StaticSource {
        name: &'static str,
        jobs: Vec<Value>,
    }

    #[async_trait]
    impl JobSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(&self, query: &JobQuery) -> Result<Vec<Value>, AppError> {
            Ok(self.jobs.iter().take(query.limit).cloned().collect())
        }

        async fn fetch(&self, id: &str) -> Result<Option<Value>, AppError> {
            Ok(self
                .jobs
                .iter()
                .find(|j| j.get("id").and_then(Value::as_str) == Some(id))
                .cloned())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl JobSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn search(&self, _query: &JobQuery) -> Result<Vec<Value>, AppError> {
            Err(AppError::Upstream("down".to_string()))
        }

        async fn fetch(&self, _id: &str) -> Result<Option<Value>, AppError> {
            Err(AppError::Upstream("down".to_string()))
        }
    }

    fn query(limit: usize) -> JobQuery {
        JobQuery {
            query: "engineer".to_string(),
            location: None,
            remote_only: false,
            limit,
        }
    }

    fn primary() -> Arc<dyn JobSource> {
        Arc::new(StaticSource {
            name: "primary",
            jobs: vec![
                json!({
                    "id": "p1",
                    "title": "DevOps Engineer",
                    "company": "Acme",
                    "location": "Remote, US",
                    "remote": true
                }),
                json!({
                    "id": "p2",
                    "title": "Data Engineer",
                    "company": "Globex",
                    "location": "Austin, TX"
                }),
            ],
        })
    }

    fn fallback() -> Arc<dyn JobSource> {
        Arc::new(StaticSource {
            name: "fallback",
            jobs: vec![
                json!({"id": "f1", "title": "devops engineer", "company": "ACME"}),
                json!({"id": "f2", "title": "SRE", "company": "Initech", "location": "Austin, TX"}),
            ],
        })
    }

    #[tokio::test]
    async fn test_primary_first_and_dedup() {
        let catalog = JobCatalog::new(vec![primary(), fallback()]);
        let jobs = catalog.search(&query(10)).await.unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "f2"]);
    }

    #[tokio::test]
    async fn test_limit_stops_traversal() {
        let catalog = JobCatalog::new(vec![primary(), fallback()]);
        let jobs = catalog.search(&query(2)).await.unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_location_and_remote_filters() {
        let catalog = JobCatalog::new(vec![primary(), fallback()]);
        let mut q = query(10);
        q.location = Some("austin".to_string());
        let ids: Vec<_> = catalog
            .search(&q)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(ids, vec!["p2", "f2"]);

        let mut q = query(10);
        q.remote_only = true;
        let jobs = catalog.search(&q).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "p1");
    }

    #[tokio::test]
    async fn test_find_across_sources() {
        let catalog = JobCatalog::new(vec![primary(), fallback()]);
        assert_eq!(catalog.find("f2").await.unwrap().company, "Initech");
        let err = catalog.find("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_skips_failing_source() {
        let sources: Vec<Arc<dyn JobSource>> =
            vec![Arc::new(BrokenSource), Arc::new(SampleJobSource)];
        let catalog = JobCatalog::new(sources);
        assert_eq!(catalog.find("job_3").await.unwrap().title, "DevOps Engineer");
    }

    #[tokio::test]
    async fn test_sample_source_through_catalog() {
        let catalog = JobCatalog::new(vec![Arc::new(SampleJobSource) as Arc<dyn JobSource>]);
        let jobs = catalog.search(&query(50)).await.unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].id, "job_1");
        assert_eq!(jobs[2].skills.len(), 6);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let catalog = JobCatalog::default();
        assert!(catalog.search(&query(10)).await.unwrap().is_empty());
        assert!(matches!(catalog.find("x").await, Err(AppError::NotFound(_))));
    }
}
