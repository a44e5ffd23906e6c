use std::collections::HashSet;

use tracing::debug;

use crate::models::job::JobPosting;

/// Case-insensitive `(title, company)` identity of a posting.
pub fn dedup_key(job: &JobPosting) -> (String, String) {
    (
        job.title.trim().to_lowercase(),
        job.company.trim().to_lowercase(),
    )
}

/// Collapses duplicate postings. The first occurrence in traversal order
/// (primary source before fallback) is kept; later duplicates are dropped.
pub fn dedup_jobs(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::new();
    let before = jobs.len();
    let unique: Vec<JobPosting> = jobs
        .into_iter()
        .filter(|job| seen.insert(dedup_key(job)))
        .collect();
    if unique.len() < before {
        debug!(
            "Dropped {} duplicate postings ({} remain)",
            before - unique.len(),
            unique.len()
        );
    }
    unique
}
