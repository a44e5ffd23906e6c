//! Ranking & Aggregation: summaries, recommendations and search insights.
//!
//! Everything here is a pure function of its input. Frequency ties are broken
//! by first appearance, never by hash order, so identical inputs always
//! produce identical output.

use std::collections::HashMap;

use crate::models::job::JobPosting;
use crate::models::matching::{
    FrequencyEntry, MatchQuality, MatchResult, SalaryRange, SalaryStats, SearchInsights,
    SearchSummary, TierDistribution,
};

const TOP_COMPANIES: usize = 5;
const TOP_SKILLS: usize = 10;
const TOP_MISSING_SKILLS: usize = 3;
const REMOTE_HINT_RATIO: f64 = 0.3;

/// Counts case-insensitive occurrences. Display name is the first spelling seen.
fn rank_frequencies<'a>(items: impl Iterator<Item = &'a str>, limit: usize) -> Vec<FrequencyEntry> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();

    for item in items.map(str::trim).filter(|i| !i.is_empty()) {
        match index.get(&item.to_lowercase()) {
            Some(&pos) => entries[pos].count += 1,
            None => {
                index.insert(item.to_lowercase(), entries.len());
                entries.push(FrequencyEntry {
                    name: item.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable: equal counts keep first-seen order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}

fn salary_bounds<'a>(jobs: impl Iterator<Item = &'a JobPosting> + Clone) -> (u64, u64) {
    let min = jobs.clone().filter_map(|j| j.salary_min).min().unwrap_or(0);
    let max = jobs.filter_map(|j| j.salary_max).max().unwrap_or(0);
    (min, max)
}

fn average_salary<'a>(jobs: impl Iterator<Item = &'a JobPosting>) -> Option<f64> {
    let midpoints: Vec<f64> = jobs.filter_map(JobPosting::salary_midpoint).collect();
    if midpoints.is_empty() {
        None
    } else {
        Some(midpoints.iter().sum::<f64>() / midpoints.len() as f64)
    }
}

fn remote_ratio<'a>(jobs: impl ExactSizeIterator<Item = &'a JobPosting>) -> f64 {
    let total = jobs.len();
    if total == 0 {
        return 0.0;
    }
    jobs.filter(|j| j.is_remote()).count() as f64 / total as f64
}

/// Aggregate view of the matched set.
pub fn match_summary(results: &[MatchResult]) -> SearchSummary {
    let mut tier_distribution = TierDistribution::default();
    for result in results {
        tier_distribution.record(result.quality);
    }

    let average_score = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.semantic_score).sum::<f64>() / results.len() as f64
    };

    let (min, max) = salary_bounds(results.iter().map(|r| &r.job));

    SearchSummary {
        total_matches: results.len(),
        average_score,
        tier_distribution,
        top_companies: rank_frequencies(
            results.iter().map(|r| r.job.company.as_str()),
            TOP_COMPANIES,
        ),
        salary_range: SalaryRange { min, max },
        skill_frequency: rank_frequencies(
            results.iter().flat_map(|r| r.job.skills.iter().map(String::as_str)),
            usize::MAX,
        ),
    }
}

/// Rule-based advice over a match report. Rules fire in a fixed order.
pub fn recommendations(results: &[MatchResult]) -> Vec<String> {
    let mut recs = Vec::new();

    if results.is_empty() {
        recs.push(
            "No jobs met the match threshold; try lowering the threshold or broadening your search"
                .to_string(),
        );
        return recs;
    }

    let missing = rank_frequencies(
        results
            .iter()
            .flat_map(|r| r.missing_skills.iter().map(String::as_str)),
        TOP_MISSING_SKILLS,
    );
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|e| e.name.as_str()).collect();
        recs.push(format!(
            "Consider developing these in-demand skills: {}",
            names.join(", ")
        ));
    }

    let excellent = results
        .iter()
        .filter(|r| r.quality == MatchQuality::Excellent)
        .count();
    if excellent > 0 {
        recs.push(format!(
            "You have {excellent} excellent match(es); prioritize applying to these roles first"
        ));
    }

    let remote = remote_ratio(results.iter().map(|r| &r.job));
    if remote > REMOTE_HINT_RATIO {
        recs.push(format!(
            "{:.0}% of matching roles offer remote work; consider including remote positions in your search",
            remote * 100.0
        ));
    }

    if let Some(avg) = average_salary(results.iter().map(|r| &r.job)) {
        recs.push(format!(
            "Average advertised salary across your matches is ${avg:.0}; use it as a reference point in negotiations"
        ));
    }

    recs
}

/// Pre-match view over every fetched posting.
pub fn search_insights(jobs: &[JobPosting]) -> SearchInsights {
    let companies = rank_frequencies(jobs.iter().map(|j| j.company.as_str()), usize::MAX);
    let unique_companies = companies.len();
    let (min, max) = salary_bounds(jobs.iter());

    SearchInsights {
        total_jobs: jobs.len(),
        unique_companies,
        top_hiring_companies: companies.into_iter().take(TOP_COMPANIES).collect(),
        remote_percentage: remote_ratio(jobs.iter()) * 100.0,
        top_skills: rank_frequencies(
            jobs.iter().flat_map(|j| j.skills.iter().map(String::as_str)),
            TOP_SKILLS,
        ),
        salary: SalaryStats {
            min,
            mean: average_salary(jobs.iter()).unwrap_or(0.0),
            max,
        },
    }
}
