use serde::{Deserialize, Serialize};

use crate::models::job::JobPosting;

/// Discrete classification of a semantic match score.
///
/// Tiers are a function of `semantic_score` only; keyword overlap never
/// moves a job between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl MatchQuality {
    pub const EXCELLENT_MIN: f64 = 0.90;
    pub const GOOD_MIN: f64 = 0.75;
    pub const FAIR_MIN: f64 = 0.60;

    pub fn from_score(semantic_score: f64) -> Self {
        match semantic_score {
            s if s >= Self::EXCELLENT_MIN => MatchQuality::Excellent,
            s if s >= Self::GOOD_MIN => MatchQuality::Good,
            s if s >= Self::FAIR_MIN => MatchQuality::Fair,
            _ => MatchQuality::Poor,
        }
    }
}

/// Score card for one job against one resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub job: JobPosting,
    pub semantic_score: f64,
    pub keyword_score: f64,
    pub quality: MatchQuality,
    /// Match mode only: ≤10 shared meaningful tokens, job-description order.
    pub matching_keywords: Vec<String>,
    /// Match mode only: declared job skills absent from the resume text.
    pub missing_skills: Vec<String>,
}

/// A job dropped from scoring because its embedding could not be computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedJob {
    pub index: usize,
    pub job_id: String,
    pub reason: String,
}

/// Present on an outcome whenever one or more jobs were skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialFailure {
    pub skipped_count: usize,
    pub skipped: Vec<SkippedJob>,
}

impl PartialFailure {
    pub fn from_skipped(skipped: Vec<SkippedJob>) -> Option<Self> {
        if skipped.is_empty() {
            None
        } else {
            Some(Self {
                skipped_count: skipped.len(),
                skipped,
            })
        }
    }
}

/// Output of rank mode.
#[derive(Debug, Clone, Serialize)]
pub struct RankOutcome {
    pub results: Vec<MatchResult>,
    pub partial: Option<PartialFailure>,
}

/// Output of match mode.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub results: Vec<MatchResult>,
    pub summary: SearchSummary,
    pub recommendations: Vec<String>,
    pub partial: Option<PartialFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl TierDistribution {
    pub fn record(&mut self, quality: MatchQuality) {
        match quality {
            MatchQuality::Excellent => self.excellent += 1,
            MatchQuality::Good => self.good += 1,
            MatchQuality::Fair => self.fair += 1,
            MatchQuality::Poor => self.poor += 1,
        }
    }
}

/// A name with how often it occurred, in ranked order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub name: String,
    pub count: usize,
}

/// Salary bounds across a set of postings; 0 when no posting carries salary data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
}

/// Aggregate view of the matched set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSummary {
    pub total_matches: usize,
    pub average_score: f64,
    pub tier_distribution: TierDistribution,
    pub top_companies: Vec<FrequencyEntry>,
    pub salary_range: SalaryRange,
    pub skill_frequency: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryStats {
    pub min: u64,
    pub mean: f64,
    pub max: u64,
}

/// Pre-match view over every fetched posting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchInsights {
    pub total_jobs: usize,
    pub unique_companies: usize,
    pub top_hiring_companies: Vec<FrequencyEntry>,
    pub remote_percentage: f64,
    pub top_skills: Vec<FrequencyEntry>,
    pub salary: SalaryStats,
}
