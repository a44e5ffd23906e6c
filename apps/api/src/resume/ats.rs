//! ATS Scorer: resume-only heuristic compatibility score on a 0–100 scale.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::skills::SkillExtractor;

static METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+%|\$\d+|\d+\s+years?").expect("metric pattern is valid")
});

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[•◦-]").expect("bullet pattern is valid"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email pattern is valid")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{3}[-.]?\d{3}[-.]?\d{4}").expect("phone pattern is valid"));

const MIN_LINES: usize = 10;
const MIN_SKILLS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtsCheck {
    ExperienceSection,
    EducationSection,
    SkillsSection,
    QuantifiedMetrics,
    MultiLineBody,
    BulletMarkers,
    Email,
    Phone,
    SkillCount,
}

/// Checklist with the points each check is worth.
const CHECKS: &[(AtsCheck, u32)] = &[
    (AtsCheck::ExperienceSection, 10),
    (AtsCheck::EducationSection, 10),
    (AtsCheck::SkillsSection, 10),
    (AtsCheck::QuantifiedMetrics, 15),
    (AtsCheck::MultiLineBody, 10),
    (AtsCheck::BulletMarkers, 10),
    (AtsCheck::Email, 15),
    (AtsCheck::Phone, 10),
    (AtsCheck::SkillCount, 20),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsCheckResult {
    pub check: AtsCheck,
    pub points: u32,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsReport {
    /// points earned / points possible × 100
    pub score: f64,
    pub points_earned: u32,
    pub points_possible: u32,
    pub checks: Vec<AtsCheckResult>,
}

pub fn ats_report(resume_text: &str, extractor: &dyn SkillExtractor) -> AtsReport {
    let text = resume_text.trim();
    let lower = text.to_lowercase();

    let passes = |check: AtsCheck| match check {
        AtsCheck::ExperienceSection => {
            lower.contains("experience") || lower.contains("work history")
        }
        AtsCheck::EducationSection => lower.contains("education"),
        AtsCheck::SkillsSection => lower.contains("skills"),
        AtsCheck::QuantifiedMetrics => METRIC_RE.is_match(text),
        AtsCheck::MultiLineBody => text.lines().count() > MIN_LINES,
        AtsCheck::BulletMarkers => BULLET_RE.is_match(text),
        AtsCheck::Email => EMAIL_RE.is_match(text),
        AtsCheck::Phone => PHONE_RE.is_match(text),
        AtsCheck::SkillCount => extractor.extract_skills(text).len() > MIN_SKILLS,
    };

    let checks: Vec<AtsCheckResult> = CHECKS
        .iter()
        .map(|&(check, points)| AtsCheckResult {
            check,
            points,
            passed: !text.is_empty() && passes(check),
        })
        .collect();

    let points_possible: u32 = checks.iter().map(|c| c.points).sum();
    let points_earned: u32 = checks.iter().filter(|c| c.passed).map(|c| c.points).sum();
    let score = if points_possible == 0 {
        0.0
    } else {
        points_earned as f64 / points_possible as f64 * 100.0
    };

    AtsReport {
        score,
        points_earned,
        points_possible,
        checks,
    }
}

/// Score only.
pub fn score_ats(resume_text: &str, extractor: &dyn SkillExtractor) -> f64 {
    ats_report(resume_text, extractor).score
}

/// Relative change from `original` to `optimized`, in percent.
///
/// With `original == 0` there is no baseline: any positive optimized score
/// counts as 100% and zero stays 0%. Never NaN or infinite.
pub fn improvement_percentage(original: f64, optimized: f64) -> f64 {
    if !original.is_finite() || !optimized.is_finite() {
        return 0.0;
    }
    if original <= 0.0 {
        return if optimized > 0.0 { 100.0 } else { 0.0 };
    }
    (optimized - original) / original * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::extractor::TaxonomyExtractor;

    const STRONG_RESUME: &str = "Jane Doe\n\
        jane.doe@example.com | 555-123-4567\n\
        \n\
        EXPERIENCE\n\
        - Led migration of 40 services to Kubernetes, cutting costs by 30%\n\
        - Built Python and Go APIs on AWS with PostgreSQL and Redis\n\
        - Ran Docker and Terraform pipelines in Jenkins\n\
        \n\
        EDUCATION\n\
        B.S. in Computer Science\n\
        \n\
        SKILLS\n\
        Python, Go, Kubernetes, Docker, AWS, Terraform, PostgreSQL";

    fn score(text: &str) -> f64 {
        score_ats(text, &TaxonomyExtractor::default())
    }

    #[test]
    fn test_strong_resume_scores_full_marks() {
        let report = ats_report(STRONG_RESUME, &TaxonomyExtractor::default());
        assert_eq!(report.points_possible, 110);
        assert!(report.checks.iter().all(|c| c.passed), "{:?}", report.checks);
        assert_eq!(report.score, 100.0);
    }

    #[test]
    fn test_empty_resume_scores_zero() {
        assert_eq!(score(""), 0.0);
        assert_eq!(score("   \n  "), 0.0);
    }

    #[test]
    fn test_partial_credit() {
        // education (10) + skills (10) + email (15) = 35 of 110
        let s = score("Education and skills. me@example.org");
        assert!((s - 35.0 / 110.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_invariant_to_outer_whitespace() {
        let padded = format!("\n\n   {STRONG_RESUME}   \n\n\n\n\n\n\n\n\n\n");
        assert_eq!(score(STRONG_RESUME), score(&padded));
        let short = "EXPERIENCE\nPython";
        assert_eq!(score(short), score(&format!("{}\n\n\n\n\n\n\n\n\n\n", short)));
    }

    #[test]
    fn test_invariant_to_header_case() {
        let upper = "EXPERIENCE\nEDUCATION\nSKILLS";
        let lower = "experience\neducation\nskills";
        assert_eq!(score(upper), score(lower));
    }

    #[test]
    fn test_work_history_counts_as_experience() {
        let report = ats_report("Work History", &TaxonomyExtractor::default());
        let experience = report
            .checks
            .iter()
            .find(|c| c.check == AtsCheck::ExperienceSection)
            .unwrap();
        assert!(experience.passed);
    }

    #[test]
    fn test_improvement_percentage() {
        assert_eq!(improvement_percentage(50.0, 75.0), 50.0);
        assert_eq!(improvement_percentage(80.0, 60.0), -25.0);
    }

    #[test]
    fn test_improvement_percentage_zero_original() {
        assert_eq!(improvement_percentage(0.0, 40.0), 100.0);
        assert_eq!(improvement_percentage(0.0, 0.0), 0.0);
        let v = improvement_percentage(0.0, 0.0);
        assert!(v.is_finite());
    }

    #[test]
    fn test_improvement_percentage_non_finite_inputs() {
        assert_eq!(improvement_percentage(f64::NAN, 10.0), 0.0);
        assert_eq!(improvement_percentage(10.0, f64::INFINITY), 0.0);
    }
}
