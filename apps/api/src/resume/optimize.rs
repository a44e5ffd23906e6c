//! Before/after optimization of a resume for a specific job description.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::matching::keywords::top_keywords;
use crate::resume::ats::{improvement_percentage, score_ats};
use crate::skills::jd_parser::derive_requirements;
use crate::skills::{find_skill_gap, SkillExtractor};

const JOB_KEYWORD_LIMIT: usize = 30;
const KEYWORD_MIN_LEN: usize = 4;
const MAX_ADDED_KEYWORDS: usize = 15;
const MAX_PHRASE_IMPROVEMENTS: usize = 5;
const LONG_LINE_CHARS: usize = 100;

/// Weak phrase → stronger replacement.
const PHRASE_IMPROVEMENTS: &[(&str, &str)] = &[
    ("responsible for", "managed"),
    ("worked on", "developed"),
    ("helped with", "contributed to"),
    ("participated in", "collaborated on"),
    ("familiar with", "experienced in"),
    ("knowledge of", "proficient in"),
];

const EXPERIENCE_VERBS: &[&str] = &[
    "achieved", "improved", "developed", "created", "led", "managed", "implemented", "optimized",
];

const SECTIONS: &[&str] = &["experience", "education", "skills"];

static BULLET_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*([•◦*-])").expect("bullet line pattern is valid"));

static QUANTIFIED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+%|\$\d+|\d+\s+(?:percent|million|thousand)")
        .expect("quantified pattern is valid")
});

static METRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+%|\$\d+").expect("metric pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseImprovement {
    pub original: String,
    pub improved: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionTip {
    pub section: String,
    pub tip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationReport {
    pub optimized_text: String,
    pub improved_phrases: Vec<PhraseImprovement>,
    pub section_tips: Vec<SectionTip>,
    /// Job keywords absent from the resume.
    pub added_keywords: Vec<String>,
    pub missing_skills: Vec<String>,
    pub formatting_suggestions: Vec<String>,
    pub recommendations: Vec<String>,
    pub original_score: f64,
    pub optimized_score: f64,
    pub improvement_percentage: f64,
}

pub fn optimize(
    resume_text: &str,
    job_description: &str,
    extractor: &dyn SkillExtractor,
) -> Result<OptimizationReport, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }

    let resume_lower = resume_text.to_lowercase();
    let job_keywords = top_keywords(job_description, KEYWORD_MIN_LEN, JOB_KEYWORD_LIMIT);
    let requirements = derive_requirements(job_description, extractor);
    let missing_skills = find_skill_gap(&requirements, resume_text);

    let improved_phrases = phrase_improvements(&resume_lower);
    let optimized_text = apply_improvements(resume_text, &improved_phrases);

    let added_keywords: Vec<String> = job_keywords
        .iter()
        .filter(|k| !resume_lower.contains(k.as_str()))
        .take(MAX_ADDED_KEYWORDS)
        .cloned()
        .collect();

    let original_score = score_ats(resume_text, extractor);
    let optimized_score = score_ats(&optimized_text, extractor);
    let improvement = improvement_percentage(original_score, optimized_score);

    info!(
        "Optimized resume: {} phrase fixes, ATS {:.1} -> {:.1}",
        improved_phrases.len(),
        original_score,
        optimized_score
    );

    Ok(OptimizationReport {
        section_tips: section_tips(resume_text, &job_keywords, &missing_skills),
        recommendations: recommendations(resume_text, &job_keywords, &missing_skills),
        formatting_suggestions: formatting_suggestions(resume_text),
        optimized_text,
        improved_phrases,
        added_keywords,
        missing_skills,
        original_score,
        optimized_score,
        improvement_percentage: improvement,
    })
}

pub fn phrase_improvements(resume_lower: &str) -> Vec<PhraseImprovement> {
    PHRASE_IMPROVEMENTS
        .iter()
        .filter(|(weak, _)| resume_lower.contains(weak))
        .take(MAX_PHRASE_IMPROVEMENTS)
        .map(|(weak, strong)| PhraseImprovement {
            original: weak.to_string(),
            improved: strong.to_string(),
            reason: "More action-oriented and impactful".to_string(),
        })
        .collect()
}

/// Case-insensitive replacement of every suggested phrase.
pub fn apply_improvements(text: &str, improvements: &[PhraseImprovement]) -> String {
    let mut out = text.to_string();
    for improvement in improvements {
        let Ok(re) = RegexBuilder::new(&regex::escape(&improvement.original))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };
        out = re
            .replace_all(&out, NoExpand(&improvement.improved))
            .into_owned();
    }
    out
}

fn section_tips(
    resume_text: &str,
    job_keywords: &[String],
    missing_skills: &[String],
) -> Vec<SectionTip> {
    let lower = resume_text.to_lowercase();
    let resume_keywords: HashSet<String> = top_keywords(resume_text, KEYWORD_MIN_LEN, usize::MAX)
        .into_iter()
        .collect();
    let mut tips = Vec::new();

    if lower.contains("summary") || lower.contains("profile") {
        let top: Vec<&str> = job_keywords.iter().take(5).map(String::as_str).collect();
        tips.push(SectionTip {
            section: "professional_summary".to_string(),
            tip: format!("Consider incorporating these keywords: {}", top.join(", ")),
        });
    }

    if lower.contains("skills") && !missing_skills.is_empty() {
        let top: Vec<&str> = missing_skills.iter().take(8).map(String::as_str).collect();
        tips.push(SectionTip {
            section: "skills".to_string(),
            tip: format!("Consider adding these skills if applicable: {}", top.join(", ")),
        });
    }

    let mut experience = Vec::new();
    if !QUANTIFIED_RE.is_match(resume_text) {
        experience.push("Add quantified achievements (e.g., 'Improved performance by 25%')");
    }
    if EXPERIENCE_VERBS.iter().filter(|v| lower.contains(*v)).count() < 3 {
        experience.push("Use more diverse action verbs to start bullet points");
    }
    if job_keywords.iter().filter(|k| resume_keywords.contains(*k)).count() < 5 {
        experience.push("Highlight experiences more relevant to the target role");
    }
    if !experience.is_empty() {
        tips.push(SectionTip {
            section: "experience".to_string(),
            tip: experience.join("; "),
        });
    }

    tips
}

pub fn formatting_suggestions(resume_text: &str) -> Vec<String> {
    let mut out = Vec::new();

    let bullet_styles: HashSet<&str> = BULLET_LINE_RE
        .captures_iter(resume_text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if bullet_styles.len() > 1 {
        out.push("Use consistent bullet point style throughout".to_string());
    }

    let lower = resume_text.to_lowercase();
    let missing: Vec<&str> = SECTIONS.iter().copied().filter(|s| !lower.contains(s)).collect();
    if !missing.is_empty() {
        out.push(format!("Consider adding these sections: {}", missing.join(", ")));
    }

    if resume_text.matches('*').count() > 10 || resume_text.matches('_').count() > 10 {
        out.push("Avoid excessive bold/italic formatting for better ATS compatibility".to_string());
    }

    let lines: Vec<&str> = resume_text.lines().collect();
    let long_lines = lines.iter().filter(|l| l.chars().count() > LONG_LINE_CHARS).count();
    if !lines.is_empty() && long_lines as f64 > lines.len() as f64 * 0.3 {
        out.push("Consider breaking up long lines for better readability".to_string());
    }

    out
}

fn recommendations(
    resume_text: &str,
    job_keywords: &[String],
    missing_skills: &[String],
) -> Vec<String> {
    let resume_keywords: HashSet<String> = top_keywords(resume_text, KEYWORD_MIN_LEN, usize::MAX)
        .into_iter()
        .collect();
    let mut out = Vec::new();

    if !missing_skills.is_empty() {
        let top: Vec<&str> = missing_skills.iter().take(5).map(String::as_str).collect();
        out.push(format!("Add these relevant skills if you have them: {}", top.join(", ")));
    }

    let missing_keywords: Vec<&str> = job_keywords
        .iter()
        .take(10)
        .filter(|k| !resume_keywords.contains(*k))
        .take(5)
        .map(String::as_str)
        .collect();
    if !missing_keywords.is_empty() {
        out.push(format!("Incorporate these keywords: {}", missing_keywords.join(", ")));
    }

    if !METRIC_RE.is_match(resume_text) {
        out.push("Add quantified achievements with specific metrics".to_string());
    }
    if !resume_text.to_lowercase().contains("years") {
        out.push("Highlight years of experience more clearly".to_string());
    }

    out
}
