//! Resume analysis: ATS breakdown, extracted profile, work history and
//! career level, keywords, strengths, suggestions and an optional skill gap
//! against a job description.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::errors::AppError;
use crate::matching::keywords::{top_keywords, tokenize};
use crate::models::resume::{CareerLevel, EducationEntry, ExperienceEntry, SkillRecord};
use crate::resume::ats::{ats_report, AtsReport};
use crate::skills::extractor::count_mentions;
use crate::skills::jd_parser::derive_requirements;
use crate::skills::{find_skill_gap, SkillExtractor};

const MAX_KEYWORDS: usize = 20;
const KEYWORD_MIN_LEN: usize = 4;
const MAX_SKILL_GAPS: usize = 10;
/// Credited per detected role when the resume states no total.
const YEARS_PER_ROLE: u32 = 2;

const LEADERSHIP_WORDS: &[&str] = &[
    "led", "managed", "directed", "supervised", "mentored", "coordinated",
];
const ACTION_VERBS: &[&str] = &[
    "achieved", "improved", "developed", "created", "led", "managed", "implemented",
];
const SUMMARY_MARKERS: &[&str] = &["summary", "profile", "objective"];
const ADVANCED_DEGREES: &[&str] = &["master", "masters", "phd", "mba"];
const SENIOR_TITLE_WORDS: &[&str] = &[
    "senior", "sr", "lead", "principal", "staff", "manager", "director", "vp", "chief", "head",
];

static ACHIEVEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+%|\$\d+|(?:increased|reduced|improved)\D{0,60}\d+")
        .expect("achievement pattern is valid")
});

static STATED_YEARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\+?\s+years?\s+(?:of\s+)?(?:professional\s+|industry\s+|work\s+)?experience\b",
    )
    .expect("stated years pattern is valid")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email pattern is valid")
});

#[derive(Debug, Clone, Serialize)]
pub struct ResumeAnalysis {
    pub ats_score: f64,
    pub ats: AtsReport,
    pub skills: Vec<SkillRecord>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub total_experience_years: u32,
    pub career_level: CareerLevel,
    pub keywords: Vec<String>,
    pub strengths: Vec<String>,
    pub suggestions: Vec<String>,
    /// Present only when a job description was supplied.
    pub skill_gaps: Option<Vec<String>>,
    pub word_count: usize,
}

pub fn analyze(
    resume_text: &str,
    job_description: Option<&str>,
    extractor: &dyn SkillExtractor,
) -> Result<ResumeAnalysis, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }

    let ats = ats_report(resume_text, extractor);
    let profile = extractor.extract_profile(resume_text);

    let skill_gaps = job_description
        .filter(|jd| !jd.trim().is_empty())
        .map(|jd| {
            let requirements = derive_requirements(jd, extractor);
            let mut gaps = find_skill_gap(&requirements, resume_text);
            gaps.truncate(MAX_SKILL_GAPS);
            gaps
        });

    let total_experience_years = total_experience_years(resume_text, &profile.experience);

    Ok(ResumeAnalysis {
        ats_score: ats.score,
        ats,
        career_level: career_level(total_experience_years, &profile.experience),
        total_experience_years,
        strengths: strengths(resume_text, &profile.skills, &profile.experience),
        suggestions: suggestions(resume_text, &profile.skills),
        keywords: top_keywords(resume_text, KEYWORD_MIN_LEN, MAX_KEYWORDS),
        skills: profile.skills,
        education: profile.education,
        certifications: profile.certifications,
        experience: profile.experience,
        skill_gaps,
        word_count: resume_text.split_whitespace().count(),
    })
}

fn has_any_word(words: &HashSet<String>, candidates: &[&str]) -> bool {
    candidates.iter().any(|c| words.contains(*c))
}

/// The largest "N years of experience" the resume states, otherwise a fixed
/// credit per detected role.
pub fn total_experience_years(resume_text: &str, experience: &[ExperienceEntry]) -> u32 {
    STATED_YEARS_RE
        .captures_iter(resume_text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .unwrap_or(YEARS_PER_ROLE * experience.len() as u32)
}

/// A senior-sounding title promotes straight to Senior once there is any
/// experience at all.
pub fn career_level(total_years: u32, experience: &[ExperienceEntry]) -> CareerLevel {
    if total_years == 0 {
        return CareerLevel::Entry;
    }

    let senior_title = experience.iter().any(|role| {
        let title = role.job_title.to_lowercase();
        SENIOR_TITLE_WORDS.iter().any(|w| count_mentions(&title, w) > 0)
    });

    if total_years >= 10 || senior_title {
        CareerLevel::Senior
    } else if total_years >= 5 {
        CareerLevel::Mid
    } else if total_years >= 2 {
        CareerLevel::Junior
    } else {
        CareerLevel::Entry
    }
}

pub fn strengths(
    resume_text: &str,
    skills: &[SkillRecord],
    experience: &[ExperienceEntry],
) -> Vec<String> {
    let words: HashSet<String> = tokenize(resume_text).collect();
    let mut out = Vec::new();

    let mut categories = Vec::new();
    for skill in skills {
        if !categories.contains(&skill.category) {
            categories.push(skill.category);
        }
    }
    if categories.len() >= 4 {
        let labels: Vec<&str> = categories.iter().map(|c| c.label()).collect();
        out.push(format!("Diverse technical skill set spanning {}", labels.join(", ")));
    }
    if experience.len() >= 3 {
        out.push("Extensive professional experience across multiple roles".to_string());
    }
    if has_any_word(&words, LEADERSHIP_WORDS) {
        out.push("Demonstrated leadership and management capabilities".to_string());
    }
    if ACHIEVEMENT_RE.is_match(resume_text) {
        out.push("Quantified achievements showing measurable impact".to_string());
    }
    if has_any_word(&words, ADVANCED_DEGREES) {
        out.push("Advanced educational qualifications".to_string());
    }

    out
}

pub fn suggestions(resume_text: &str, skills: &[SkillRecord]) -> Vec<String> {
    let words: HashSet<String> = tokenize(resume_text).collect();
    let word_count = resume_text.split_whitespace().count();
    let mut out = Vec::new();

    if !EMAIL_RE.is_match(resume_text) {
        out.push("Add a professional email address".to_string());
    }
    if !ACHIEVEMENT_RE.is_match(resume_text) {
        out.push("Add quantified achievements with specific numbers and percentages".to_string());
    }
    if !has_any_word(&words, ACTION_VERBS) {
        out.push("Use more action verbs to describe your accomplishments".to_string());
    }
    if word_count < 300 {
        out.push(
            "Expand your resume with more detailed descriptions of your experience".to_string(),
        );
    } else if word_count > 800 {
        out.push(
            "Consider condensing your resume to focus on most relevant experiences".to_string(),
        );
    }
    if !has_any_word(&words, SUMMARY_MARKERS) {
        out.push("Add a professional summary at the beginning of your resume".to_string());
    }
    if skills.len() < 8 {
        out.push("Consider adding more relevant technical and soft skills".to_string());
    }

    out
}
