//! Taxonomy-driven extractor: skills with proficiency and years, plus
//! education, certification and work-history lines.
//!
//! All of this is pattern matching and will misread plenty of real resumes.
//! It sits behind `SkillExtractor` so a stronger parser can replace it.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::resume::{
    EducationEntry, ExperienceEntry, Proficiency, ResumeProfile, SkillRecord,
};
use crate::skills::taxonomy::Taxonomy;
use crate::skills::SkillExtractor;

const MAX_EDUCATION: usize = 5;
const MAX_CERTIFICATIONS: usize = 10;
const MAX_ROLES: usize = 10;
const MAX_ACHIEVEMENTS: usize = 5;
const MAX_ROLE_SKILLS: usize = 8;

const BULLETS: &[char] = &['•', '◦', '-', '★', '*', '▪'];
const ACHIEVEMENT_WORDS: &[&str] = &[
    "achieved", "improved", "increased", "reduced", "led", "managed", "developed", "created",
];
const SECTION_HEADERS: &[&str] = &[
    "education", "skills", "technical skills", "certifications", "projects", "summary",
    "references", "languages", "awards",
];

static DEGREE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(bachelor(?:'s)?|master(?:'s)?|ph\.?d\.?|mba|b\.?sc?|m\.?sc?|b\.?a|m\.?a)\.?\s+(?:of|in)\s+([a-z][a-z &]*[a-z])",
    )
    .expect("degree pattern is valid")
});

static INSTITUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:[A-Z][\w.&']*\s+)*(?:University|College|Institute)(?:\s+of(?:\s+[A-Z][\w.&']*)+)?",
    )
    .expect("institution pattern is valid")
});

static CERT_AFTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:certified|certification|certificate)\s+(?:in\s+)?([a-z][a-z0-9 ()&+-]{2,60})",
    )
    .expect("certification pattern is valid")
});

static CERT_ACRONYM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z]{2,})\s+(?:Certified|Certification|Certificate)\b")
        .expect("acronym certification pattern is valid")
});

static CERT_VENDOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(aws|azure|google|oracle|microsoft|cisco|comptia|pmi|scrum|agile)\s+certified\s+([a-z][a-z0-9 ()&+-]{2,60})",
    )
    .expect("vendor certification pattern is valid")
});

static TITLE_AT_COMPANY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b((?:[A-Z][A-Za-z/.-]* ){0,4}(?:Engineer|Developer|Manager|Analyst|Specialist|Coordinator|Director|Lead|Architect|Consultant|Scientist))\b[ \t]*(?:at\b|@|\|)[ \t]*([A-Z][\w&.,]*(?: [A-Z][\w&.,]*)*)",
    )
    .expect("title-at-company pattern is valid")
});

static COMPANY_DASH_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[ \t]*([A-Z][\w&.,]*(?: [A-Z][\w&.,]*)*)[ \t]+[-–][ \t]+((?:[A-Z][A-Za-z/.-]* ){0,4}(?:Engineer|Developer|Manager|Analyst|Specialist|Coordinator|Director|Lead|Architect|Consultant|Scientist))\b",
    )
    .expect("company-dash-title pattern is valid")
});

/// Default extractor backed by a fixed `Taxonomy`.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyExtractor {
    taxonomy: Taxonomy,
}

impl TaxonomyExtractor {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }
}

impl SkillExtractor for TaxonomyExtractor {
    fn extract_skills(&self, text: &str) -> Vec<SkillRecord> {
        let lower = text.to_lowercase();
        let mut seen = HashSet::new();
        let mut skills = Vec::new();

        for (category, term) in self.taxonomy.entries() {
            let mentions = count_mentions(&lower, term);
            if mentions == 0 || !seen.insert(term) {
                continue;
            }
            skills.push(SkillRecord {
                skill: term.to_string(),
                category,
                proficiency: estimate_proficiency(&lower, term, mentions),
                years_experience: estimate_years(&lower, term),
            });
        }

        skills
    }

    fn extract_profile(&self, text: &str) -> ResumeProfile {
        ResumeProfile {
            skills: self.extract_skills(text),
            education: extract_education(text),
            certifications: extract_certifications(text),
            experience: self.extract_experience(text),
        }
    }
}

impl TaxonomyExtractor {
    /// Roles in document order. A role's block runs from its header line to
    /// the next role header or section header.
    fn extract_experience(&self, text: &str) -> Vec<ExperienceEntry> {
        let lines: Vec<&str> = text.lines().collect();
        let headers: Vec<(usize, String, String)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| parse_role(line).map(|(title, company)| (i, title, company)))
            .collect();

        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (n, (start, title, company)) in headers.iter().enumerate() {
            if !seen.insert((title.to_lowercase(), company.to_lowercase())) {
                continue;
            }
            let next_role = headers.get(n + 1).map_or(lines.len(), |(i, _, _)| *i);
            let end = (start + 1..next_role)
                .find(|&i| is_section_header(lines[i]))
                .unwrap_or(next_role);

            let block_lower = lines[*start..end].join("\n").to_lowercase();
            entries.push(ExperienceEntry {
                job_title: title.clone(),
                company: company.clone(),
                key_achievements: role_achievements(&lines[start + 1..end]),
                relevant_skills: self.role_skills(&block_lower),
            });

            if entries.len() == MAX_ROLES {
                break;
            }
        }

        entries
    }

    fn role_skills(&self, block_lower: &str) -> Vec<String> {
        let mut skills: Vec<String> = Vec::new();
        for (_, term) in self.taxonomy.entries() {
            if count_mentions(block_lower, term) > 0 && !skills.iter().any(|s| s == term) {
                skills.push(term.to_string());
            }
            if skills.len() == MAX_ROLE_SKILLS {
                break;
            }
        }
        skills
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Term matching
// ────────────────────────────────────────────────────────────────────────────

/// `&` joins letters into one token ("R&D", "Q&A").
fn is_boundary(c: Option<char>) -> bool {
    c.map_or(true, |c| !c.is_alphanumeric() && c != '&')
}

/// Whole-word/phrase occurrences of `term` in already lower-cased text.
pub fn count_mentions(text_lower: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    text_lower
        .match_indices(term)
        .filter(|(idx, _)| {
            let before = text_lower[..*idx].chars().next_back();
            let after = text_lower[idx + term.len()..].chars().next();
            is_boundary(before) && is_boundary(after)
        })
        .count()
}

fn has_phrase(text_lower: &str, phrase: &str) -> bool {
    count_mentions(text_lower, phrase) > 0
}

/// Explicit qualifiers win; otherwise mention count decides.
fn estimate_proficiency(text_lower: &str, term: &str, mentions: usize) -> Proficiency {
    let qualified = |q: &str| has_phrase(text_lower, &format!("{q} {term}"));

    if qualified("expert") || has_phrase(text_lower, &format!("{term} expert")) {
        Proficiency::Expert
    } else if qualified("senior") || qualified("advanced") {
        Proficiency::Advanced
    } else if qualified("intermediate") {
        Proficiency::Intermediate
    } else if qualified("beginner") || qualified("basic") {
        Proficiency::Beginner
    } else if mentions >= 5 {
        Proficiency::Advanced
    } else if mentions >= 3 {
        Proficiency::Intermediate
    } else {
        Proficiency::Beginner
    }
}

/// "5 years of Python", "Python (3 years)", "7+ years building ... Python".
fn estimate_years(text_lower: &str, term: &str) -> Option<u32> {
    let t = regex::escape(term);
    let patterns = [
        format!(
            r"(\d+)\+?\s+years?\s+(?:of\s+)?(?:experience\s+(?:with|in)\s+)?{t}(?:[^a-z0-9]|$)"
        ),
        format!(r"(?:^|[^a-z0-9]){t}\s*\((\d+)\+?\s*years?\)"),
        format!(r"(\d+)\+?\s+years?\b[^.\n]{{0,40}}?[^a-z0-9]{t}(?:[^a-z0-9]|$)"),
    ];

    patterns.iter().find_map(|pattern| {
        Regex::new(pattern)
            .ok()?
            .captures(text_lower)?
            .get(1)?
            .as_str()
            .parse::<u32>()
            .ok()
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Work history
// ────────────────────────────────────────────────────────────────────────────

/// "Senior Engineer at Acme" or "Acme Corp - Backend Developer" → (title, company).
fn parse_role(line: &str) -> Option<(String, String)> {
    let (title, company) = if let Some(caps) = TITLE_AT_COMPANY_RE.captures(line) {
        (caps.get(1)?.as_str(), caps.get(2)?.as_str())
    } else {
        let caps = COMPANY_DASH_TITLE_RE.captures(line)?;
        (caps.get(2)?.as_str(), caps.get(1)?.as_str())
    };

    let company = company.trim().trim_end_matches([',', '.']).trim();
    if company.is_empty() {
        return None;
    }
    Some((title.trim().to_string(), company.to_string()))
}

fn is_section_header(line: &str) -> bool {
    let cleaned = line.trim().trim_end_matches(':').to_lowercase();
    SECTION_HEADERS.contains(&cleaned.as_str())
}

/// Bulleted lines, or lines with an achievement verb, of plausible length.
fn role_achievements(block: &[&str]) -> Vec<String> {
    block
        .iter()
        .filter_map(|line| {
            let trimmed = line.trim();
            let bulleted = trimmed.starts_with(BULLETS);
            let text = trimmed.trim_start_matches(BULLETS).trim();
            let lower = text.to_lowercase();
            let len = text.chars().count();
            let looks_like = bulleted || ACHIEVEMENT_WORDS.iter().any(|w| has_phrase(&lower, w));
            (looks_like && len > 10 && len < 200).then(|| text.to_string())
        })
        .take(MAX_ACHIEVEMENTS)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Education & certifications
// ────────────────────────────────────────────────────────────────────────────

fn extract_education(text: &str) -> Vec<EducationEntry> {
    let mut entries = Vec::new();

    for caps in DEGREE_RE.captures_iter(text) {
        let (Some(whole), Some(degree), Some(field)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };

        let (field, mut institution) = split_field(field.as_str());

        if institution.is_none() {
            let rest = &text[whole.end()..];
            let line_rest = rest.split('\n').next().unwrap_or("");
            institution = INSTITUTION_RE
                .find(line_rest)
                .map(|m| m.as_str().trim().to_string());
        }

        entries.push(EducationEntry {
            degree: degree.as_str().trim().to_string(),
            field,
            institution,
        });

        if entries.len() == MAX_EDUCATION {
            break;
        }
    }

    entries
}

/// "Computer Science from Stanford University" → ("Computer Science", Some("Stanford University")).
fn split_field(raw: &str) -> (String, Option<String>) {
    let lower = raw.to_lowercase();
    for sep in [" from ", " at "] {
        if let Some(idx) = lower.find(sep) {
            let field = raw[..idx].trim().to_string();
            let tail = raw[idx + sep.len()..].trim();
            let institution = INSTITUTION_RE
                .find(tail)
                .map(|m| m.as_str().trim().to_string());
            return (field, institution);
        }
    }
    (raw.trim().to_string(), None)
}

fn extract_certifications(text: &str) -> Vec<String> {
    let mut certs = BTreeSet::new();

    for caps in CERT_VENDOR_RE.captures_iter(text) {
        if let (Some(vendor), Some(name)) = (caps.get(1), caps.get(2)) {
            certs.insert(format!("{} Certified {}", vendor.as_str(), clean_cert(name.as_str())));
        }
    }
    for caps in CERT_AFTER_RE.captures_iter(text) {
        if let Some(name) = caps.get(1) {
            certs.insert(clean_cert(name.as_str()));
        }
    }
    for caps in CERT_ACRONYM_RE.captures_iter(text) {
        if let Some(acronym) = caps.get(1) {
            certs.insert(format!("{} Certified", acronym.as_str()));
        }
    }

    certs
        .into_iter()
        .filter(|c| c.len() > 3)
        .take(MAX_CERTIFICATIONS)
        .collect()
}

fn clean_cert(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c == '-' || c == '(' || c.is_whitespace())
        .to_string()
}
