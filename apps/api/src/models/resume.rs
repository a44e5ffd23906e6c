use serde::{Deserialize, Serialize};

use crate::matching::keywords::meaningful_tokens;
use crate::matching::normalizer::normalize;
use crate::skills::SkillExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Languages,
    Frameworks,
    Databases,
    Platforms,
    Tools,
    SoftSkills,
}

impl SkillCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SkillCategory::Languages => "Languages",
            SkillCategory::Frameworks => "Frameworks",
            SkillCategory::Databases => "Databases",
            SkillCategory::Platforms => "Platforms",
            SkillCategory::Tools => "Tools",
            SkillCategory::SoftSkills => "Soft Skills",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// One detected skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub skill: String,
    pub category: SkillCategory,
    pub proficiency: Proficiency,
    pub years_experience: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub field: String,
    pub institution: Option<String>,
}

/// A "Title at Company" role and what its block of lines mentions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub job_title: String,
    pub company: String,
    pub key_achievements: Vec<String>,
    pub relevant_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CareerLevel {
    #[serde(rename = "Entry Level")]
    Entry,
    #[serde(rename = "Junior Level")]
    Junior,
    #[serde(rename = "Mid Level")]
    Mid,
    #[serde(rename = "Senior Level")]
    Senior,
}

/// Structured fields pulled from free text by a `SkillExtractor`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub skills: Vec<SkillRecord>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
}

/// A resume as seen by a single operation. Nothing here outlives the request.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub normalized: String,
    pub skills: Vec<SkillRecord>,
    /// Meaningful tokens in first-seen order.
    pub keywords: Vec<String>,
}

impl ResumeDocument {
    pub fn new(raw: &str, extractor: &dyn SkillExtractor) -> Self {
        let normalized = normalize(raw);
        let skills = extractor.extract_skills(&normalized);
        let keywords = meaningful_tokens(&normalized);
        Self {
            normalized,
            skills,
            keywords,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::extractor::TaxonomyExtractor;

    #[test]
    fn test_document_derives_skills_and_keywords() {
        let extractor = TaxonomyExtractor::default();
        let doc = ResumeDocument::new("  Senior   Python developer\n using Docker  ", &extractor);
        assert_eq!(doc.normalized, "Senior Python developer using Docker");
        assert!(doc.skills.iter().any(|s| s.skill == "python"));
        assert!(doc.skills.iter().any(|s| s.skill == "docker"));
        assert!(doc.keywords.contains(&"developer".to_string()));
    }

    #[test]
    fn test_empty_document() {
        let extractor = TaxonomyExtractor::default();
        let doc = ResumeDocument::new("   \n\t ", &extractor);
        assert!(doc.is_empty());
        assert!(doc.skills.is_empty());
        assert!(doc.keywords.is_empty());
    }

    #[test]
    fn test_proficiency_ordering() {
        assert!(Proficiency::Expert > Proficiency::Advanced);
        assert!(Proficiency::Intermediate > Proficiency::Beginner);
    }

    #[test]
    fn test_career_level_serializes_as_label() {
        assert_eq!(serde_json::to_value(CareerLevel::Mid).unwrap(), "Mid Level");
        assert!(CareerLevel::Senior > CareerLevel::Junior);
    }
}
