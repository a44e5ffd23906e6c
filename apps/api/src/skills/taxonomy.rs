//! Fixed catalogue of recognised skill terms, grouped by category.

use crate::models::resume::SkillCategory;

const LANGUAGES: &[&str] = &[
    "python", "java", "javascript", "typescript", "c++", "c#", "go", "rust", "php", "ruby",
    "swift", "kotlin", "scala", "r", "matlab", "sql",
];

const FRAMEWORKS: &[&str] = &[
    "react", "angular", "vue", "spring", "spring boot", "django", "flask", "express",
    "node.js", "laravel", "rails", ".net", "hibernate",
];

const DATABASES: &[&str] = &[
    "mongodb", "postgresql", "mysql", "redis", "elasticsearch", "cassandra", "oracle",
    "sqlite", "dynamodb", "neo4j",
];

const PLATFORMS: &[&str] = &[
    "aws", "azure", "gcp", "google cloud", "docker", "kubernetes", "jenkins", "terraform",
    "ansible", "chef", "puppet",
];

const TOOLS: &[&str] = &[
    "git", "jira", "confluence", "postman", "swagger", "maven", "gradle", "npm", "webpack",
    "babel", "jest", "junit", "selenium",
];

const SOFT_SKILLS: &[&str] = &[
    "leadership", "communication", "teamwork", "problem solving", "analytical", "creative",
    "adaptable", "detail oriented", "time management", "critical thinking",
];

/// Category → lower-case terms. Iteration order is fixed, which makes
/// extraction output deterministic.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<(SkillCategory, Vec<String>)>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let owned = |terms: &[&str]| terms.iter().map(|t| t.to_string()).collect();
        Self {
            categories: vec![
                (SkillCategory::Languages, owned(LANGUAGES)),
                (SkillCategory::Frameworks, owned(FRAMEWORKS)),
                (SkillCategory::Databases, owned(DATABASES)),
                (SkillCategory::Platforms, owned(PLATFORMS)),
                (SkillCategory::Tools, owned(TOOLS)),
                (SkillCategory::SoftSkills, owned(SOFT_SKILLS)),
            ],
        }
    }
}

impl Taxonomy {
    pub fn new(categories: Vec<(SkillCategory, Vec<String>)>) -> Self {
        let categories = categories
            .into_iter()
            .map(|(cat, terms)| (cat, terms.into_iter().map(|t| t.to_lowercase()).collect()))
            .collect();
        Self { categories }
    }

    /// Every `(category, term)` pair in catalogue order.
    pub fn entries(&self) -> impl Iterator<Item = (SkillCategory, &str)> {
        self.categories
            .iter()
            .flat_map(|(cat, terms)| terms.iter().map(move |t| (*cat, t.as_str())))
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, terms)| terms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_all_categories() {
        let taxonomy = Taxonomy::default();
        for cat in [
            SkillCategory::Languages,
            SkillCategory::Frameworks,
            SkillCategory::Databases,
            SkillCategory::Platforms,
            SkillCategory::Tools,
            SkillCategory::SoftSkills,
        ] {
            assert!(taxonomy.entries().any(|(c, _)| c == cat), "{cat:?} missing");
        }
    }

    #[test]
    fn test_custom_terms_are_lowercased() {
        let taxonomy = Taxonomy::new(vec![(SkillCategory::Tools, vec!["Bazel".to_string()])]);
        assert_eq!(taxonomy.entries().next(), Some((SkillCategory::Tools, "bazel")));
        assert_eq!(taxonomy.len(), 1);
    }
}
