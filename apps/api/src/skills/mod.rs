pub mod extractor;
pub mod jd_parser;
pub mod taxonomy;

use crate::models::resume::{ResumeProfile, SkillRecord};

/// Pulls structured fields out of free text.
///
/// Scoring code only talks to this trait, so the regex-based
/// `TaxonomyExtractor` can be swapped for a stronger parser.
pub trait SkillExtractor: Send + Sync {
    /// Taxonomy hits, deduplicated by skill name, in catalogue order.
    fn extract_skills(&self, text: &str) -> Vec<SkillRecord>;

    /// Skills plus education and certifications.
    fn extract_profile(&self, text: &str) -> ResumeProfile;
}

/// Declared job skills that do not appear anywhere in the resume
/// (case-insensitive substring test). Input order is preserved.
pub fn find_skill_gap(job_skills: &[String], resume_text: &str) -> Vec<String> {
    let resume_lower = resume_text.to_lowercase();
    job_skills
        .iter()
        .filter(|skill| !resume_lower.contains(&skill.trim().to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_skill_gap_reports_only_absent_skills() {
        let resume = "5 years Python and AWS experience, AWS Certified Solutions Architect";
        let gap = find_skill_gap(&skills(&["Python", "AWS", "Kubernetes"]), resume);
        assert_eq!(gap, vec!["Kubernetes"]);
    }

    #[test]
    fn test_skill_gap_preserves_order() {
        let gap = find_skill_gap(&skills(&["Terraform", "Go", "Ansible"]), "nothing relevant");
        // "go" is not a substring of "nothing relevant"
        assert_eq!(gap, vec!["Terraform", "Go", "Ansible"]);
    }

    #[test]
    fn test_skill_gap_is_case_insensitive() {
        let gap = find_skill_gap(&skills(&["postgresql"]), "Tuned POSTGRESQL indexes");
        assert!(gap.is_empty());
    }

    #[test]
    fn test_skill_gap_empty_inputs() {
        assert!(find_skill_gap(&[], "anything").is_empty());
        assert_eq!(find_skill_gap(&skills(&["Rust"]), ""), vec!["Rust"]);
    }
}
