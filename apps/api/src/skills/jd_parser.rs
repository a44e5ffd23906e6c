//! JD parser: derives a requirement list from a raw job description.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::skills::SkillExtractor;

/// Cap on derived requirements per description.
pub const MAX_REQUIREMENTS: usize = 20;

static EXPERIENCE_PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:experience with|knowledge of|proficient in|expertise in|familiar with)\s+([A-Za-z\s,/&]+)",
    )
    .expect("experience phrase pattern is valid")
});

static REQUIRED_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:required|must have|should have):\s*([A-Za-z\s,/&]+)")
        .expect("required list pattern is valid")
});

/// Taxonomy skills found in the description, followed by phrases listed
/// after "experience with", "must have:" and similar markers.
///
/// Items are unique case-insensitively; phrases must be longer than two chars.
pub fn derive_requirements(description: &str, extractor: &dyn SkillExtractor) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut requirements = Vec::new();

    for record in extractor.extract_skills(description) {
        if seen.insert(record.skill.to_lowercase()) {
            requirements.push(record.skill);
        }
    }

    for re in [&*EXPERIENCE_PHRASE_RE, &*REQUIRED_LIST_RE] {
        for caps in re.captures_iter(description) {
            let Some(list) = caps.get(1) else { continue };
            for item in list.as_str().split([',', '/', '&', '\n']).map(str::trim) {
                if item.chars().count() > 2 && seen.insert(item.to_lowercase()) {
                    requirements.push(item.to_string());
                }
            }
        }
    }

    requirements.truncate(MAX_REQUIREMENTS);
    requirements
}
