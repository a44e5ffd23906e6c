//! Lexical overlap between a resume and a job description.

use std::collections::{HashMap, HashSet};

/// Tokens that carry no signal for matching.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "or", "but", "the", "to", "of", "in", "on", "at", "for", "with", "by",
    "from", "as", "is", "are", "was", "were", "be", "been", "being", "will", "can", "may",
    "must", "should", "could", "would", "this", "that", "these", "those", "we", "our", "you",
    "your", "they", "their", "them", "its", "it", "not", "all", "any", "has", "have", "had",
    "who", "what", "which", "into", "about", "also", "than", "then", "such", "other", "more",
    "plus", "etc", "per", "out", "own", "via",
];

/// Max matching keywords reported per job.
pub const MAX_MATCHING_KEYWORDS: usize = 10;

/// Lower-cased word tokens. `+` and `#` stay attached so `c++` / `c#` survive.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn is_meaningful(token: &str) -> bool {
    token.chars().count() > 2 && !STOP_WORDS.contains(&token)
}

/// Unique meaningful tokens in first-seen order.
pub fn meaningful_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .filter(|t| is_meaningful(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Overlap of a resume's vocabulary with one job description.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordOverlap {
    /// |common| / |job vocabulary|, 0 when the job has no meaningful tokens.
    pub score: f64,
    /// Shared tokens in job-description order.
    pub common: Vec<String>,
}

impl KeywordOverlap {
    pub fn matching_keywords(&self) -> Vec<String> {
        self.common
            .iter()
            .take(MAX_MATCHING_KEYWORDS)
            .cloned()
            .collect()
    }
}

/// Normalized against the job's vocabulary, not the resume's.
pub fn keyword_overlap(resume_tokens: &[String], job_description: &str) -> KeywordOverlap {
    let job_tokens = meaningful_tokens(job_description);
    if job_tokens.is_empty() {
        return KeywordOverlap {
            score: 0.0,
            common: Vec::new(),
        };
    }
    let resume_set: HashSet<&str> = resume_tokens.iter().map(String::as_str).collect();
    let common: Vec<String> = job_tokens
        .iter()
        .filter(|t| resume_set.contains(t.as_str()))
        .cloned()
        .collect();
    KeywordOverlap {
        score: common.len() as f64 / job_tokens.len() as f64,
        common,
    }
}

/// Most frequent alphabetic words longer than `min_len - 1` chars, ties broken
/// by first appearance.
pub fn top_keywords(text: &str, min_len: usize, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, word) in text
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_ascii_alphabetic())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.len() >= min_len && !STOP_WORDS.contains(&w.as_str()))
        .enumerate()
    {
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().take(limit).map(|(w, _, _)| w).collect()
}
