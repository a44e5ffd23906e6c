use serde::{Deserialize, Serialize};

/// Canonical job posting shape. Produced by `jobs::normalize::normalize_job`
/// from heterogeneous provider payloads; the engine never sees provider keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<u64>,
    #[serde(default)]
    pub salary_max: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub remote: Option<bool>,
    #[serde(default)]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub company_logo_url: Option<String>,
}

impl JobPosting {
    pub fn is_remote(&self) -> bool {
        self.remote.unwrap_or(false)
    }

    /// Midpoint of the advertised range, or whichever bound is present.
    pub fn salary_midpoint(&self) -> Option<f64> {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => Some((min as f64 + max as f64) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v as f64),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_midpoint_both_bounds() {
        let job = JobPosting {
            salary_min: Some(100_000),
            salary_max: Some(150_000),
            ..Default::default()
        };
        assert_eq!(job.salary_midpoint(), Some(125_000.0));
    }

    #[test]
    fn test_salary_midpoint_single_bound() {
        let job = JobPosting {
            salary_max: Some(90_000),
            ..Default::default()
        };
        assert_eq!(job.salary_midpoint(), Some(90_000.0));
        assert_eq!(JobPosting::default().salary_midpoint(), None);
    }

    #[test]
    fn test_remote_defaults_to_false() {
        assert!(!JobPosting::default().is_remote());
    }
}
