//! Provider payload → canonical `JobPosting`.
//!
//! Sources disagree on field names (`title` vs `job_title`, `company` vs
//! `employer_name`...). All of that is resolved here so nothing downstream
//! ever branches on a provider key.

use serde_json::Value;

use crate::models::job::JobPosting;

const ID_KEYS: &[&str] = &["id", "job_id", "_id"];
const TITLE_KEYS: &[&str] = &["title", "job_title"];
const COMPANY_KEYS: &[&str] = &["company", "employer_name"];
const LOCATION_KEYS: &[&str] = &["location", "job_location"];
const SALARY_MIN_KEYS: &[&str] = &["salary_min", "min_salary", "job_min_salary"];
const SALARY_MAX_KEYS: &[&str] = &["salary_max", "max_salary", "job_max_salary"];
const DESCRIPTION_KEYS: &[&str] = &["description", "job_description", "snippet"];
const SKILLS_KEYS: &[&str] = &["skills", "job_required_skills"];
const EMPLOYMENT_KEYS: &[&str] = &["employment_type", "job_employment_type"];
const REMOTE_KEYS: &[&str] = &["remote", "job_is_remote"];
const POSTED_KEYS: &[&str] = &["posted_date", "job_posted_at_datetime_utc", "posted"];
const URL_KEYS: &[&str] = &["url", "job_apply_link", "job_url"];
const LOGO_KEYS: &[&str] = &["company_logo_url", "employer_logo"];

/// Never fails: missing or mistyped fields come out empty/`None`.
pub fn normalize_job(raw: &Value) -> JobPosting {
    let title = first_string(raw, TITLE_KEYS).unwrap_or_default();
    let company = first_string(raw, COMPANY_KEYS).unwrap_or_default();
    let id = first_string(raw, ID_KEYS).unwrap_or_else(|| fallback_id(&title, &company));

    JobPosting {
        id,
        location: first_string(raw, LOCATION_KEYS).or_else(|| city_state(raw)),
        salary_min: first_amount(raw, SALARY_MIN_KEYS),
        salary_max: first_amount(raw, SALARY_MAX_KEYS),
        description: first_string(raw, DESCRIPTION_KEYS).unwrap_or_default(),
        skills: first_skills(raw, SKILLS_KEYS),
        employment_type: first_string(raw, EMPLOYMENT_KEYS),
        remote: first_bool(raw, REMOTE_KEYS),
        posted_date: first_string(raw, POSTED_KEYS),
        url: first_string(raw, URL_KEYS),
        company_logo_url: first_string(raw, LOGO_KEYS),
        title,
        company,
    }
}

fn first_value<'a>(raw: &'a Value, keys: &'a [&'a str]) -> impl Iterator<Item = &'a Value> + 'a {
    keys.iter()
        .filter_map(move |k| raw.get(*k))
        .filter(|v| !v.is_null())
}

fn first_string(raw: &Value, keys: &[&str]) -> Option<String> {
    first_value(raw, keys).find_map(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Salaries arrive as numbers or numeric strings ("120000", "120000.0").
fn first_amount(raw: &Value, keys: &[&str]) -> Option<u64> {
    first_value(raw, keys).find_map(|v| {
        let amount = match v {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
            _ => return None,
        };
        (amount.is_finite() && amount >= 0.0).then(|| amount.round() as u64)
    })
}

fn first_bool(raw: &Value, keys: &[&str]) -> Option<bool> {
    first_value(raw, keys).find_map(|v| match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Arrays of strings, or a single comma-separated string.
fn first_skills(raw: &Value, keys: &[&str]) -> Vec<String> {
    first_value(raw, keys)
        .find_map(|v| match v {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            Value::String(s) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}

/// JSearch splits location into `job_city` / `job_state` / `job_country`.
fn city_state(raw: &Value) -> Option<String> {
    let parts: Vec<String> = ["job_city", "job_state", "job_country"]
        .iter()
        .filter_map(|k| first_string(raw, &[*k]))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn fallback_id(title: &str, company: &str) -> String {
    let slug: String = format!("{title} {company}")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_payload() {
        let job = normalize_job(&json!({
            "id": "job_1",
            "title": "Senior Software Engineer",
            "company": "Tech Corp",
            "location": "San Francisco, CA",
            "salary_min": 120000,
            "salary_max": 180000,
            "description": "Java and AWS",
            "skills": ["Java", "AWS"],
            "employment_type": "Full-time",
            "remote": true,
            "posted_date": "2024-08-20"
        }));
        assert_eq!(job.id, "job_1");
        assert_eq!(job.salary_min, Some(120_000));
        assert_eq!(job.skills, vec!["Java", "AWS"]);
        assert_eq!(job.remote, Some(true));
    }

    #[test]
    fn test_jsearch_payload() {
        let job = normalize_job(&json!({
            "job_id": "abc123",
            "job_title": "Data Engineer",
            "employer_name": "Globex",
            "job_city": "Austin",
            "job_state": "TX",
            "job_min_salary": "95000",
            "job_max_salary": 125000.0,
            "job_description": "Spark pipelines",
            "job_employment_type": "FULLTIME",
            "job_is_remote": false,
            "job_posted_at_datetime_utc": "2024-08-22T00:00:00.000Z",
            "job_apply_link": "https://jobs.example/abc123",
            "employer_logo": null
        }));
        assert_eq!(job.id, "abc123");
        assert_eq!(job.title, "Data Engineer");
        assert_eq!(job.company, "Globex");
        assert_eq!(job.location.as_deref(), Some("Austin, TX"));
        assert_eq!(job.salary_min, Some(95_000));
        assert_eq!(job.salary_max, Some(125_000));
        assert_eq!(job.remote, Some(false));
        assert_eq!(job.url.as_deref(), Some("https://jobs.example/abc123"));
        assert!(job.company_logo_url.is_none());
    }

    #[test]
    fn test_first_present_alias_wins() {
        let job = normalize_job(&json!({
            "title": "",
            "job_title": "Backend Engineer",
            "snippet": "short"
        }));
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.description, "short");
    }

    #[test]
    fn test_skills_as_comma_string() {
        let job = normalize_job(&json!({"skills": "Rust, Go , ,Kafka"}));
        assert_eq!(job.skills, vec!["Rust", "Go", "Kafka"]);
    }

    #[test]
    fn test_garbage_never_panics() {
        let job = normalize_job(&json!({"salary_min": "lots", "remote": "maybe", "skills": 7}));
        assert_eq!(job.salary_min, None);
        assert_eq!(job.remote, None);
        assert!(job.skills.is_empty());
        let job = normalize_job(&json!([1, 2, 3]));
        assert!(job.title.is_empty());
    }

    #[test]
    fn test_fallback_id_from_title_and_company() {
        let job = normalize_job(&json!({"title": "DevOps Engineer", "company": "Acme, Inc."}));
        assert_eq!(job.id, "devops-engineer-acme-inc");
    }
}
