//! Built-in sample postings, served when `USE_MOCK_DATA` is on.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::jobs::{JobQuery, JobSource};

pub fn sample_jobs() -> Vec<Value> {
    vec![
        json!({
            "id": "job_1",
            "title": "Senior Software Engineer",
            "company": "Tech Corp",
            "location": "San Francisco, CA",
            "salary_min": 120000,
            "salary_max": 180000,
            "description": "We are seeking a Senior Software Engineer to join our dynamic team. \
                Requirements: 5+ years of experience in Java, Spring Boot, microservices architecture, \
                AWS cloud services, and agile development. Experience with React and MongoDB preferred.",
            "skills": ["Java", "Spring Boot", "AWS", "React", "MongoDB", "Microservices"],
            "employment_type": "Full-time",
            "remote": true,
            "posted_date": "2024-08-20"
        }),
        json!({
            "id": "job_2",
            "title": "Full Stack Developer",
            "company": "StartupXYZ",
            "location": "Austin, TX",
            "salary_min": 90000,
            "salary_max": 130000,
            "description": "Join our growing startup as a Full Stack Developer. Work with modern \
                technologies including Angular, Node.js, Python, and PostgreSQL. Experience with \
                Docker and Kubernetes is a plus.",
            "skills": ["Angular", "Node.js", "Python", "PostgreSQL", "Docker", "Kubernetes"],
            "employment_type": "Full-time",
            "remote": false,
            "posted_date": "2024-08-22"
        }),
        json!({
            "id": "job_3",
            "title": "DevOps Engineer",
            "company": "CloudTech Solutions",
            "location": "New York, NY",
            "salary_min": 110000,
            "salary_max": 160000,
            "description": "We need a DevOps Engineer with expertise in CI/CD pipelines, \
                containerization, and cloud infrastructure. Required skills: AWS, Docker, Kubernetes, \
                Jenkins, Terraform, and monitoring tools like Prometheus.",
            "skills": ["AWS", "Docker", "Kubernetes", "Jenkins", "Terraform", "CI/CD"],
            "employment_type": "Full-time",
            "remote": true,
            "posted_date": "2024-08-21"
        }),
    ]
}

/// Serves `sample_jobs()` regardless of the query text; the catalog applies
/// location/remote filters afterwards.
#[derive(Debug, Default, Clone)]
pub struct SampleJobSource;

#[async_trait]
impl JobSource for SampleJobSource {
    fn name(&self) -> &str {
        "sample"
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<Value>, AppError> {
        Ok(sample_jobs().into_iter().take(query.limit).collect())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Value>, AppError> {
        Ok(sample_jobs()
            .into_iter()
            .find(|job| job.get("id").and_then(Value::as_str) == Some(id)))
    }
}
