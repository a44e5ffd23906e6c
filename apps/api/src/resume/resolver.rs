//! Turns a resume reference (inline text or stored file id) into plain text.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::resume::extract::{extract_file, FileKind};

/// Inline text wins when it is non-blank; otherwise the file id is resolved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeRef {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub resume_file_id: Option<String>,
}

impl ResumeRef {
    /// Neither non-blank text nor a non-blank file id.
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.resume_text) && blank(&self.resume_file_id)
    }
}

#[derive(Clone)]
pub struct ResumeResolver {
    client: Client,
    backend_url: String,
    max_bytes: usize,
}

impl ResumeResolver {
    pub fn new(backend_url: &str, timeout: Duration, max_bytes: usize) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            max_bytes,
        })
    }

    pub async fn resolve(&self, reference: &ResumeRef) -> Result<String, AppError> {
        if let Some(text) = reference.resume_text.as_deref() {
            if !text.trim().is_empty() {
                return Ok(text.to_string());
            }
        }

        match reference.resume_file_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => self.fetch_file_text(id).await,
            _ => Err(AppError::Validation(
                "Either resume_text or resume_file_id must be provided".to_string(),
            )),
        }
    }

    async fn fetch_file_text(&self, file_id: &str) -> Result<String, AppError> {
        let presign_url = format!("{}/files/presigned/{}", self.backend_url, file_id);
        let response = self.client.get(&presign_url).send().await.map_err(upstream)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppError::NotFound(format!("Resume file {file_id} not found")))
            }
            s if !s.is_success() => {
                return Err(AppError::Upstream(format!(
                    "resume backend returned {s} for file {file_id}"
                )))
            }
            _ => {}
        }

        let body = response.text().await.map_err(upstream)?;
        let download_url = body.trim().trim_matches('"').to_string();
        debug!("Resolved file {} to a presigned URL", file_id);

        let bytes = self.download(&download_url, file_id).await?;

        let name = file_name_for(&download_url, &bytes);
        let extracted = extract_file(name, bytes, self.max_bytes).await?;
        info!(
            "Fetched resume file {}: {} bytes, {} words",
            file_id, extracted.file_size, extracted.word_count
        );
        Ok(extracted.text)
    }

    /// Reads the body chunk by chunk and stops as soon as it passes
    /// `max_bytes`. A declared length over the limit is rejected unread.
    async fn download(&self, url: &str, file_id: &str) -> Result<Vec<u8>, AppError> {
        let mut file = self.client.get(url).send().await.map_err(upstream)?;
        if !file.status().is_success() {
            return Err(AppError::Upstream(format!(
                "download of resume file {file_id} failed with {}",
                file.status()
            )));
        }

        let too_large = |size: String| {
            AppError::PayloadTooLarge(format!(
                "resume file {file_id} is {size} bytes; the limit is {}",
                self.max_bytes
            ))
        };

        if let Some(declared) = file.content_length() {
            if declared > self.max_bytes as u64 {
                return Err(too_large(declared.to_string()));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = file.chunk().await.map_err(upstream)? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(too_large(format!("more than {}", body.len() + chunk.len())));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn upstream(e: reqwest::Error) -> AppError {
    AppError::Upstream(format!("resume backend request failed: {e}"))
}

/// Last path segment of the URL, or a name picked from the content when the
/// URL carries no usable extension.
fn file_name_for(url: &str, bytes: &[u8]) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or_default();
    if FileKind::from_file_name(segment).is_some() {
        return segment.to_string();
    }
    if bytes.starts_with(b"%PDF") {
        "resume.pdf".to_string()
    } else if bytes.starts_with(b"PK\x03\x04") {
        "resume.docx".to_string()
    } else {
        "resume.txt".to_string()
    }
}
