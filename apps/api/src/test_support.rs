//! In-process fakes shared by unit and router tests.

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::jobs::fixtures::SampleJobSource;
use crate::jobs::{JobCatalog, JobSource};
use crate::matching::engine::{EngineSettings, MatchEngine};
use crate::resume::resolver::ResumeResolver;
use crate::skills::extractor::TaxonomyExtractor;
use crate::state::AppState;

pub const DIM: usize = 64;

/// Deterministic bag-of-words hashing embedding.
pub fn bag_of_words(text: &str) -> Vec<f32> {
    let mut v = vec![0.0_f32; DIM];
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let hash = token
            .bytes()
            .fold(2_166_136_261_u32, |h, b| (h ^ b as u32).wrapping_mul(16_777_619));
        v[(hash as usize) % DIM] += 1.0;
    }
    v
}

/// Hashing provider that can be told to fail, stall, or count its calls.
#[derive(Default)]
pub struct FakeEmbedder {
    /// Any input containing this marker fails with an API error.
    pub fail_marker: Option<&'static str>,
    /// Any input containing this marker sleeps for `stall` before answering.
    pub stall_marker: Option<&'static str>,
    pub stall: Duration,
    /// Sleep proportional to input length, to scramble completion order.
    pub jitter: bool,
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_marker: Some(marker),
            ..Default::default()
        }
    }

    pub fn stalling_on(marker: &'static str, stall: Duration) -> Self {
        Self {
            stall_marker: Some(marker),
            stall,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            if let Some(marker) = self.fail_marker {
                if text.contains(marker) {
                    return Err(EmbeddingError::Api {
                        status: 500,
                        message: "fake failure".to_string(),
                    });
                }
            }
            if let Some(marker) = self.stall_marker {
                if text.contains(marker) {
                    tokio::time::sleep(self.stall).await;
                }
            }
            if self.jitter {
                tokio::time::sleep(Duration::from_millis(1000 - (text.len() as u64 % 1000))).await;
            }
            out.push(bag_of_words(text));
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "fake-bag-of-words"
    }
}

pub fn engine_with(embedder: Arc<FakeEmbedder>) -> MatchEngine {
    MatchEngine::new(
        embedder,
        Arc::new(TaxonomyExtractor::default()),
        EngineSettings::default(),
    )
}

pub fn fake_engine() -> MatchEngine {
    engine_with(Arc::new(FakeEmbedder::default()))
}

/// Default config, fake embedder, sample postings only, and a resume
/// backend that is never reachable.
pub fn test_state_with(embedder: Arc<FakeEmbedder>) -> AppState {
    let config = Config::from_lookup(|_| None).unwrap();
    let resolver = ResumeResolver::new(
        "http://127.0.0.1:9",
        Duration::from_secs(1),
        config.max_file_bytes(),
    )
    .unwrap();
    AppState {
        engine: Arc::new(engine_with(embedder.clone())),
        embedder,
        catalog: Arc::new(JobCatalog::new(vec![Arc::new(SampleJobSource) as Arc<dyn JobSource>])),
        resolver,
        config,
    }
}

pub fn test_state() -> AppState {
    test_state_with(Arc::new(FakeEmbedder::default()))
}

/// Smallest archive the DOCX reader accepts: one document part, one
/// paragraph per entry.
pub fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            let escaped = p.replace('&', "&amp;").replace('<', "&lt;");
            format!("<w:p><w:r><w:t>{escaped}</w:t></w:r></w:p>")
        })
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
