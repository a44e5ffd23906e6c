//! File → text conversion for uploaded or downloaded resumes.

use std::fmt::Display;
use std::io::{Cursor, Read};

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::errors::AppError;

const DOCX_BODY: &str = "word/document.xml";
/// Upper bound on the inflated document part, whatever the upload size.
const MAX_DOCX_XML_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Docx,
    Txt,
}

impl FileKind {
    /// By extension, case-insensitive. `None` for anything unsupported.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            "txt" => Some(FileKind::Txt),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Pdf => "PDF",
            FileKind::Docx => "DOCX",
            FileKind::Txt => "text file",
        }
    }
}

/// Extracted text plus what the upload endpoint reports about the file.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedFile {
    pub file_name: String,
    pub file_type: FileKind,
    pub file_size: usize,
    pub text: String,
    pub word_count: usize,
    pub character_count: usize,
    pub processed_at: DateTime<Utc>,
}

/// Size limit first, then a supported extension.
fn check_file(file_name: &str, size: usize, max_bytes: usize) -> Result<FileKind, AppError> {
    if size > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "{file_name} is {size} bytes; the limit is {max_bytes}"
        )));
    }
    FileKind::from_file_name(file_name).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported file type for {file_name}; expected .pdf, .docx or .txt"
        ))
    })
}

/// Async entry point: parsing runs on the blocking pool.
pub async fn extract_file<B>(
    file_name: String,
    bytes: B,
    max_bytes: usize,
) -> Result<ExtractedFile, AppError>
where
    B: AsRef<[u8]> + Send + 'static,
{
    let kind = check_file(&file_name, bytes.as_ref().len(), max_bytes)?;
    run_blocking(kind, move || extract_text(&file_name, bytes.as_ref(), max_bytes)).await
}

/// A panicking parser surfaces as a validation error for that file kind.
async fn run_blocking<F>(kind: FileKind, job: F) -> Result<ExtractedFile, AppError>
where
    F: FnOnce() -> Result<ExtractedFile, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(job).await.map_err(|e| {
        warn!("{} extraction task failed: {}", kind.label(), e);
        AppError::Validation(format!("Could not extract text from {}", kind.label()))
    })?
}

pub fn extract_text(
    file_name: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<ExtractedFile, AppError> {
    let kind = check_file(file_name, bytes.len(), max_bytes)?;

    let text = match kind {
        FileKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Validation(format!("Could not extract text from PDF: {e}")))?,
        FileKind::Docx => docx_text(bytes)?,
        FileKind::Txt => String::from_utf8_lossy(bytes).into_owned(),
    };
    let text = text.trim().to_string();

    debug!("Extracted {} chars from {}", text.len(), file_name);

    Ok(ExtractedFile {
        file_name: file_name.to_string(),
        file_type: kind,
        file_size: bytes.len(),
        word_count: text.split_whitespace().count(),
        character_count: text.chars().count(),
        text,
        processed_at: Utc::now(),
    })
}

fn docx_error(e: impl Display) -> AppError {
    AppError::Validation(format!("Could not extract text from DOCX: {e}"))
}

/// Paragraph text from the main document part, one line per `<w:p>`.
fn docx_text(bytes: &[u8]) -> Result<String, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(docx_error)?;
    let entry = archive.by_name(DOCX_BODY).map_err(docx_error)?;
    if entry.size() > MAX_DOCX_XML_BYTES {
        return Err(docx_error(format!("{DOCX_BODY} inflates to {} bytes", entry.size())));
    }

    let mut xml = String::new();
    entry
        .take(MAX_DOCX_XML_BYTES)
        .read_to_string(&mut xml)
        .map_err(docx_error)?;

    document_xml_text(&xml)
}

fn document_xml_text(xml: &str) -> Result<String, AppError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(docx_error)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => text.push_str(&t.unescape().map_err(docx_error)?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::docx_fixture;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(FileKind::from_file_name("cv.PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_file_name("notes.txt"), Some(FileKind::Txt));
        assert_eq!(FileKind::from_file_name("resume.Docx"), Some(FileKind::Docx));
        assert_eq!(FileKind::from_file_name("resume.doc"), None);
        assert_eq!(FileKind::from_file_name("README"), None);
    }

    #[test]
    fn test_txt_extraction_with_metadata() {
        let file = extract_text("cv.txt", b"  Rust engineer\nTen years  ", 1024).unwrap();
        assert_eq!(file.text, "Rust engineer\nTen years");
        assert_eq!(file.word_count, 4);
        assert_eq!(file.character_count, 23);
        assert_eq!(file.file_size, 27);
        assert_eq!(file.file_type, FileKind::Txt);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let file = extract_text("cv.txt", &[b'o', b'k', 0xff], 1024).unwrap();
        assert!(file.text.starts_with("ok"));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let err = extract_text("cv.txt", &[b'a'; 32], 16).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let err = extract_text("cv.rtf", b"{\\rtf1}", 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_garbage_pdf_rejected() {
        let err = extract_text("cv.pdf", b"not a pdf", 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_docx_paragraphs() {
        let bytes = docx_fixture(&["Jane Doe", "Rust & Go engineer"]);
        let file = extract_text("cv.docx", &bytes, 64 * 1024).unwrap();
        assert_eq!(file.file_type, FileKind::Docx);
        assert_eq!(file.text, "Jane Doe\nRust & Go engineer");
        assert_eq!(file.word_count, 6);
    }

    #[test]
    fn test_document_xml_runs_tabs_and_breaks() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Skills:</w:t></w:r>
              <w:r><w:tab/><w:t xml:space="preserve">Kafka </w:t></w:r>
              <w:r><w:t>AWS</w:t></w:r></w:p>
            <w:p><w:r><w:t>Line</w:t><w:br/><w:t>two</w:t></w:r></w:p>
            <w:sectPr><w:pgSz w:w="12240"/></w:sectPr>
        </w:body></w:document>"#;
        assert_eq!(document_xml_text(xml).unwrap(), "Skills:\tKafka AWS\nLine\ntwo\n");
    }

    #[test]
    fn test_docx_without_document_part_rejected() {
        let err = extract_text("cv.docx", b"PK\x03\x04 not really a zip", 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("DOCX")));
    }

    #[tokio::test]
    async fn test_truncated_pdf_on_blocking_pool() {
        let truncated = b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R".to_vec();
        let err = extract_file("cv.pdf".to_string(), truncated, 1024).await.unwrap_err();
        match err {
            AppError::Validation(message) => {
                assert!(message.starts_with("Could not extract text from PDF"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parser_panic_becomes_validation_error() {
        let err = run_blocking(FileKind::Pdf, || panic!("xref table out of range"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ref m) if m == "Could not extract text from PDF"
        ));
    }

    #[tokio::test]
    async fn test_extract_file_checks_limit_before_spawning() {
        let err = extract_file("cv.txt".to_string(), vec![b'a'; 32], 16).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        let file = extract_file("cv.txt".to_string(), b"Kafka".to_vec(), 16).await.unwrap();
        assert_eq!(file.text, "Kafka");
    }
}
