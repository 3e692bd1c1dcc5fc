//! Byte stream to plain text, by content type.
//!
//! Plain text must be valid UTF-8. PDFs go through `pdftotext` (poppler-utils)
//! from a temporary file, guarded by a timeout.

use std::io::Write;
use std::time::Duration;

use lawlytic_core::defaults;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_PDF: &str = "application/pdf";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported content type: {0}")]
    Unsupported(String),

    #[error("text is not valid UTF-8")]
    InvalidUtf8,

    #[error("not a PDF (missing %PDF header)")]
    NotPdf,

    #[error("pdftotext failed: {0}")]
    Tool(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content type for a file name, from its extension.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" | "md" => Some(TEXT_PLAIN),
        "pdf" => Some(APPLICATION_PDF),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct TextExtractor {
    timeout: Duration,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            timeout: defaults::EXTRACT_TIMEOUT,
        }
    }
}

impl TextExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Extract text from `bytes` of the given MIME type. Parameters such as
    /// `; charset=utf-8` are ignored.
    pub async fn extract(&self, bytes: &[u8], content_type: &str) -> Result<String, ExtractError> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            TEXT_PLAIN => String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::InvalidUtf8),
            APPLICATION_PDF => self.pdf_text(bytes).await,
            _ => Err(ExtractError::Unsupported(content_type.to_string())),
        }
    }

    async fn pdf_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(ExtractError::NotPdf);
        }

        // pdftotext reads from a path.
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(bytes)?;
        tmp.flush()?;

        let output = tokio::time::timeout(
            self.timeout,
            Command::new("pdftotext")
                .arg("-layout")
                .arg(tmp.path())
                .arg("-")
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ExtractError::Tool(format!("timed out after {}s", self.timeout.as_secs())))?
        .map_err(|e| ExtractError::Tool(format!("could not run: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Tool(format!(
                "exit {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = bytes.len(), chars = text.len(), "pdf text extracted");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_is_decoded() {
        let text = TextExtractor::default()
            .extract("Section 1. Term.\n".as_bytes(), "text/plain")
            .await
            .unwrap();
        assert_eq!(text, "Section 1. Term.\n");
    }

    #[tokio::test]
    async fn content_type_parameters_are_ignored() {
        let text = TextExtractor::default()
            .extract(b"hello", "Text/Plain; charset=utf-8")
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn invalid_utf8_is_rejected() {
        let err = TextExtractor::default()
            .extract(&[0xff, 0xfe, 0x00], "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUtf8));
    }

    #[tokio::test]
    async fn unknown_type_is_unsupported() {
        let err = TextExtractor::default()
            .extract(b"PK\x03\x04", "application/zip")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported(t) if t == "application/zip"));
    }

    #[tokio::test]
    async fn pdf_without_magic_is_rejected_before_running_tool() {
        let err = TextExtractor::default()
            .extract(b"just text", APPLICATION_PDF)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotPdf));
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for("lease.PDF"), Some(APPLICATION_PDF));
        assert_eq!(content_type_for("nda.txt"), Some(TEXT_PLAIN));
        assert_eq!(content_type_for("contract.docx"), None);
        assert_eq!(content_type_for("README"), None);
    }
}
