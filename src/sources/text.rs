//! Plain-text extraction from stored documents.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::error::AppError;

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("valid regex"));
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b.*?</style>").expect("valid regex"));
static BLOCK_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:br\s*/?|/p|/h[1-6]|/li|/dt|/dd|/div|/tr|/title|/pre)\s*>")
        .expect("valid regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"));

/// Turns a stored document into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the text of the document at `path`, or `AppError::Format`.
    async fn extract_text(&self, path: &Path) -> Result<String, AppError>;
}

/// Default extractor for the formats found in a corpus.
///
/// Text and Markdown are read directly, HTML is stripped of markup, and PDF is
/// converted with `pdftotext`. Anything else is reported as unsupported.
#[derive(Debug, Clone)]
pub struct CorpusTextExtractor {
    pdftotext: PathBuf,
}

impl Default for CorpusTextExtractor {
    fn default() -> Self {
        Self {
            pdftotext: PathBuf::from("pdftotext"),
        }
    }
}

impl CorpusTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific `pdftotext` binary instead of the one on `PATH`.
    pub fn with_pdftotext(path: impl Into<PathBuf>) -> Self {
        Self {
            pdftotext: path.into(),
        }
    }

    async fn read_lossy(path: &Path) -> Result<String, AppError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::format(path, e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn run_pdftotext(&self, path: &Path) -> Result<String, AppError> {
        let output = Command::new(&self.pdftotext)
            .arg("-layout")
            .arg(path.as_os_str())
            .arg("-")
            .output()
            .await
            .map_err(|e| AppError::format(path, format!("failed to run pdftotext: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::format(
                path,
                format!("pdftotext failed: {}", stderr.trim()),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TextExtractor for CorpusTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, AppError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "txt" | "md" => Self::read_lossy(path).await,
            "html" | "htm" => Ok(html_to_text(&Self::read_lossy(path).await?)),
            "pdf" => self.run_pdftotext(path).await,
            other => Err(AppError::format(path, format!("unsupported format '{other}'"))),
        }
    }
}

/// Strips markup from an HTML page, keeping block boundaries as line breaks.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = BLOCK_END_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    text.replace("&nbsp;", " ")
        .replace("&ndash;", "\u{2013}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
