//! Output formats for an extracted article.
//!
//! Every format implements [`RenderBackend`], which turns a title and its
//! paragraphs into bytes; persisting them under the export directory is shared.

pub mod docx;
pub mod html;
pub mod pdf;

use std::fmt;

use async_trait::async_trait;

use crate::export::{ExportDir, ExportedFile};
use crate::RenderError;

pub use docx::DocxRenderer;
pub use html::HtmlRenderer;
pub use pdf::{ChromiumEngine, PdfEngine, PdfRenderer, PdfSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Docx,
    Pdf,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }
}

/// Only the exact lowercase names `docx` and `pdf` select those formats;
/// everything else falls back to HTML instead of failing.
impl From<&str> for ExportFormat {
    fn from(name: &str) -> Self {
        match name {
            "docx" => ExportFormat::Docx,
            "pdf" => ExportFormat::Pdf,
            _ => ExportFormat::Html,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[async_trait]
pub trait RenderBackend: Send + Sync {
    fn format(&self) -> ExportFormat;

    async fn render_bytes(&self, title: &str, paragraphs: &[String])
        -> Result<Vec<u8>, RenderError>;

    /// Renders and writes the result under a fresh name in `dir`.
    async fn render(
        &self,
        dir: &ExportDir,
        title: &str,
        paragraphs: &[String],
    ) -> Result<ExportedFile, RenderError> {
        let bytes = self.render_bytes(title, paragraphs).await?;
        let filename = dir.unique_name(self.format().extension());
        dir.persist(&filename, &bytes).await
    }
}

/// Trimmed paragraphs with blank entries removed.
pub(crate) fn visible_paragraphs(paragraphs: &[String]) -> impl Iterator<Item = &str> {
    paragraphs.iter().map(|p| p.trim()).filter(|p| !p.is_empty())
}

/// Escapes `& < > " '` for embedding in HTML text or attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}
