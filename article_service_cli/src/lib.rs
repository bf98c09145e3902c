pub mod dom;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod render;
pub mod scraper;
pub mod utils;

use serde::{Deserialize, Serialize};

pub use error::{ExtractError, FetchError, RenderError, ScrapeError};
pub use export::{ExportDir, ExportRequest, ExportedFile, Exporter, TransientFile};
pub use extract::{ArticleExtractor, ContentSource};
pub use fetch::{FetchSettings, FetchedPage, PageFetcher};
pub use render::{ExportFormat, RenderBackend};
pub use crate::scraper::ArticleScraper;

/// Paragraph separator in the flattened article content.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Paragraphs must be strictly longer than this (in characters) to count as article text.
pub const MIN_PARAGRAPH_CHARS: usize = 40;

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: String,
    pub paragraphs: Vec<String>,
    pub url: String,
}

impl ExtractedArticle {
    pub fn new(url: String, title: String, paragraphs: Vec<String>) -> Self {
        Self {
            url,
            title,
            paragraphs,
        }
    }

    /// Paragraphs joined by a blank line.
    pub fn content(&self) -> String {
        join_paragraphs(&self.paragraphs)
    }

    pub fn content_length(&self) -> usize {
        self.paragraphs.iter().map(|p| p.chars().count()).sum()
    }
}

pub fn join_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> String {
    paragraphs
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

/// Splits content on blank lines, trimming each paragraph and dropping empty ones.
pub fn split_paragraphs(content: &str) -> Vec<String> {
    content
        .replace("\r\n", "\n")
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
