use async_trait::async_trait;

use super::{escape_html, visible_paragraphs, ExportFormat, RenderBackend};
use crate::RenderError;

const STYLE: &str = "body{font-family:Georgia,serif;margin:40px;} h1{color:#333;} p{text-align:justify;margin-bottom:20px;}";

/// Standalone HTML document; title and text are escaped.
#[derive(Debug, Default, Clone)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn page(title: &str, paragraphs: &[String]) -> String {
        let body: String = visible_paragraphs(paragraphs)
            .map(|p| format!("<p>{}</p>\n", escape_html(p)))
            .collect();
        let title = escape_html(title);
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"UTF-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head><body>\n<h1>{title}</h1>\n{body}</body></html>\n"
        )
    }
}

#[async_trait]
impl RenderBackend for HtmlRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    async fn render_bytes(
        &self,
        title: &str,
        paragraphs: &[String],
    ) -> Result<Vec<u8>, RenderError> {
        Ok(Self::page(title, paragraphs).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_in_content_is_inert() {
        let page = HtmlRenderer::page(
            "Title <b>bold</b>",
            &["<script>alert(1)</script>".to_string()],
        );
        assert!(!page.contains("<script>"));
        assert!(page.contains("<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"));
        assert!(page.contains("<h1>Title &lt;b&gt;bold&lt;/b&gt;</h1>"));
    }

    #[test]
    fn keeps_paragraph_order_and_skips_blanks() {
        let page = HtmlRenderer::page(
            "T",
            &["first".to_string(), "   ".to_string(), "second".to_string()],
        );
        let first = page.find("<p>first</p>").unwrap();
        let second = page.find("<p>second</p>").unwrap();
        assert!(first < second);
        assert_eq!(page.matches("<p>").count(), 2);
    }
}
