use std::sync::Arc;

use tracing::{error, info};

use crate::{ArticleExtractor, ExtractedArticle, FetchSettings, PageFetcher, ScrapeError};

/// Fetch-then-extract pipeline for one address at a time. Cheap to clone and
/// safe to share between concurrent requests.
#[derive(Debug, Clone)]
pub struct ArticleScraper {
    fetcher: PageFetcher,
    extractor: Arc<ArticleExtractor>,
}

impl ArticleScraper {
    pub fn new(settings: FetchSettings) -> Result<Self, ScrapeError> {
        Ok(Self::with_parts(PageFetcher::new(settings)?, ArticleExtractor::new()))
    }

    pub fn with_parts(fetcher: PageFetcher, extractor: ArticleExtractor) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(extractor),
        }
    }

    pub async fn scrape(&self, url: &str) -> Result<ExtractedArticle, ScrapeError> {
        let result = self.scrape_inner(url).await;
        match &result {
            Ok(article) => info!(
                url,
                title = %article.title,
                paragraphs = article.paragraphs.len(),
                chars = article.content_length(),
                "article extracted"
            ),
            Err(err) => error!(url, error = %err, "article extraction failed"),
        }
        result
    }

    async fn scrape_inner(&self, url: &str) -> Result<ExtractedArticle, ScrapeError> {
        let page = self.fetcher.fetch(url).await?;

        // html5ever trees are !Send and parsing is CPU-bound.
        let extractor = Arc::clone(&self.extractor);
        let source = url.to_string();
        let article = tokio::task::spawn_blocking(move || extractor.extract(&page.body, &source))
            .await??;
        Ok(article)
    }
}
