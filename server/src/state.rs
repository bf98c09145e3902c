use article_service_cli::{ArticleScraper, ExportDir, Exporter};
use tracing::info;

use crate::config::ServerConfig;

/// Shared by every request; both parts are cheap to clone.
#[derive(Clone, Debug)]
pub struct AppState {
    pub scraper: ArticleScraper,
    pub exporter: Exporter,
}

impl AppState {
    pub async fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let dir = ExportDir::new(&config.export_dir);
        dir.ensure().await?;
        info!(dir = %dir.root().display(), "export directory ready");

        let scraper = ArticleScraper::new(config.fetch.clone())?;
        let exporter = Exporter::new(dir, config.cleanup_delay, config.chrome_path.clone());
        Ok(Self::from_parts(scraper, exporter))
    }

    pub fn from_parts(scraper: ArticleScraper, exporter: Exporter) -> Self {
        Self { scraper, exporter }
    }
}
