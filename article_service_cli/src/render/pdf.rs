//! PDF output through a headless browser.
//!
//! A browser session is launched per render and closed on every path, success
//! or not. [`PdfEngine`] is the seam: [`ChromiumEngine`] drives Chrome over CDP.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{escape_html, visible_paragraphs, ExportFormat, RenderBackend};
use crate::RenderError;

const CSS_PX_PER_INCH: f64 = 96.0;

/// Paper and margins, in inches as CDP expects them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub print_background: bool,
}

impl PageSetup {
    /// A4 with 40px top/bottom and 30px side margins.
    pub fn a4() -> Self {
        Self {
            paper_width: 8.27,
            paper_height: 11.69,
            margin_top: 40.0 / CSS_PX_PER_INCH,
            margin_bottom: 40.0 / CSS_PX_PER_INCH,
            margin_left: 30.0 / CSS_PX_PER_INCH,
            margin_right: 30.0 / CSS_PX_PER_INCH,
            print_background: true,
        }
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4()
    }
}

#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PdfSession>, RenderError>;
}

#[async_trait]
pub trait PdfSession: Send {
    async fn print(&mut self, html: &str, setup: &PageSetup) -> Result<Vec<u8>, RenderError>;

    /// Shuts the browser down. Called exactly once per launched session.
    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}

pub struct PdfRenderer<E> {
    engine: E,
    setup: PageSetup,
}

impl<E: PdfEngine> PdfRenderer<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            setup: PageSetup::a4(),
        }
    }

    pub fn page(title: &str, paragraphs: &[String]) -> String {
        let body: String = visible_paragraphs(paragraphs)
            .map(|p| format!("<p>{}</p>\n", escape_html(p)))
            .collect();
        format!(
            r#"<!DOCTYPE html>
<html><head><meta charset="UTF-8">
<style>
  body {{ font-family: Arial, sans-serif; padding: 40px; font-size: 14px; color: #333; }}
  h1 {{ font-size: 22px; text-align: center; margin-bottom: 30px; }}
  p {{ margin: 10px 0; text-align: justify; line-height: 1.6; }}
</style>
</head><body>
<h1>{}</h1>
{body}</body></html>
"#,
            escape_html(title)
        )
    }
}

#[async_trait]
impl<E: PdfEngine> RenderBackend for PdfRenderer<E> {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    async fn render_bytes(
        &self,
        title: &str,
        paragraphs: &[String],
    ) -> Result<Vec<u8>, RenderError> {
        let html = Self::page(title, paragraphs);

        let mut session = self.engine.launch().await?;
        let printed = session.print(&html, &self.setup).await;
        if let Err(err) = session.close().await {
            warn!(error = %err, "browser did not shut down cleanly");
        }

        let bytes = printed?;
        info!(bytes = bytes.len(), "pdf rendered");
        Ok(bytes)
    }
}

/// Launches a fresh headless Chrome/Chromium per session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumEngine {
    executable: Option<PathBuf>,
}

impl ChromiumEngine {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    fn config(&self, profile: &Path) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile);
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(RenderError::Browser)
    }
}

/// Per-launch user-data directory, removed with the session.
fn fresh_profile() -> std::io::Result<TempDir> {
    tempfile::Builder::new().prefix("article-pdf-").tempdir()
}

#[async_trait]
impl PdfEngine for ChromiumEngine {
    async fn launch(&self) -> Result<Box<dyn PdfSession>, RenderError> {
        let profile = fresh_profile()?;
        let (browser, mut handler) = Browser::launch(self.config(profile.path())?).await?;
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        debug!(profile = %profile.path().display(), "headless browser launched");
        Ok(Box::new(ChromiumSession {
            browser,
            events,
            profile,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    events: JoinHandle<()>,
    profile: TempDir,
}

#[async_trait]
impl PdfSession for ChromiumSession {
    async fn print(&mut self, html: &str, setup: &PageSetup) -> Result<Vec<u8>, RenderError> {
        let page = self.browser.new_page("about:blank").await?;
        page.set_content(html).await?;
        let params = PrintToPdfParams {
            print_background: Some(setup.print_background),
            paper_width: Some(setup.paper_width),
            paper_height: Some(setup.paper_height),
            margin_top: Some(setup.margin_top),
            margin_bottom: Some(setup.margin_bottom),
            margin_left: Some(setup.margin_left),
            margin_right: Some(setup.margin_right),
            ..Default::default()
        };
        Ok(page.pdf(params).await?)
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        let ChromiumSession {
            mut browser,
            events,
            profile,
        } = *self;
        let closed = browser.close().await;
        if let Err(err) = browser.wait().await {
            debug!(error = %err, "waiting for browser exit failed");
        }
        events.abort();
        if let Err(err) = profile.close() {
            debug!(error = %err, "browser profile cleanup failed");
        }
        closed?;
        debug!("headless browser closed");
        Ok(())
    }
}
