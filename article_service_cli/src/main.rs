use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use article_service_cli::{utils, ArticleScraper, ExportDir, ExportRequest, Exporter, FetchSettings};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Article URL to extract
    #[arg(short, long)]
    url: String,

    /// Export format (docx, pdf, html); anything else is treated as html
    #[arg(short, long)]
    format: Option<String>,

    /// Directory for exported files
    #[arg(short, long, default_value = "temp")]
    out_dir: PathBuf,

    /// Where to write the extracted article as JSON
    #[arg(long, default_value = "article.json")]
    output: PathBuf,

    /// Chrome/Chromium executable used for PDF output
    #[arg(long, env = "CHROME_PATH")]
    chrome: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::init_tracing();

    let args = Args::parse();

    let scraper = ArticleScraper::new(FetchSettings::default())?;
    let article = scraper.scrape(&args.url).await?;
    utils::save_json(&article, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    if let Some(format) = args.format.as_deref() {
        let dir = ExportDir::new(&args.out_dir);
        dir.ensure()
            .await
            .with_context(|| format!("creating {}", args.out_dir.display()))?;

        let exporter = Exporter::new(dir, Duration::ZERO, args.chrome.clone());
        let request = ExportRequest {
            title: article.title.clone(),
            paragraphs: article.paragraphs.clone(),
            format: format.into(),
        };
        let file = exporter.export(&request).await?.keep();
        info!(path = %file.filepath.display(), "article exported");
        println!("{}", file.filepath.display());
    }

    Ok(())
}
