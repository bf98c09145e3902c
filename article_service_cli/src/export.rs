//! Export coordination: pick a backend, write the file, own its lifetime.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::render::{
    ChromiumEngine, DocxRenderer, ExportFormat, HtmlRenderer, PdfRenderer, RenderBackend,
};
use crate::{split_paragraphs, RenderError};

/// Directory that holds rendered files until they are delivered.
#[derive(Debug, Clone)]
pub struct ExportDir {
    root: PathBuf,
}

impl ExportDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if missing. Safe to call repeatedly.
    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// `article_<unix-millis>.<ext>`; same-millisecond collisions are not guarded against.
    pub fn unique_name(&self, extension: &str) -> String {
        format!("article_{}.{extension}", Utc::now().timestamp_millis())
    }

    /// Writes `bytes` next to the final name and renames into place, so a
    /// reader never sees a half-written file.
    pub async fn persist(&self, filename: &str, bytes: &[u8]) -> Result<ExportedFile, RenderError> {
        let filepath = std::path::absolute(self.root.join(filename))?;
        let partial = filepath.with_extension(match filepath.extension() {
            Some(ext) => format!("{}.part", ext.to_string_lossy()),
            None => "part".to_string(),
        });

        if let Err(err) = write_then_rename(&partial, &filepath, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(err.into());
        }

        debug!(path = %filepath.display(), bytes = bytes.len(), "export written");
        Ok(ExportedFile {
            filename: filename.to_string(),
            filepath,
        })
    }
}

async fn write_then_rename(partial: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(partial, bytes).await?;
    tokio::fs::rename(partial, target).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub filepath: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub title: String,
    pub paragraphs: Vec<String>,
    pub format: ExportFormat,
}

impl ExportRequest {
    /// Builds a request from a blank-line separated content string and a
    /// format name; unknown formats mean HTML.
    pub fn from_content(title: &str, content: &str, format: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            paragraphs: split_paragraphs(content),
            format: ExportFormat::from(format),
        }
    }
}

/// How a delivered file's life ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
}

/// Owns a rendered file; dropping it deletes the file after `grace`.
///
/// Hand the guard to whatever streams the file out and drop it when that is
/// finished or abandoned. Call [`TransientFile::keep`] to retain the file.
#[derive(Debug)]
pub struct TransientFile {
    file: ExportedFile,
    format: ExportFormat,
    grace: Duration,
    outcome: DeliveryOutcome,
    armed: bool,
}

impl TransientFile {
    pub fn new(file: ExportedFile, format: ExportFormat, grace: Duration) -> Self {
        Self {
            file,
            format,
            grace,
            outcome: DeliveryOutcome::Failed,
            armed: true,
        }
    }

    pub fn file(&self) -> &ExportedFile {
        &self.file
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn mark_delivered(&mut self) {
        self.outcome = DeliveryOutcome::Delivered;
    }

    /// Disarms cleanup and hands back the file.
    pub fn keep(mut self) -> ExportedFile {
        self.armed = false;
        self.file.clone()
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.outcome {
            DeliveryOutcome::Delivered => info!(file = %self.file.filename, "export delivered"),
            DeliveryOutcome::Failed => warn!(file = %self.file.filename, "export not delivered"),
        }
        remove_later(self.file.filepath.clone(), self.grace);
    }
}

fn remove_later(path: PathBuf, grace: Duration) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if !grace.is_zero() {
                    tokio::time::sleep(grace).await;
                }
                if let Err(err) = tokio::fs::remove_file(&path).await {
                    debug!(path = %path.display(), error = %err, "export cleanup failed");
                }
            });
        }
        Err(_) => {
            if let Err(err) = std::fs::remove_file(&path) {
                debug!(path = %path.display(), error = %err, "export cleanup failed");
            }
        }
    }
}

/// Maps each format to one backend and produces owned export files.
#[derive(Clone)]
pub struct Exporter {
    dir: ExportDir,
    grace: Duration,
    docx: Arc<dyn RenderBackend>,
    pdf: Arc<dyn RenderBackend>,
    html: Arc<dyn RenderBackend>,
}

impl Exporter {
    /// DOCX and HTML built in, PDF through headless Chrome.
    pub fn new(dir: ExportDir, grace: Duration, chrome: Option<PathBuf>) -> Self {
        Self::with_pdf_backend(dir, grace, Arc::new(PdfRenderer::new(ChromiumEngine::new(chrome))))
    }

    pub fn with_pdf_backend(dir: ExportDir, grace: Duration, pdf: Arc<dyn RenderBackend>) -> Self {
        Self {
            dir,
            grace,
            docx: Arc::new(DocxRenderer),
            pdf,
            html: Arc::new(HtmlRenderer),
        }
    }

    pub fn backend(&self, format: ExportFormat) -> &dyn RenderBackend {
        match format {
            ExportFormat::Docx => self.docx.as_ref(),
            ExportFormat::Pdf => self.pdf.as_ref(),
            ExportFormat::Html => self.html.as_ref(),
        }
    }

    pub async fn export(&self, request: &ExportRequest) -> Result<TransientFile, RenderError> {
        let backend = self.backend(request.format);
        match backend
            .render(&self.dir, &request.title, &request.paragraphs)
            .await
        {
            Ok(file) => {
                info!(format = %request.format, file = %file.filename, "export rendered");
                Ok(TransientFile::new(file, request.format, self.grace))
            }
            Err(err) => {
                error!(format = %request.format, error = %err, "export render failed");
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("dir", &self.dir)
            .field("grace", &self.grace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Failing;

    #[async_trait]
    impl RenderBackend for Failing {
        fn format(&self) -> ExportFormat {
            ExportFormat::Pdf
        }

        async fn render_bytes(&self, _: &str, _: &[String]) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Browser("no browser".into()))
        }
    }

    fn exporter(dir: &Path) -> Exporter {
        Exporter::with_pdf_backend(ExportDir::new(dir), Duration::ZERO, Arc::new(Failing))
    }

    #[test]
    fn request_splits_content_and_parses_format() {
        let request = ExportRequest::from_content(" T ", "one\n\ntwo\n\n\n\n", "xyz");
        assert_eq!(request.title, "T");
        assert_eq!(request.paragraphs, vec!["one", "two"]);
        assert_eq!(request.format, ExportFormat::Html);
    }

    #[tokio::test]
    async fn unknown_format_renders_html_file() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());
        let request = ExportRequest::from_content("T", "<b>hi</b>", "xyz");

        let file = exporter.export(&request).await.unwrap().keep();
        assert!(file.filename.starts_with("article_"));
        assert!(file.filename.ends_with(".html"));
        assert!(file.filepath.is_absolute());
        let html = std::fs::read_to_string(&file.filepath).unwrap();
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn dropping_the_guard_removes_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());
        let request = ExportRequest::from_content("T", "body", "docx");

        let mut guard = exporter.export(&request).await.unwrap();
        let path = guard.file().filepath.clone();
        assert!(path.exists());
        assert_eq!(guard.format(), ExportFormat::Docx);
        guard.mark_delivered();
        drop(guard);

        for _ in 0..50 {
            if !path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn render_failure_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = exporter(tmp.path());
        let request = ExportRequest::from_content("T", "body", "pdf");

        assert!(exporter.export(&request).await.is_err());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn persist_leaves_no_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ExportDir::new(tmp.path());
        let file = dir.persist("article_1.html", b"<html></html>").await.unwrap();
        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["article_1.html".to_string()]);
        assert_eq!(file.filename, "article_1.html");
    }

    #[tokio::test]
    async fn persist_into_missing_directory_fails_cleanly() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ExportDir::new(tmp.path().join("missing"));
        assert!(matches!(
            dir.persist("article_2.pdf", b"%PDF").await,
            Err(RenderError::Io(_))
        ));
        dir.ensure().await.unwrap();
        dir.ensure().await.unwrap();
        assert!(dir.persist("article_2.pdf", b"%PDF").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn file_survives_until_grace_has_passed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("article_4.html");
        std::fs::write(&path, "x").unwrap();
        let guard = TransientFile::new(
            ExportedFile {
                filename: "article_4.html".into(),
                filepath: path.clone(),
            },
            ExportFormat::Html,
            Duration::from_secs(3),
        );
        drop(guard);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(path.exists());

        tokio::time::sleep(Duration::from_millis(200)).await;
        for _ in 0..500 {
            if !path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!path.exists());
    }

    #[test]
    fn guard_without_runtime_removes_synchronously() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("article_3.html");
        std::fs::write(&path, "x").unwrap();
        let guard = TransientFile::new(
            ExportedFile {
                filename: "article_3.html".into(),
                filepath: path.clone(),
            },
            ExportFormat::Html,
            Duration::ZERO,
        );
        drop(guard);
        assert!(!path.exists());
    }
}
