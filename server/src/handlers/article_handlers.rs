use article_service_cli::{ExportRequest, ExtractedArticle};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::delivery;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractPayload {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub format: Option<String>,
}

/// Article as returned to the browser client.
#[derive(Debug, Serialize)]
pub struct ArticleData {
    pub title: String,
    pub content: String,
    pub paragraphs: Vec<String>,
    pub url: String,
}

impl From<ExtractedArticle> for ArticleData {
    fn from(article: ExtractedArticle) -> Self {
        Self {
            content: article.content(),
            title: article.title,
            paragraphs: article.paragraphs,
            url: article.url,
        }
    }
}

/// POST /api/extract-article
pub async fn extract_article(
    State(state): State<AppState>,
    payload: Result<Json<ExtractPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload.map_err(|err| ApiError::Validation(err.body_text()))?;
    let url = present(payload.url).ok_or_else(|| ApiError::Validation("url is required".into()))?;

    let article = state.scraper.scrape(&url).await?;
    Ok(Json(json!({ "success": true, "data": ArticleData::from(article) })))
}

/// POST /api/download-article
pub async fn download_article(
    State(state): State<AppState>,
    payload: Result<Json<DownloadPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|err| ApiError::Validation(err.body_text()))?;
    let (Some(title), Some(content), Some(format)) = (
        present(payload.title),
        present(payload.content),
        present(payload.format),
    ) else {
        return Err(ApiError::Validation(
            "incomplete data: title, content and format are required".into(),
        ));
    };

    let request = ExportRequest::from_content(&title, &content, &format);
    let export = state.exporter.export(&request).await?;
    delivery::attachment(export).await
}

/// Absent and empty strings are missing; whitespace is left to the renderer.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
