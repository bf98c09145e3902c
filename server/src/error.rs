use article_service_cli::{RenderError, ScrapeError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to deliver export: {0}")]
    Delivery(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Scrape(_) | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Delivery(_) => {
                tracing::error!(error = %self, "download could not be started");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}
