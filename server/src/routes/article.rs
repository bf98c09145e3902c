use axum::routing::{get, post};
use axum::Router;

use crate::handlers::article_handlers::{download_article, extract_article};
use crate::handlers::service_handler::api_test;
use crate::state::AppState;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/extract-article", post(extract_article))
        .route("/download-article", post(download_article))
        .route("/test", get(api_test))
}
