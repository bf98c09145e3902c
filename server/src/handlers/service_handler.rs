use axum::response::Html;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// GET /api/test
pub async fn api_test() -> Json<Value> {
    Json(json!({
        "message": "Backend is running!",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html("<h1>Article Downloader API</h1><p>Try POST to /api/extract-article</p>")
}
