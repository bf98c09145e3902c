pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use std::path::Path;

use axum::http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use handlers::service_handler::index;
use routes::article::article_routes;
use state::AppState;

/// Full HTTP surface: API under `/api`, landing page at `/`, static files otherwise.
pub fn app(state: AppState, public_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
        ]);

    Router::new()
        .route("/", get(index))
        .nest("/api", article_routes())
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
