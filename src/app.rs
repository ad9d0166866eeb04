use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{config, handlers, state::AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/info/:code", get(handlers::share_info))
        .route("/download/:code", get(handlers::download_archive))
        .route("/download/:code/file/:index", get(handlers::download_by_index))
        .route("/download/:code/:filename", get(handlers::download_by_name))
        .route("/storage", get(handlers::storage_status))
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(config::MAX_UPLOAD_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
