use crate::server::{handlers, types::AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub fn create_router(state: AppState, cors: bool) -> Router {
    let upload_limit = state.extraction.max_upload_bytes;
    let state = Arc::new(state);

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_report))
        .route("/predict", post(handlers::predict))
        .route(
            "/extract",
            post(handlers::extract_text).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
