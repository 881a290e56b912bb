use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use worker_ltx::GenerationService;

pub mod admin;
pub mod artifacts;
pub mod logging_middleware;

pub type AppState = Arc<GenerationService>;

pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "healthy")
}

//
// Router
//

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Generated artifacts
        .route("/llms.txt", get(artifacts::get_llms_txt))
        .route("/llms-full.txt", get(artifacts::get_llms_full_txt))
        // Admin + webhook
        .route("/api/generate", post(admin::post_generate))
        .route("/api/publish", post(admin::post_publish))
        .route("/api/cache", delete(admin::delete_cache))
        .route("/api/artifacts", get(admin::get_artifacts))
        .with_state(service)
        // Custom route access logging
        .layer(middleware::from_fn(logging_middleware::log_route_access))
        // Tracing middleware
        .layer(TraceLayer::new_for_http())
}
