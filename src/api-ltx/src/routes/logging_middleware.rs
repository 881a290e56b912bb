use axum::{
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Middleware that logs each route access with its result
pub async fn log_route_access(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();
    if status.is_server_error() {
        tracing::error!(%method, %path, %host, status = status.as_u16(), %duration_ms);
    } else if status.is_client_error() && status != StatusCode::NOT_FOUND {
        tracing::warn!(%method, %path, %host, status = status.as_u16(), %duration_ms);
    } else {
        tracing::info!(%method, %path, %host, status = status.as_u16(), %duration_ms);
    }

    response
}
