use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use worker_ltx::GenerationReport;

use super::AppState;
use crate::models::{
    AppError, ArtifactListResponse, ClearResponse, GenerateError, GeneratePayload, PublishError, PublishPayload,
    PublishResponse,
};

/// POST /api/generate - Regenerate every artifact of every site
pub async fn post_generate(
    State(service): State<AppState>,
    Json(payload): Json<GeneratePayload>,
) -> Result<Json<GenerationReport>, GenerateError> {
    let report = service.generate_all(payload.host).await?;
    tracing::info!(
        "Generated {} artifact(s) for {} site(s)",
        report.artifacts.len(),
        report.sites.len()
    );
    Ok(Json(report))
}

/// POST /api/publish - Content publish webhook
///
/// Publishes to the live workspace invalidate and regenerate the site; other workspaces are acknowledged
/// and ignored.
pub async fn post_publish(
    State(service): State<AppState>,
    Json(payload): Json<PublishPayload>,
) -> Result<impl IntoResponse, PublishError> {
    let site = payload.site.trim();
    if site.is_empty() {
        return Err(PublishError::MissingSite);
    }
    match service.on_publish(site, &payload.workspace).await? {
        Some(outcome) => Ok((StatusCode::OK, Json(PublishResponse::Regenerated(outcome)))),
        None => Ok((
            StatusCode::ACCEPTED,
            Json(PublishResponse::Ignored {
                site: site.to_string(),
                workspace: payload.workspace,
            }),
        )),
    }
}

/// DELETE /api/cache - Drop every stored artifact
pub async fn delete_cache(State(service): State<AppState>) -> Result<Json<ClearResponse>, AppError> {
    let cleared = service.clear_all().await?;
    Ok(Json(ClearResponse { cleared }))
}

/// GET /api/artifacts - All hash records
pub async fn get_artifacts(State(service): State<AppState>) -> Result<Json<ArtifactListResponse>, AppError> {
    let items = service.records().await?;
    Ok(Json(ArtifactListResponse { items }))
}
