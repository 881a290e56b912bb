use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri, header},
    response::{IntoResponse, Response},
};

use core_ltx::RequestInfo;
use data_model_ltx::ArtifactName;

use super::AppState;
use crate::models::{ArtifactQuery, GetArtifactError};

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// GET /llms.txt - The index document of the site serving the request's host
pub async fn get_llms_txt(
    State(service): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<ArtifactQuery>,
) -> Result<Response, GetArtifactError> {
    serve(ArtifactName::Index, service, &uri, &headers, query).await
}

/// GET /llms-full.txt - The full-content document of the site serving the request's host
pub async fn get_llms_full_txt(
    State(service): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<ArtifactQuery>,
) -> Result<Response, GetArtifactError> {
    serve(ArtifactName::Full, service, &uri, &headers, query).await
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Site by `Host` (else the first site), dimension by configuration and request, generated on a miss.
async fn serve(
    artifact: ArtifactName,
    service: AppState,
    uri: &Uri,
    headers: &HeaderMap,
    query: ArtifactQuery,
) -> Result<Response, GetArtifactError> {
    let host = header_str(headers, header::HOST);
    let mut request = RequestInfo::from_path(uri.path());
    if let Some(host) = host {
        request = request.host(host);
    }
    if let Some(accept_language) = header_str(headers, header::ACCEPT_LANGUAGE) {
        request = request.accept_language(accept_language);
    }

    let site = service.site_for_host(host).await.ok_or(GetArtifactError::NoSite)?;
    let dimension = service.dimension_for(&request);
    tracing::debug!("[{}] Serving {} for host {:?}", site, artifact.file_name(), host);

    let content = service
        .get_or_generate(artifact, &site, &dimension, query.force, None)
        .await?
        .ok_or(GetArtifactError::NotGenerated)?;

    let max_age = service.generator().config().cache_max_age;
    Ok((
        [
            (header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE.to_string()),
            (header::CACHE_CONTROL, format!("public, max-age={}", max_age)),
        ],
        content,
    )
        .into_response())
}
