use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

use data_model_ltx::ArtifactHash;
use worker_ltx::{LIVE_WORKSPACE, PublishOutcome};

// API Payload Types

/// Query string of `GET /llms.txt` and `GET /llms-full.txt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactQuery {
    /// Regenerate the site before serving.
    #[serde(default)]
    pub force: bool,
}

/// Input payload for POST /api/generate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratePayload {
    /// Host (or origin) for absolute URLs instead of the configured domains.
    #[serde(default)]
    pub host: Option<String>,
}

/// Input payload for POST /api/publish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishPayload {
    pub site: String,
    #[serde(default = "default_workspace")]
    pub workspace: String,
}

fn default_workspace() -> String {
    LIVE_WORKSPACE.to_string()
}

/// Response payload for POST /api/publish
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishResponse {
    Regenerated(PublishOutcome),
    Ignored { site: String, workspace: String },
}

/// Response payload for DELETE /api/cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

/// Response payload for GET /api/artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactListResponse {
    pub items: Vec<ArtifactHash>,
}

// API Error Types

/// Error for GET /llms.txt and GET /llms-full.txt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum GetArtifactError {
    /// No site serves the request's host and there is no site to fall back to.
    #[serde(rename = "no_site")]
    NoSite,
    /// Generation produced nothing for the requested dimension.
    #[serde(rename = "not_generated")]
    NotGenerated,
    /// Unknown error occurred
    #[serde(rename = "unknown")]
    Unknown(String),
}

/// Error for POST /api/generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum GenerateError {
    /// The content has no sites.
    #[serde(rename = "no_sites")]
    NoSites,
    /// Unknown error occurred
    #[serde(rename = "unknown")]
    Unknown(String),
}

/// Error for POST /api/publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum PublishError {
    /// The payload names no site.
    #[serde(rename = "missing_site")]
    MissingSite,
    /// Unknown error occurred
    #[serde(rename = "unknown")]
    Unknown(String),
}

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Internal error: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": self.0.to_string()
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

macro_rules! from_error {
    ($lib_err:path, $err_type:tt) => {
        /// Converts a `$lib_err` into an `$err_type::Unknown`.
        impl From<$lib_err> for $err_type {
            fn from(e: $lib_err) -> Self {
                $err_type::Unknown(e.to_string())
            }
        }
    };
}

// GetArtifactError

impl IntoResponse for GetArtifactError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            GetArtifactError::NoSite | GetArtifactError::NotGenerated => StatusCode::NOT_FOUND,
            GetArtifactError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

impl From<worker_ltx::Error> for GetArtifactError {
    fn from(err: worker_ltx::Error) -> Self {
        match err {
            worker_ltx::Error::NoSites | worker_ltx::Error::UnknownSite(_) => GetArtifactError::NoSite,
            _ => GetArtifactError::Unknown(err.to_string()),
        }
    }
}

// GenerateError

impl IntoResponse for GenerateError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            GenerateError::NoSites => StatusCode::NOT_FOUND,
            GenerateError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

impl From<worker_ltx::Error> for GenerateError {
    fn from(err: worker_ltx::Error) -> Self {
        match err {
            worker_ltx::Error::NoSites => GenerateError::NoSites,
            _ => GenerateError::Unknown(err.to_string()),
        }
    }
}

// PublishError

impl IntoResponse for PublishError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            PublishError::MissingSite => StatusCode::BAD_REQUEST,
            PublishError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

from_error!(worker_ltx::Error, PublishError);
