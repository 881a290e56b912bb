use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[derive(Debug, Default, Serialize)]
struct GeneratePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ArtifactEntry {
    changed: bool,
}

#[derive(Debug, Deserialize)]
struct GenerationReport {
    generated_at: DateTime<Utc>,
    sites: Vec<String>,
    artifacts: Vec<ArtifactEntry>,
}

/// What one regeneration run did, as reported by the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub generated_at: DateTime<Utc>,
    pub sites: Vec<String>,
    pub artifacts: usize,
    /// Artifacts whose content hash differs from the previously stored one.
    pub changed: usize,
}

impl From<GenerationReport> for GenerationSummary {
    fn from(report: GenerationReport) -> Self {
        GenerationSummary {
            generated_at: report.generated_at,
            sites: report.sites,
            artifacts: report.artifacts.len(),
            changed: report.artifacts.iter().filter(|a| a.changed).count(),
        }
    }
}

/// Sends POST /api/generate, regenerating every site. `host` overrides the configured domains.
pub async fn trigger_generation(
    client: &reqwest::Client,
    api_base_url: &str,
    host: Option<&str>,
) -> Result<GenerationSummary, Error> {
    let endpoint = format!("{}/api/generate", api_base_url.trim_end_matches('/'));
    tracing::debug!("POST {}", endpoint);

    let response = client.post(&endpoint).json(&GeneratePayload { host }).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let report: GenerationReport = response.json().await?;
    Ok(report.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_changed_artifacts() {
        let report: GenerationReport = serde_json::from_str(
            r#"{
                "generated_at": "2026-01-02T03:04:05Z",
                "sites": ["acme"],
                "artifacts": [
                    { "key": "acme-all-index", "changed": true },
                    { "key": "acme-all-full", "changed": false }
                ]
            }"#,
        )
        .unwrap();
        let summary = GenerationSummary::from(report);
        assert_eq!(summary.sites, vec!["acme"]);
        assert_eq!(summary.artifacts, 2);
        assert_eq!(summary.changed, 1);
    }

    #[test]
    fn test_payload_omits_missing_host() {
        assert_eq!(serde_json::to_string(&GeneratePayload::default()).unwrap(), "{}");
        assert_eq!(
            serde_json::to_string(&GeneratePayload { host: Some("acme.test") }).unwrap(),
            r#"{"host":"acme.test"}"#
        );
    }
}
