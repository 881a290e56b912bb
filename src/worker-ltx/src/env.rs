use std::path::Path;
use std::sync::Arc;

use core_ltx::{Generator, JsonFileSource, LlmsConfig};
use data_model_ltx::db::{DEFAULT_POOL_SIZE, establish_connection_pool};
use data_model_ltx::{ArtifactStore, FsBlobBackend, MemoryHashRecords, StoreError};

use crate::errors::Error;
use crate::service::GenerationService;

/// Path of the generation rules (TOML).
pub const LLMS_CONFIG_VAR: &str = "LLMS_CONFIG";
/// Path of the content snapshot (JSON), re-read on every publish event.
pub const CONTENT_SNAPSHOT_VAR: &str = "CONTENT_SNAPSHOT";
/// Postgres URL of the hash-record table. Unset keeps records in memory.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Directory holding the artifact blobs.
pub const BLOB_DIR_VAR: &str = "BLOB_DIR";
/// Maximum number of Postgres connections.
pub const DATABASE_POOL_SIZE_VAR: &str = "DATABASE_POOL_SIZE";

const DEFAULT_BLOB_DIR: &str = "artifacts";

/// Builds the generation service from the process environment.
pub async fn service_from_env() -> Result<GenerationService, Error> {
    service_from(|name| std::env::var(name).ok()).await
}

/// Builds the generation service from `lookup`, which maps variable names to (non-empty) values.
pub async fn service_from<F>(lookup: F) -> Result<GenerationService, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let config_path = var(LLMS_CONFIG_VAR).ok_or(Error::MissingEnv(LLMS_CONFIG_VAR))?;
    let content_path = var(CONTENT_SNAPSHOT_VAR).ok_or(Error::MissingEnv(CONTENT_SNAPSHOT_VAR))?;
    let blob_dir = var(BLOB_DIR_VAR).unwrap_or_else(|| DEFAULT_BLOB_DIR.to_string());

    let generator = Generator::new(LlmsConfig::load(Path::new(&config_path))?);
    tracing::info!("Loaded generation rules from {}", config_path);

    let store = match var(DATABASE_URL_VAR) {
        Some(database_url) => {
            let pool_size = match var(DATABASE_POOL_SIZE_VAR) {
                Some(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidEnv(DATABASE_POOL_SIZE_VAR, raw))?,
                None => DEFAULT_POOL_SIZE,
            };
            let pool = establish_connection_pool(&database_url, pool_size)
                .await
                .map_err(StoreError::from)?;
            ArtifactStore::postgres(pool, &blob_dir)
        }
        None => {
            tracing::warn!("{} not set, artifact hashes are kept in memory", DATABASE_URL_VAR);
            ArtifactStore::new(Arc::new(MemoryHashRecords::new()), Arc::new(FsBlobBackend::new(&blob_dir)))
        }
    };
    tracing::info!("Artifact blobs stored under {}", blob_dir);

    GenerationService::new(generator, Arc::new(JsonFileSource::new(content_path)), store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use indoc::indoc;

    fn lookup(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |name: &str| vars.get(name).cloned()
    }

    #[tokio::test]
    async fn test_missing_config_var() {
        let err = service_from(lookup(HashMap::new())).await.err().unwrap();
        assert!(matches!(err, Error::MissingEnv(LLMS_CONFIG_VAR)));

        let vars = HashMap::from([(LLMS_CONFIG_VAR, "llms.toml".to_string()), (CONTENT_SNAPSHOT_VAR, " ".to_string())]);
        let err = service_from(lookup(vars)).await.err().unwrap();
        assert!(matches!(err, Error::MissingEnv(CONTENT_SNAPSHOT_VAR)));
    }

    #[tokio::test]
    async fn test_invalid_pool_size() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("llms.toml");
        std::fs::write(&config, "").unwrap();
        let vars = HashMap::from([
            (LLMS_CONFIG_VAR, config.display().to_string()),
            (CONTENT_SNAPSHOT_VAR, "content.json".to_string()),
            (DATABASE_URL_VAR, "postgres://localhost/llms".to_string()),
            (DATABASE_POOL_SIZE_VAR, "lots".to_string()),
        ]);
        let err = service_from(lookup(vars)).await.err().unwrap();
        assert!(matches!(err, Error::InvalidEnv(DATABASE_POOL_SIZE_VAR, ref v) if v == "lots"));
    }

    #[tokio::test]
    async fn test_service_without_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("llms.toml");
        let content = dir.path().join("content.json");
        std::fs::write(&config, "[[languages]]\nid = \"en\"\n").unwrap();
        std::fs::write(
            &content,
            indoc! {r#"
                { "sites": [ { "id": "acme", "name": "Acme", "domains": [{ "host": "acme.test" }],
                  "root": { "identifier": "root", "name": "acme", "type": "Homepage",
                            "variants": { "en": { "properties": { "title": "Acme" } } } } } ] }
            "#},
        )
        .unwrap();
        let blobs = dir.path().join("blobs");
        let vars = HashMap::from([
            (LLMS_CONFIG_VAR, config.display().to_string()),
            (CONTENT_SNAPSHOT_VAR, content.display().to_string()),
            (BLOB_DIR_VAR, blobs.display().to_string()),
        ]);

        let service = service_from(lookup(vars)).await.unwrap();
        let report = service.generate_all(None).await.unwrap();
        assert_eq!(report.sites, vec!["acme"]);
        assert!(blobs.is_dir());
    }
}
