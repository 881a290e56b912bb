//! Generation service: runs the generator over the current content and keeps the artifact store current.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use core_ltx::{ContentSnapshot, ContentSource, GenerateOptions, Generator, LanguageDimension, RequestInfo, Site, StaticSource};
use data_model_ltx::{ArtifactHash, ArtifactName, ArtifactStore, DimensionKey, StoredArtifact};

use crate::errors::Error;

/// Workspace whose publish events trigger regeneration.
pub const LIVE_WORKSPACE: &str = "live";

/// Everything a `generate_all` run stored.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generated_at: DateTime<Utc>,
    pub sites: Vec<String>,
    pub artifacts: Vec<StoredArtifact>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub site: String,
    /// Hash records dropped before regenerating.
    pub invalidated: usize,
    pub artifacts: Vec<StoredArtifact>,
}

pub struct GenerationService {
    generator: Generator,
    source: Arc<dyn ContentSource>,
    snapshot: RwLock<Arc<ContentSnapshot>>,
    store: ArtifactStore,
}

impl GenerationService {
    /// Loads the initial content from `source`.
    pub fn new(generator: Generator, source: Arc<dyn ContentSource>, store: ArtifactStore) -> Result<Self, Error> {
        let snapshot = source.load()?;
        tracing::info!("Loaded content with {} site(s)", snapshot.sites.len());
        Ok(Self {
            generator,
            source,
            snapshot: RwLock::new(Arc::new(snapshot)),
            store,
        })
    }

    /// Service over fixed content. Reloading keeps the same content.
    pub fn from_snapshot(generator: Generator, snapshot: ContentSnapshot, store: ArtifactStore) -> Self {
        Self {
            generator,
            source: Arc::new(StaticSource(snapshot.clone())),
            snapshot: RwLock::new(Arc::new(snapshot)),
            store,
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub async fn snapshot(&self) -> Arc<ContentSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Re-reads the content source and swaps in the new snapshot.
    pub async fn reload(&self) -> Result<Arc<ContentSnapshot>, Error> {
        let snapshot = Arc::new(self.source.load()?);
        *self.snapshot.write().await = snapshot.clone();
        tracing::info!("Reloaded content with {} site(s)", snapshot.sites.len());
        Ok(snapshot)
    }

    /// Dimension keys generated per site, with the languages each covers: the consolidated
    /// `all` document (when enabled) followed by one document per language.
    pub fn dimensions(&self) -> Vec<(DimensionKey, &[LanguageDimension])> {
        let languages = self.generator.languages();
        let mut dimensions = Vec::with_capacity(languages.len() + 1);
        if self.generator.config().consolidate_languages && !languages.is_empty() {
            dimensions.push((DimensionKey::All, languages));
        }
        for language in languages {
            dimensions.push((DimensionKey::language(&language.id), std::slice::from_ref(language)));
        }
        dimensions
    }

    /// Dimension served for a request: `all` when languages are consolidated, else the detected language.
    pub fn dimension_for(&self, request: &RequestInfo) -> DimensionKey {
        if self.generator.config().consolidate_languages {
            DimensionKey::All
        } else {
            DimensionKey::language(&self.generator.detect_language(request))
        }
    }

    /// Site serving `host`, else the first site.
    pub async fn site_for_host(&self, host: Option<&str>) -> Option<String> {
        let snapshot = self.snapshot().await;
        host.and_then(|h| snapshot.site_for_host(h))
            .or_else(|| snapshot.sites.first())
            .map(|s| s.id.clone())
    }

    async fn generate_site_in(
        &self,
        snapshot: &ContentSnapshot,
        site: &Site,
        options: &GenerateOptions,
    ) -> Result<Vec<StoredArtifact>, Error> {
        let mut stored = Vec::new();
        for (dimension, languages) in self.dimensions() {
            let docs = self.generator.generate(snapshot, site, languages, options);
            stored.push(self.store.store(ArtifactName::Index, &docs.index, &site.id, &dimension).await?);
            stored.push(self.store.store(ArtifactName::Full, &docs.full, &site.id, &dimension).await?);
        }
        Ok(stored)
    }

    /// Regenerates both artifacts of every site for every dimension. A storage failure aborts the run;
    /// sites already stored stay stored.
    pub async fn generate_all(&self, host_override: Option<String>) -> Result<GenerationReport, Error> {
        let snapshot = self.snapshot().await;
        if snapshot.sites.is_empty() {
            return Err(Error::NoSites);
        }
        let options = GenerateOptions {
            host_override,
            ..Default::default()
        };

        let mut report = GenerationReport {
            generated_at: options.generated_at,
            sites: Vec::new(),
            artifacts: Vec::new(),
        };
        for site in &snapshot.sites {
            let stored = self
                .generate_site_in(&snapshot, site, &options)
                .await
                .inspect_err(|e| tracing::error!("[site: {}] Generation aborted: {}", site.id, e))?;
            tracing::info!(
                "[site: {}] Generated {} artifact(s), {} changed",
                site.id,
                stored.len(),
                stored.iter().filter(|a| a.changed).count()
            );
            report.sites.push(site.id.clone());
            report.artifacts.extend(stored);
        }
        Ok(report)
    }

    pub async fn generate_site(&self, site_id: &str, host_override: Option<String>) -> Result<Vec<StoredArtifact>, Error> {
        let snapshot = self.snapshot().await;
        let site = snapshot
            .site(site_id)
            .ok_or_else(|| Error::UnknownSite(site_id.to_string()))?;
        let options = GenerateOptions {
            host_override,
            ..Default::default()
        };
        self.generate_site_in(&snapshot, site, &options).await
    }

    pub async fn get_content(
        &self,
        artifact: ArtifactName,
        site: &str,
        dimension: &DimensionKey,
    ) -> Result<Option<String>, Error> {
        Ok(self.store.fetch(artifact, site, dimension).await?)
    }

    pub async fn content_hash(
        &self,
        artifact: ArtifactName,
        site: &str,
        dimension: &DimensionKey,
    ) -> Result<Option<String>, Error> {
        Ok(self.store.content_hash(artifact, site, dimension).await?)
    }

    /// Stored content, regenerating the site first when nothing is stored or `force` is set.
    /// `None` when even a fresh generation has nothing for `dimension`.
    pub async fn get_or_generate(
        &self,
        artifact: ArtifactName,
        site: &str,
        dimension: &DimensionKey,
        force: bool,
        host_override: Option<String>,
    ) -> Result<Option<String>, Error> {
        if !self.dimensions().iter().any(|(generated, _)| generated == dimension) {
            tracing::debug!("[{}] Dimension is never generated", dimension.artifact_key(artifact, site));
            return Ok(None);
        }
        if !force {
            if let Some(content) = self.get_content(artifact, site, dimension).await? {
                return Ok(Some(content));
            }
        }
        tracing::info!(
            "[{}] {}, generating site",
            dimension.artifact_key(artifact, site),
            if force { "Forced" } else { "Not stored" }
        );
        self.generate_site(site, host_override).await?;
        self.get_content(artifact, site, dimension).await
    }

    /// Publish hook. Only `live` publishes count: content is reloaded, the site's artifacts invalidated
    /// and regenerated. Returns `None` for other workspaces.
    pub async fn on_publish(&self, site_id: &str, workspace: &str) -> Result<Option<PublishOutcome>, Error> {
        if workspace != LIVE_WORKSPACE {
            tracing::debug!("[site: {}] Ignoring publish to workspace '{}'", site_id, workspace);
            return Ok(None);
        }

        let snapshot = self.reload().await?;
        let invalidated = self.store.invalidate_site(site_id).await?;
        let artifacts = match snapshot.site(site_id) {
            Some(site) => {
                self.generate_site_in(&snapshot, site, &GenerateOptions::default())
                    .await?
            }
            None => {
                tracing::warn!("[site: {}] Published site is not in the content, nothing regenerated", site_id);
                Vec::new()
            }
        };
        Ok(Some(PublishOutcome {
            site: site_id.to_string(),
            invalidated,
            artifacts,
        }))
    }

    pub async fn clear_all(&self) -> Result<usize, Error> {
        Ok(self.store.clear_all().await?)
    }

    pub async fn records(&self) -> Result<Vec<ArtifactHash>, Error> {
        Ok(self.store.records().await?)
    }
}
