use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::blob::{BlobBackend, FsBlobBackend, MemoryBlobBackend};
use crate::db::DbPool;
use crate::errors::Result;
use crate::models::{ArtifactHash, ArtifactName, DimensionKey, StoredArtifact, content_hash};
use crate::records::{HashRecords, MemoryHashRecords, PgHashRecords};

/// Generated artifacts addressed by content hash.
///
/// The record table points each (artifact, site, dimension) at a content hash; the blob backend holds
/// the content under that hash. Overwriting an artifact only moves the pointer, so earlier content
/// stays reachable through [`ArtifactStore::fetch_by_hash`] until its blob is deleted.
#[derive(Clone)]
pub struct ArtifactStore {
    records: Arc<dyn HashRecords>,
    blobs: Arc<dyn BlobBackend>,
}

impl ArtifactStore {
    pub fn new(records: Arc<dyn HashRecords>, blobs: Arc<dyn BlobBackend>) -> Self {
        Self { records, blobs }
    }

    /// Records in Postgres, blobs under `blob_dir`.
    pub fn postgres(pool: DbPool, blob_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(PgHashRecords::new(pool)), Arc::new(FsBlobBackend::new(blob_dir)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryHashRecords::new()), Arc::new(MemoryBlobBackend::new()))
    }

    pub async fn store(
        &self,
        artifact: ArtifactName,
        content: &str,
        site: &str,
        dimension: &DimensionKey,
    ) -> Result<StoredArtifact> {
        let dimension_hash = dimension.hash();
        let hash = content_hash(content);
        let key = dimension.artifact_key(artifact, site);

        let previous = self.records.find(artifact, site, &dimension_hash).await?;
        let changed = previous.is_none_or(|p| p.content_hash != hash);

        self.blobs.put(&hash, content).await.inspect_err(|e| {
            tracing::error!("[{}] Failed to write blob {}: {}", key, hash, e);
        })?;
        self.records
            .upsert(artifact, site, &dimension_hash, &hash)
            .await
            .inspect_err(|e| tracing::error!("[{}] Failed to record hash {}: {}", key, hash, e))?;

        if changed {
            tracing::info!("[{}] Stored {} bytes as {}", key, content.len(), hash);
        } else {
            tracing::debug!("[{}] Unchanged ({})", key, hash);
        }

        Ok(StoredArtifact {
            artifact_name: artifact,
            site_id: site.to_string(),
            dimension: dimension.clone(),
            dimension_hash,
            content_hash: hash,
            key,
            changed,
        })
    }

    /// Content last stored for the key. A recorded hash without a blob is a miss.
    pub async fn fetch(&self, artifact: ArtifactName, site: &str, dimension: &DimensionKey) -> Result<Option<String>> {
        let Some(hash) = self.content_hash(artifact, site, dimension).await? else {
            return Ok(None);
        };
        let content = self.blobs.get(&hash).await?;
        if content.is_none() {
            tracing::warn!(
                "[{}] Recorded hash {} has no blob, treating as missing",
                dimension.artifact_key(artifact, site),
                hash
            );
        }
        Ok(content)
    }

    pub async fn fetch_by_hash(&self, hash: &str) -> Result<Option<String>> {
        self.blobs.get(hash).await
    }

    pub async fn content_hash(
        &self,
        artifact: ArtifactName,
        site: &str,
        dimension: &DimensionKey,
    ) -> Result<Option<String>> {
        let record = self.records.find(artifact, site, &dimension.hash()).await?;
        Ok(record.map(|r| r.content_hash))
    }

    /// Deletes every record, then (best effort) the blobs they pointed at. Returns the number of records.
    pub async fn clear_all(&self) -> Result<usize> {
        let deleted = self.records.delete_all().await?;
        let hashes: BTreeSet<&str> = deleted.iter().map(|r| r.content_hash.as_str()).collect();
        for hash in hashes {
            if let Err(e) = self.blobs.delete(hash).await {
                tracing::warn!("Failed to delete blob {}: {}", hash, e);
            }
        }
        tracing::info!("Cleared {} artifact records", deleted.len());
        Ok(deleted.len())
    }

    /// Deletes the site's records. Blobs stay: other sites may share them.
    pub async fn invalidate_site(&self, site: &str) -> Result<usize> {
        let deleted = self.records.delete_site(site).await?;
        tracing::info!("[site: {}] Invalidated {} artifact records", site, deleted.len());
        Ok(deleted.len())
    }

    pub async fn records(&self) -> Result<Vec<ArtifactHash>> {
        self.records.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_then_fetch() {
        let store = ArtifactStore::in_memory();
        let content = "# Acme\n\n> Everything for the coyote\n";
        let stored = store
            .store(ArtifactName::Index, content, "acme", &DimensionKey::All)
            .await
            .unwrap();

        assert_eq!(stored.key, "acme-all-index");
        assert_eq!(stored.content_hash, content_hash(content));
        assert!(stored.changed);
        assert_eq!(
            store.fetch(ArtifactName::Index, "acme", &DimensionKey::All).await.unwrap().as_deref(),
            Some(content)
        );
        assert_eq!(store.fetch(ArtifactName::Full, "acme", &DimensionKey::All).await.unwrap(), None);
        assert_eq!(
            store
                .fetch(ArtifactName::Index, "acme", &DimensionKey::language("en"))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_store_is_idempotent() {
        let store = ArtifactStore::in_memory();
        let dim = DimensionKey::language("en");
        let first = store.store(ArtifactName::Full, "same", "acme", &dim).await.unwrap();
        let second = store.store(ArtifactName::Full, "same", "acme", &dim).await.unwrap();

        assert!(!second.changed);
        assert_eq!(first.content_hash, second.content_hash);
        let records = store.records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content_hash, first.content_hash);
    }

    #[tokio::test]
    async fn test_overwrite_moves_pointer_and_keeps_old_blob() {
        let store = ArtifactStore::in_memory();
        let old = store.store(ArtifactName::Index, "v1", "acme", &DimensionKey::All).await.unwrap();
        let new = store.store(ArtifactName::Index, "v2", "acme", &DimensionKey::All).await.unwrap();

        assert!(new.changed);
        assert_ne!(old.content_hash, new.content_hash);
        assert_eq!(
            store.content_hash(ArtifactName::Index, "acme", &DimensionKey::All).await.unwrap(),
            Some(new.content_hash.clone())
        );
        assert_eq!(store.fetch_by_hash(&old.content_hash).await.unwrap().as_deref(), Some("v1"));
        assert_eq!(store.fetch_by_hash(&new.content_hash).await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_orphaned_hash_is_a_miss() {
        let blobs = Arc::new(MemoryBlobBackend::new());
        let store = ArtifactStore::new(Arc::new(MemoryHashRecords::new()), blobs.clone());
        store.store(ArtifactName::Index, "content", "acme", &DimensionKey::All).await.unwrap();

        blobs.clear().await;

        assert!(
            store
                .content_hash(ArtifactName::Index, "acme", &DimensionKey::All)
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(store.fetch(ArtifactName::Index, "acme", &DimensionKey::All).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_all_and_invalidate_site() {
        let blobs = Arc::new(MemoryBlobBackend::new());
        let store = ArtifactStore::new(Arc::new(MemoryHashRecords::new()), blobs.clone());
        store.store(ArtifactName::Index, "a", "acme", &DimensionKey::All).await.unwrap();
        store.store(ArtifactName::Full, "b", "acme", &DimensionKey::All).await.unwrap();
        store.store(ArtifactName::Index, "a", "blog", &DimensionKey::All).await.unwrap();

        assert_eq!(store.invalidate_site("acme").await.unwrap(), 2);
        assert_eq!(store.invalidate_site("acme").await.unwrap(), 0);
        assert_eq!(
            store.fetch(ArtifactName::Index, "blog", &DimensionKey::All).await.unwrap().as_deref(),
            Some("a")
        );

        assert_eq!(store.clear_all().await.unwrap(), 1);
        assert!(store.records().await.unwrap().is_empty());
        // "b" is no longer recorded, so clearing leaves it behind.
        assert_eq!(blobs.len().await, 1);
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(Arc::new(MemoryHashRecords::new()), Arc::new(FsBlobBackend::new(dir.path())));
        let content = "Ünïcödé ✓\n";
        store
            .store(ArtifactName::Full, content, "acme", &DimensionKey::language("de"))
            .await
            .unwrap();
        let fetched = store
            .fetch(ArtifactName::Full, "acme", &DimensionKey::language("de"))
            .await
            .unwrap();
        assert_eq!(fetched.as_deref().map(str::as_bytes), Some(content.as_bytes()));
    }
}
