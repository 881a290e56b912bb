//! Content-addressed blob storage: artifacts are stored under their content hash.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{Result, StoreError};

#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Writes `content` under `hash`. Writing an existing hash is a no-op.
    async fn put(&self, hash: &str, content: &str) -> Result<()>;

    /// `None` when no blob exists under `hash`.
    async fn get(&self, hash: &str) -> Result<Option<String>>;

    /// Returns whether a blob was removed.
    async fn delete(&self, hash: &str) -> Result<bool>;
}

fn check_hash(hash: &str) -> Result<()> {
    if hash.len() < 2 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StoreError::InvalidHash(hash.to_string()));
    }
    Ok(())
}

/// Blobs as files under a root directory, sharded by the first two hash characters:
/// `<root>/ab/abcdef...`.
#[derive(Debug, Clone)]
pub struct FsBlobBackend {
    root: PathBuf,
}

impl FsBlobBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, hash: &str) -> Result<PathBuf> {
        check_hash(hash)?;
        Ok(self.root.join(&hash[..2]).join(hash))
    }
}

fn blob_error(hash: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Blob {
        hash: hash.to_string(),
        source,
    }
}

#[async_trait]
impl BlobBackend for FsBlobBackend {
    async fn put(&self, hash: &str, content: &str) -> Result<()> {
        let path = self.path_for(hash)?;
        if tokio::fs::try_exists(&path).await.map_err(blob_error(hash))? {
            return Ok(());
        }
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
        tokio::fs::create_dir_all(&dir).await.map_err(blob_error(hash))?;

        // Each writer gets its own temp file, so readers never see a partial blob and
        // concurrent writers of the same hash do not trip over each other.
        let target = path.clone();
        let content = content.to_owned();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(content.as_bytes())?;
            match tmp.persist(&target) {
                Ok(_) => Ok(()),
                // Another writer stored the same content first.
                Err(_) if target.is_file() => Ok(()),
                Err(e) => Err(e.error),
            }
        })
        .await
        .map_err(std::io::Error::other)
        .and_then(|written| written)
        .map_err(blob_error(hash))?;
        tracing::debug!("Wrote blob {}", path.display());
        Ok(())
    }

    async fn get(&self, hash: &str) -> Result<Option<String>> {
        let path = self.path_for(hash)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(blob_error(hash)(e)),
        }
    }

    async fn delete(&self, hash: &str) -> Result<bool> {
        let path = self.path_for(hash)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(blob_error(hash)(e)),
        }
    }
}

/// Blobs in process memory.
#[derive(Default)]
pub struct MemoryBlobBackend {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryBlobBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Drops every blob while leaving hash records untouched elsewhere.
    pub async fn clear(&self) {
        self.blobs.write().await.clear();
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    async fn put(&self, hash: &str, content: &str) -> Result<()> {
        check_hash(hash)?;
        self.blobs
            .write()
            .await
            .entry(hash.to_string())
            .or_insert_with(|| content.to_string());
        Ok(())
    }

    async fn get(&self, hash: &str) -> Result<Option<String>> {
        Ok(self.blobs.read().await.get(hash).cloned())
    }

    async fn delete(&self, hash: &str) -> Result<bool> {
        Ok(self.blobs.write().await.remove(hash).is_some())
    }
}
