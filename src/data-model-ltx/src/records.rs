//! The hash-record table: (artifact, site, dimension hash) -> content hash.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tokio::sync::RwLock;

use crate::db::DbPool;
use crate::errors::Result;
use crate::models::{ArtifactHash, ArtifactName};
use crate::schema::artifact_hash;

/// Storage of hash records. At most one record exists per (artifact, site, dimension hash).
#[async_trait]
pub trait HashRecords: Send + Sync {
    async fn find(&self, artifact: ArtifactName, site: &str, dimension_hash: &str) -> Result<Option<ArtifactHash>>;

    /// Inserts the record, or updates `content_hash` and `updated_at` of the existing one.
    async fn upsert(
        &self,
        artifact: ArtifactName,
        site: &str,
        dimension_hash: &str,
        content_hash: &str,
    ) -> Result<ArtifactHash>;

    /// Removes every record, returning what was removed.
    async fn delete_all(&self) -> Result<Vec<ArtifactHash>>;

    async fn delete_site(&self, site: &str) -> Result<Vec<ArtifactHash>>;

    /// All records ordered by site, artifact and dimension hash.
    async fn list(&self) -> Result<Vec<ArtifactHash>>;
}

/// Records in the `artifact_hash` Postgres table.
#[derive(Clone)]
pub struct PgHashRecords {
    pool: DbPool,
}

impl PgHashRecords {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HashRecords for PgHashRecords {
    async fn find(&self, artifact: ArtifactName, site: &str, dimension_hash: &str) -> Result<Option<ArtifactHash>> {
        let mut conn = self.pool.get().await?;
        let record = artifact_hash::table
            .filter(artifact_hash::artifact_name.eq(artifact))
            .filter(artifact_hash::site_id.eq(site))
            .filter(artifact_hash::dimension_hash.eq(dimension_hash))
            .select(ArtifactHash::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(record)
    }

    async fn upsert(
        &self,
        artifact: ArtifactName,
        site: &str,
        dimension_hash: &str,
        content_hash: &str,
    ) -> Result<ArtifactHash> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now();
        let row = ArtifactHash {
            artifact_name: artifact,
            site_id: site.to_string(),
            dimension_hash: dimension_hash.to_string(),
            content_hash: content_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        let stored = diesel::insert_into(artifact_hash::table)
            .values(&row)
            .on_conflict((
                artifact_hash::artifact_name,
                artifact_hash::site_id,
                artifact_hash::dimension_hash,
            ))
            .do_update()
            .set((
                artifact_hash::content_hash.eq(excluded(artifact_hash::content_hash)),
                artifact_hash::updated_at.eq(excluded(artifact_hash::updated_at)),
            ))
            .returning(ArtifactHash::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(stored)
    }

    async fn delete_all(&self) -> Result<Vec<ArtifactHash>> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(artifact_hash::table)
            .returning(ArtifactHash::as_returning())
            .get_results(&mut conn)
            .await?;
        Ok(deleted)
    }

    async fn delete_site(&self, site: &str) -> Result<Vec<ArtifactHash>> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(artifact_hash::table.filter(artifact_hash::site_id.eq(site)))
            .returning(ArtifactHash::as_returning())
            .get_results(&mut conn)
            .await?;
        Ok(deleted)
    }

    async fn list(&self) -> Result<Vec<ArtifactHash>> {
        let mut conn = self.pool.get().await?;
        let mut records = artifact_hash::table
            .select(ArtifactHash::as_select())
            .load(&mut conn)
            .await?;
        records.sort_by(|a, b| record_order(a).cmp(&record_order(b)));
        Ok(records)
    }
}

fn record_order(r: &ArtifactHash) -> (&str, ArtifactName, &str) {
    (r.site_id.as_str(), r.artifact_name, r.dimension_hash.as_str())
}

type RecordKey = (String, ArtifactName, String);

/// Records held in process memory. Used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryHashRecords {
    records: RwLock<BTreeMap<RecordKey, ArtifactHash>>,
}

impl MemoryHashRecords {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(artifact: ArtifactName, site: &str, dimension_hash: &str) -> RecordKey {
    (site.to_string(), artifact, dimension_hash.to_string())
}

#[async_trait]
impl HashRecords for MemoryHashRecords {
    async fn find(&self, artifact: ArtifactName, site: &str, dimension_hash: &str) -> Result<Option<ArtifactHash>> {
        let records = self.records.read().await;
        Ok(records.get(&key(artifact, site, dimension_hash)).cloned())
    }

    async fn upsert(
        &self,
        artifact: ArtifactName,
        site: &str,
        dimension_hash: &str,
        content_hash: &str,
    ) -> Result<ArtifactHash> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let record = records
            .entry(key(artifact, site, dimension_hash))
            .and_modify(|r| {
                r.content_hash = content_hash.to_string();
                r.updated_at = now;
            })
            .or_insert_with(|| ArtifactHash {
                artifact_name: artifact,
                site_id: site.to_string(),
                dimension_hash: dimension_hash.to_string(),
                content_hash: content_hash.to_string(),
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn delete_all(&self) -> Result<Vec<ArtifactHash>> {
        let mut records = self.records.write().await;
        Ok(std::mem::take(&mut *records).into_values().collect())
    }

    async fn delete_site(&self, site: &str) -> Result<Vec<ArtifactHash>> {
        let mut records = self.records.write().await;
        let (deleted, kept): (BTreeMap<_, _>, BTreeMap<_, _>) =
            std::mem::take(&mut *records).into_iter().partition(|((s, _, _), _)| s == site);
        *records = kept;
        Ok(deleted.into_values().collect())
    }

    async fn list(&self) -> Result<Vec<ArtifactHash>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let records = MemoryHashRecords::new();
        let first = records.upsert(ArtifactName::Index, "acme", "all", "aaa").await.unwrap();
        let second = records.upsert(ArtifactName::Index, "acme", "all", "bbb").await.unwrap();

        assert_eq!(second.content_hash, "bbb");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(records.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_distinguishes_key_parts() {
        let records = MemoryHashRecords::new();
        records.upsert(ArtifactName::Index, "acme", "all", "aaa").await.unwrap();

        assert!(records.find(ArtifactName::Index, "acme", "all").await.unwrap().is_some());
        assert!(records.find(ArtifactName::Full, "acme", "all").await.unwrap().is_none());
        assert!(records.find(ArtifactName::Index, "other", "all").await.unwrap().is_none());
        assert!(records.find(ArtifactName::Index, "acme", "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_site_and_all() {
        let records = MemoryHashRecords::new();
        records.upsert(ArtifactName::Index, "acme", "all", "a").await.unwrap();
        records.upsert(ArtifactName::Full, "acme", "all", "b").await.unwrap();
        records.upsert(ArtifactName::Index, "blog", "all", "c").await.unwrap();

        let deleted = records.delete_site("acme").await.unwrap();
        assert_eq!(deleted.len(), 2);
        let left = records.list().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].site_id, "blog");

        assert_eq!(records.delete_all().await.unwrap().len(), 1);
        assert!(records.list().await.unwrap().is_empty());
    }
}
