pub mod blob;
pub mod db;
mod errors;
pub mod models;
pub mod records;
pub mod schema;
mod store;

pub use blob::{BlobBackend, FsBlobBackend, MemoryBlobBackend};
pub use errors::{Result, StoreError};
pub use models::{ArtifactHash, ArtifactName, DimensionKey, StoredArtifact, content_hash};
pub use records::{HashRecords, MemoryHashRecords, PgHashRecords};
pub use store::ArtifactStore;
