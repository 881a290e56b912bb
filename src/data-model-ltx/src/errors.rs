use crate::db::{ConnectionPoolError, PoolError};

/// Failures of the artifact store. Orphaned hashes are not errors: they read as a cache miss.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection could be checked out of the pool.
    #[error("Database pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Failed to connect to database: {0}")]
    Connection(#[from] ConnectionPoolError),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// The blob backend failed to read or write the blob stored under `hash`.
    #[error("Blob {hash}: {source}")]
    Blob {
        hash: String,
        #[source]
        source: std::io::Error,
    },

    /// Blob address that is not a hex content hash.
    #[error("Invalid content hash: '{0}'")]
    InvalidHash(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_error_names_hash() {
        let err = StoreError::Blob {
            hash: "ab12".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Blob ab12: denied");
        assert_eq!(StoreError::InvalidHash("../x".into()).to_string(), "Invalid content hash: '../x'");
    }
}
