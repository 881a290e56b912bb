use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::deadpool::Pool;

pub type PoolError = deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>;

/// Shared Postgres pool behind the artifact hash table.
pub type DbPool = Pool<AsyncPgConnection>;

pub const DEFAULT_POOL_SIZE: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionPoolError {
    #[error("Failed to build artifact hash pool: {0}")]
    Build(#[from] deadpool::managed::BuildError),
    #[error("Artifact hash database unreachable: {0}")]
    Unreachable(#[from] PoolError),
}

/// Builds a pool of at most `max_size` connections and checks one out,
/// so an unreachable database fails at startup instead of on the first request.
pub async fn establish_connection_pool(database_url: &str, max_size: usize) -> Result<DbPool, ConnectionPoolError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(manager).max_size(max_size.max(1)).build()?;

    drop(pool.get().await?);
    tracing::info!("Connected to artifact hash database (pool size {})", max_size.max(1));

    Ok(pool)
}
