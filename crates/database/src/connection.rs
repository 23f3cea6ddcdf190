use crate::error::DbError;
use crate::memory::MemoryRepository;
use crate::repository::DbRepository;
use crate::store::StudentStore;
use configuration::{DatabaseSettings, StoreBackend};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool is created eagerly so that an unreachable database fails process
/// startup instead of the first request.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let database_url = settings.connection_url().ok_or_else(|| {
        DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string())
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations so the `students` table and its indexes exist.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Opens the record store selected by `settings.backend`.
///
/// For PostgreSQL this connects, migrates and wraps the pool; the in-memory
/// backend starts empty.
pub async fn open_store(settings: &DatabaseSettings) -> Result<Arc<dyn StudentStore>, DbError> {
    match settings.backend {
        StoreBackend::Postgres => {
            let pool = connect(settings).await?;
            run_migrations(&pool).await?;
            tracing::info!("Connected to PostgreSQL and applied migrations.");
            Ok(Arc::new(DbRepository::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store. Records will not survive a restart.");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}
