use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection is not configured: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A unique constraint rejected the write. `fields` holds camelCase field names.
    #[error("Duplicate value for {}", .fields.join(", "))]
    Duplicate { fields: Vec<String> },
}
