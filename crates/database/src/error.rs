use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection is not configured: {0}")]
    ConnectionConfigError(String),

    #[error("Trade ledger query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Trade ledger migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("A fetched row failed domain validation: {0}")]
    InvalidRow(#[from] core_types::CoreError),
}
