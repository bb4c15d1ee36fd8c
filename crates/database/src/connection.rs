use crate::error::DbError;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

// Pool sizing for the dashboard workload: a handful of concurrent readers
// plus the seed path, no long-lived transactions.
const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Establishes a connection pool to the PostgreSQL trade ledger.
///
/// Reads `DATABASE_URL` from the environment (a `.env` file is honored when
/// present, but not required) and returns a pool that can be shared across
/// the entire application.
pub async fn connect() -> Result<PgPool, DbError> {
    // A missing .env file is fine; the variable may come from the real environment.
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| DbError::ConnectionConfigError("DATABASE_URL is not set".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&database_url)
        .await?;
    Ok(pool)
}

/// Applies any pending database migrations.
///
/// Called on startup so the schema is up-to-date wherever the binary runs.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
