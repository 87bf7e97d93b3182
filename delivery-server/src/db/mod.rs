//! Database module
//!
//! SQLite connection pool, migrations and the per-table query functions.

pub mod accounts;
pub mod business_hours;
pub mod dashboard;
pub mod dishes;
pub mod orders;
pub mod restaurants;
pub mod reviews;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Open the pool (WAL, foreign keys, busy timeout) and apply migrations
pub async fn connect(database_url: &str) -> Result<SqlitePool, BoxError> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| format!("Invalid database URL: {e}"))?
        .create_if_missing(true)
        .synchronous(SqliteSynchronous::Normal)
        .pragma("foreign_keys", "ON")
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    // An in-memory database lives in a single connection
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };
    tracing::info!(in_memory, "Database connection established");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
