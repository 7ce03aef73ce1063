//! Database access for baro-api
//!
//! The API service never writes: connections are opened with SQLite
//! `mode=ro`, and the scores it serves are immutable once published.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to the database in read-only mode.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found: {}\nRun the ingestion pipeline first to populate it.",
            db_path.display()
        );
    }

    // mode=ro prevents any write; immutable is NOT set because the
    // ingestion pipeline may update the file while we serve from it
    let db_url = format!("sqlite://{}?mode=ro", db_path.display());

    let pool = SqlitePool::connect(&db_url)
        .await
        .context("Failed to connect to database in read-only mode")?;

    // Verify read-only by attempting a write (should fail)
    #[cfg(debug_assertions)]
    {
        let write_test = sqlx::query("CREATE TABLE _test_write (id INTEGER)")
            .execute(&pool)
            .await;
        if write_test.is_ok() {
            panic!("SAFETY VIOLATION: Database connection is not read-only!");
        }
    }

    Ok(pool)
}
