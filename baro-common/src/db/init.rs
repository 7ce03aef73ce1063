//! Database initialization
//!
//! The API service itself opens the database read-only; this module is
//! the read-write path used by the ingestion pipeline and by tests to
//! create the schema. All statements are idempotent
//! (`CREATE TABLE IF NOT EXISTS`).

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (or create) the database file and ensure the schema exists.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL lets the read-only API service keep reading while the
    // ingestion pipeline writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema, for tests.
///
/// A single pooled connection that never retires: each connection to
/// `sqlite::memory:` is its own database, so the pool must hold exactly
/// one for the data to survive between queries.
pub async fn init_database_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables if missing
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_communities_table(pool).await?;
    create_bareme_table(pool).await?;
    create_marches_publics_table(pool).await?;
    create_subventions_table(pool).await?;
    create_elus_table(pool).await?;
    Ok(())
}

async fn create_communities_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS communities (
            siren TEXT PRIMARY KEY,
            nom TEXT NOT NULL,
            nom_recherche TEXT NOT NULL,
            type TEXT NOT NULL,
            population INTEGER,
            code_postal TEXT,
            latitude REAL,
            longitude REAL,
            mp_score TEXT,
            subventions_score TEXT
        )",
    )
    .execute(pool)
    .await?;

    // nom_recherche is the Unicode-lowercased copy of nom written by the
    // ingestion pipeline; SQLite LIKE only folds ASCII case, so prefix
    // search runs against this column
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_communities_nom_recherche
         ON communities(nom_recherche)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_communities_type ON communities(type)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_bareme_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS bareme (
            siren TEXT NOT NULL,
            annee INTEGER NOT NULL,
            mp_score TEXT,
            subventions_score TEXT,
            global_score TEXT,
            mp_publies_inf40k INTEGER,
            mp_publies_sup40k INTEGER,
            mp_champs_renseignes INTEGER,
            mp_delai_respecte INTEGER,
            subventions_detaillees REAL,
            budget_total REAL,
            PRIMARY KEY (siren, annee)
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_marches_publics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS marches_publics (
            id INTEGER PRIMARY KEY,
            acheteur_siren TEXT NOT NULL,
            objet TEXT NOT NULL,
            montant REAL NOT NULL,
            annee_notification INTEGER NOT NULL,
            code_cpv TEXT,
            titulaire TEXT,
            titulaire_siren TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_marches_acheteur
         ON marches_publics(acheteur_siren, annee_notification)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_subventions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS subventions (
            id INTEGER PRIMARY KEY,
            attribuant_siren TEXT NOT NULL,
            beneficiaire TEXT NOT NULL,
            objet TEXT,
            montant REAL NOT NULL,
            annee INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_subventions_attribuant
         ON subventions(attribuant_siren, annee)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_elus_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS elus (
            siren TEXT NOT NULL,
            nom TEXT NOT NULL,
            fonction TEXT NOT NULL,
            email TEXT
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
