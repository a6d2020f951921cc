//! Database initialization
//!
//! Opens (or creates) the SQLite database and applies the schema. Every
//! binary calls `init_database` exactly once at startup; the statements are
//! idempotent, so a fresh file and an existing one take the same path. There
//! is no runtime re-registration check anywhere else.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize the database connection pool and create tables if needed.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers while the importer writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_songs_table(&pool).await?;
    create_requests_table(&pool).await?;

    Ok(pool)
}

/// Create the song catalog table and its indexes.
///
/// The unique index on `(artist_norm, title_norm)` is the sole duplicate
/// guard for the importer's upserts. Style lists are JSON arrays in TEXT,
/// queried with `json_each`.
pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id TEXT PRIMARY KEY,
            artist TEXT NOT NULL,
            title TEXT NOT NULL,
            styles TEXT NOT NULL DEFAULT '[]',
            artist_norm TEXT NOT NULL,
            title_norm TEXT NOT NULL,
            styles_norm TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_songs_artist_title_norm
         ON songs (artist_norm, title_norm)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_artist_norm ON songs (artist_norm)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_title_norm ON songs (title_norm)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the request queue table and its indexes.
///
/// Enum columns carry CHECK constraints as a backstop; the application layer
/// coerces input to valid members before any insert.
pub async fn create_requests_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS requests (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            artist TEXT NOT NULL,
            title TEXT NOT NULL,
            notes TEXT,
            source TEXT NOT NULL DEFAULT 'public'
                CHECK (source IN ('public', 'quick')),
            performer TEXT NOT NULL DEFAULT 'guest'
                CHECK (performer IN ('guest', 'host')),
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'on_stage', 'done', 'no_show')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_requests_created_at ON requests (created_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_requests_status ON requests (status, created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_requests_source ON requests (source, created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_requests_performer ON requests (performer, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single connection so every query sees the same in-memory database
    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let pool = memory_pool().await;
        create_songs_table(&pool).await.unwrap();
        create_requests_table(&pool).await.unwrap();
        create_songs_table(&pool).await.unwrap();
        create_requests_table(&pool).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicate_norm_keys() {
        let pool = memory_pool().await;
        create_songs_table(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO songs (id, artist, title, artist_norm, title_norm)
             VALUES ('a', 'Fito Paez', 'Mariposas', 'fito paez', 'mariposas')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let dup = sqlx::query(
            "INSERT INTO songs (id, artist, title, artist_norm, title_norm)
             VALUES ('b', 'FITO PAEZ', 'Mariposas', 'fito paez', 'mariposas')",
        )
        .execute(&pool)
        .await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn enum_checks_reject_garbage() {
        let pool = memory_pool().await;
        create_requests_table(&pool).await.unwrap();

        let bad = sqlx::query(
            "INSERT INTO requests (id, full_name, artist, title, status)
             VALUES ('a', 'Ana', 'Soda Stereo', 'Trátame Suavemente', 'bogus')",
        )
        .execute(&pool)
        .await;
        assert!(bad.is_err());
    }
}
