//! Bulk catalog upsert
//!
//! Buffers parsed rows and flushes them in 1000-row transactions, upserting
//! by `(artist_norm, title_norm)`. A failed batch is logged and skipped; the
//! unique index is the sole cross-row duplicate guard, so re-importing the
//! same file updates rows in place instead of growing the table.

use sqlx::{Row, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use openmic_common::models::SongEntry;

use crate::error::Result;
use crate::sniff::{resolve_field, CsvTable, ARTIST_ALIASES, STYLE_ALIASES, TITLE_ALIASES};

pub const BATCH_SIZE: usize = 1000;
const PROGRESS_EVERY: u64 = 5000;

/// Import counters, reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub read: u64,
    pub upserted: u64,
    pub modified: u64,
    pub skipped: u64,
}

/// A `(artist_norm, title_norm)` group holding more than one row.
#[derive(Debug)]
pub struct DuplicateGroup {
    pub artist_norm: String,
    pub title_norm: String,
    pub count: i64,
}

/// Split a raw styles cell on any of `; , / |`, trimming and dropping empties.
pub fn split_styles(raw: &str) -> Vec<String> {
    raw.split([';', ',', '/', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run the full table through the upsert pipeline.
///
/// Rows without a resolvable artist or title are counted as skipped and
/// dropped, never fatal.
pub async fn import_rows(pool: &SqlitePool, table: &CsvTable) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut batch: Vec<SongEntry> = Vec::with_capacity(BATCH_SIZE);

    for row in &table.rows {
        stats.read += 1;
        if stats.read % PROGRESS_EVERY == 0 {
            info!("Processed {} rows...", stats.read);
        }

        let artist = resolve_field(&table.fields, row, ARTIST_ALIASES);
        let title = resolve_field(&table.fields, row, TITLE_ALIASES);
        let (artist, title) = match (artist, title) {
            (Some(a), Some(t)) => (a, t),
            _ => {
                stats.skipped += 1;
                continue;
            }
        };
        let styles = resolve_field(&table.fields, row, STYLE_ALIASES)
            .map(split_styles)
            .unwrap_or_default();

        batch.push(SongEntry::new(artist, title, styles));
        if batch.len() >= BATCH_SIZE {
            flush_batch(pool, &mut batch, &mut stats).await;
        }
    }
    flush_batch(pool, &mut batch, &mut stats).await;

    Ok(stats)
}

async fn flush_batch(pool: &SqlitePool, batch: &mut Vec<SongEntry>, stats: &mut ImportStats) {
    if batch.is_empty() {
        return;
    }
    match upsert_batch(pool, batch).await {
        Ok((upserted, modified)) => {
            stats.upserted += upserted;
            stats.modified += modified;
        }
        Err(e) => warn!("Batch of {} rows failed, continuing: {}", batch.len(), e),
    }
    batch.clear();
}

/// Upsert one batch in a single transaction.
///
/// SQLite reports one affected row for both the insert and the update arm,
/// so inserts are counted as the table-size delta and the rest of the batch
/// is counted as modified.
async fn upsert_batch(pool: &SqlitePool, batch: &[SongEntry]) -> Result<(u64, u64)> {
    let before: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;

    let mut tx = pool.begin().await?;
    for entry in batch {
        sqlx::query(
            r#"
            INSERT INTO songs (id, artist, title, styles, artist_norm, title_norm, styles_norm)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(artist_norm, title_norm) DO UPDATE SET
                artist = excluded.artist,
                title = excluded.title,
                styles = excluded.styles,
                styles_norm = excluded.styles_norm,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&entry.artist)
        .bind(&entry.title)
        .bind(serde_json::to_string(&entry.styles)?)
        .bind(&entry.artist_norm)
        .bind(&entry.title_norm)
        .bind(serde_json::to_string(&entry.styles_norm)?)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    let after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    let upserted = (after - before).max(0) as u64;
    let modified = (batch.len() as u64).saturating_sub(upserted);
    Ok((upserted, modified))
}

/// Delete every song (replace mode). Returns the number removed.
pub async fn clear_songs(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM songs").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Report `(artist_norm, title_norm)` groups with more than one row.
///
/// Expected empty: the unique index forbids these. The report exists as
/// post-import verification.
pub async fn duplicate_groups(pool: &SqlitePool, limit: i64) -> Result<Vec<DuplicateGroup>> {
    let rows = sqlx::query(
        r#"
        SELECT artist_norm, title_norm, COUNT(*) AS n
        FROM songs
        GROUP BY artist_norm, title_norm
        HAVING n > 1
        ORDER BY n DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| DuplicateGroup {
            artist_norm: row.get("artist_norm"),
            title_norm: row.get("title_norm"),
            count: row.get("n"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniff::parse_rows;
    use sqlx::sqlite::SqlitePoolOptions;

    // Single connection so every query sees the same in-memory database
    async fn setup_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        openmic_common::db::create_songs_table(&pool).await.unwrap();
        pool
    }

    fn sample_table() -> CsvTable {
        parse_rows(
            "Artist;Title;Styles\n\
             Fito Paez;Mariposa Tecknicolor;Rock;Pop\n\
             Soda Stereo;Persiana Americana;Rock\n\
             ;Sin Artista;Rock",
            b';',
        )
        .unwrap()
    }

    #[tokio::test]
    async fn imports_and_counts_rows() {
        let pool = setup_db().await;
        let stats = import_rows(&pool, &sample_table()).await.unwrap();
        assert_eq!(
            stats,
            ImportStats {
                read: 3,
                upserted: 2,
                modified: 0,
                skipped: 1,
            }
        );

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn second_pass_updates_instead_of_inserting() {
        let pool = setup_db().await;
        import_rows(&pool, &sample_table()).await.unwrap();
        let stats = import_rows(&pool, &sample_table()).await.unwrap();
        assert_eq!(stats.upserted, 0);
        assert_eq!(stats.modified, 2);
        assert_eq!(stats.skipped, 1);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn upsert_keeps_latest_surface_forms() {
        let pool = setup_db().await;
        import_rows(&pool, &sample_table()).await.unwrap();

        let relisted = parse_rows("artist;title;styles\nFITO PAEZ;Mariposa Tecknicolor;Cuarteto", b';')
            .unwrap();
        import_rows(&pool, &relisted).await.unwrap();

        let row = sqlx::query("SELECT artist, styles FROM songs WHERE artist_norm = 'fito paez'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("artist"), "FITO PAEZ");
        let styles: Vec<String> =
            serde_json::from_str(&row.get::<String, _>("styles")).unwrap();
        assert_eq!(styles, vec!["Cuarteto"]);
    }

    #[tokio::test]
    async fn styles_are_stored_as_deduplicated_json() {
        let pool = setup_db().await;
        let table = parse_rows(
            "artist,title,styles\nLos Palmeras,El Bombón Asesino,\"Cumbia; cumbia / Tropical\"",
            b',',
        )
        .unwrap();
        import_rows(&pool, &table).await.unwrap();

        let row = sqlx::query("SELECT styles, styles_norm FROM songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        let styles: Vec<String> = serde_json::from_str(&row.get::<String, _>("styles")).unwrap();
        let norm: Vec<String> =
            serde_json::from_str(&row.get::<String, _>("styles_norm")).unwrap();
        assert_eq!(styles, vec!["Cumbia", "Tropical"]);
        assert_eq!(norm, vec!["cumbia", "tropical"]);
    }

    #[tokio::test]
    async fn aliased_headers_resolve() {
        let pool = setup_db().await;
        let table = parse_rows(
            "artista,cancion,genero\nCharly García,Demoliendo Hoteles,Rock Nacional",
            b',',
        )
        .unwrap();
        let stats = import_rows(&pool, &table).await.unwrap();
        assert_eq!(stats.upserted, 1);

        let title_norm: String = sqlx::query_scalar("SELECT title_norm FROM songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(title_norm, "demoliendo hoteles");
    }

    #[tokio::test]
    async fn clear_songs_empties_the_table() {
        let pool = setup_db().await;
        import_rows(&pool, &sample_table()).await.unwrap();
        let deleted = clear_songs(&pool).await.unwrap();
        assert_eq!(deleted, 2);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn duplicate_report_is_empty_under_the_unique_index() {
        let pool = setup_db().await;
        import_rows(&pool, &sample_table()).await.unwrap();
        import_rows(&pool, &sample_table()).await.unwrap();
        let dupes = duplicate_groups(&pool, 10).await.unwrap();
        assert!(dupes.is_empty());
    }

    #[test]
    fn splits_styles_on_all_separators() {
        assert_eq!(
            split_styles("Rock; Pop/Latino|Cumbia, Salsa"),
            vec!["Rock", "Pop", "Latino", "Cumbia", "Salsa"]
        );
        assert_eq!(split_styles(" ; / | , "), Vec::<String>::new());
    }
}
