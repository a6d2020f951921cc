//! Read-side queries against the imported song catalog.

use openmic_common::normalize::{escape_like, normalize};
use openmic_common::Result;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::pagination::PageParams;

/// One catalog entry as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SongItem {
    pub artist: String,
    pub title: String,
    pub styles: Vec<String>,
}

/// One artist group with its song count.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistItem {
    pub artist: String,
    pub count: i64,
}

/// Search the catalog, returning one page of matches plus the total count.
///
/// Every whitespace-separated token of the normalized query must match the
/// normalized artist, the normalized title, or one of the normalized styles.
/// A non-empty `styles` list additionally restricts matches to songs tagged
/// with at least one of those styles.
pub async fn search_songs(
    db: &Pool<Sqlite>,
    query: &str,
    styles: &[String],
    params: PageParams,
) -> Result<(Vec<SongItem>, i64)> {
    let (where_sql, binds) = build_search_filter(query, styles);

    let count_sql = format!("SELECT COUNT(*) FROM songs{where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = count_query.bind(bind);
    }
    let total = count_query.fetch_one(db).await?;

    let rows_sql = format!(
        "SELECT artist, title, styles FROM songs{where_sql} \
         ORDER BY artist_norm, title_norm, id LIMIT ? OFFSET ?"
    );
    let mut rows_query = sqlx::query(&rows_sql);
    for bind in &binds {
        rows_query = rows_query.bind(bind);
    }
    let rows = rows_query
        .bind(params.per_page)
        .bind(params.offset())
        .fetch_all(db)
        .await?;

    Ok((rows.iter().map(song_from_row).collect(), total))
}

/// Group the catalog by normalized artist.
///
/// `MIN(artist)` picks a stable display name when the catalog holds several
/// surface spellings of the same artist. A non-empty query filters groups by
/// normalized substring match.
pub async fn list_artists(db: &Pool<Sqlite>, query: &str) -> Result<Vec<ArtistItem>> {
    let needle = normalize(query);
    let mut sql =
        String::from("SELECT MIN(artist) AS artist, COUNT(*) AS song_count FROM songs");
    if !needle.is_empty() {
        sql.push_str(" WHERE artist_norm LIKE ? ESCAPE '\\'");
    }
    sql.push_str(" GROUP BY artist_norm ORDER BY artist");

    let mut rows_query = sqlx::query(&sql);
    if !needle.is_empty() {
        rows_query = rows_query.bind(format!("%{}%", escape_like(&needle)));
    }
    let rows = rows_query.fetch_all(db).await?;

    Ok(rows
        .iter()
        .map(|row| ArtistItem {
            artist: row.get("artist"),
            count: row.get("song_count"),
        })
        .collect())
}

/// All titles for one artist, matched by normalized name.
///
/// Returns the display name from the first matching row (`None` when the
/// artist is unknown) and the titles in normalized title order.
pub async fn songs_for_artist(
    db: &Pool<Sqlite>,
    artist: &str,
) -> Result<(Option<String>, Vec<String>)> {
    let rows = sqlx::query(
        r#"
        SELECT artist, title FROM songs
        WHERE artist_norm = ?
        ORDER BY title_norm, id
        "#,
    )
    .bind(normalize(artist))
    .fetch_all(db)
    .await?;

    let display = rows.first().map(|row| row.get("artist"));
    let titles = rows.iter().map(|row| row.get("title")).collect();
    Ok((display, titles))
}

fn build_search_filter(query: &str, styles: &[String]) -> (String, Vec<String>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    for token in normalize(query).split_whitespace() {
        let pattern = format!("%{}%", escape_like(token));
        clauses.push(
            "(artist_norm LIKE ? ESCAPE '\\' OR title_norm LIKE ? ESCAPE '\\' \
             OR EXISTS (SELECT 1 FROM json_each(songs.styles_norm) \
             WHERE json_each.value LIKE ? ESCAPE '\\'))"
                .to_string(),
        );
        binds.push(pattern.clone());
        binds.push(pattern.clone());
        binds.push(pattern);
    }

    let wanted: Vec<String> = styles
        .iter()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty())
        .collect();
    if !wanted.is_empty() {
        let placeholders = vec!["?"; wanted.len()].join(", ");
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM json_each(songs.styles_norm) \
             WHERE json_each.value IN ({placeholders}))"
        ));
        binds.extend(wanted);
    }

    if clauses.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), binds)
    }
}

fn song_from_row(row: &SqliteRow) -> SongItem {
    let styles_json: String = row.get("styles");
    SongItem {
        artist: row.get("artist"),
        title: row.get("title"),
        styles: serde_json::from_str(&styles_json).unwrap_or_default(),
    }
}
