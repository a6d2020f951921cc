//! Request queue persistence.

use chrono::{DateTime, Utc};
use openmic_common::models::{NewRequest, Request, RequestPerformer, RequestSource, RequestStatus};
use openmic_common::{Error, Result};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

/// Queue totals per status, zero-filled for statuses with no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub on_stage: i64,
    pub done: i64,
    pub no_show: i64,
}

/// Parse a request id from its wire form.
pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::InvalidInput("Invalid request id".to_string()))
}

/// Insert a validated request. New rows always start as `pending`.
pub async fn insert_request(db: &Pool<Sqlite>, new: &NewRequest) -> Result<Request> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO requests (id, full_name, artist, title, notes, source, performer, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&new.full_name)
    .bind(&new.artist)
    .bind(&new.title)
    .bind(&new.notes)
    .bind(new.source.as_str())
    .bind(new.performer.as_str())
    .bind(RequestStatus::Pending.as_str())
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(Request {
        id: id.to_string(),
        full_name: new.full_name.clone(),
        artist: new.artist.clone(),
        title: new.title.clone(),
        notes: new.notes.clone(),
        source: new.source,
        performer: new.performer,
        status: RequestStatus::Pending,
        created_at: now,
        updated_at: now,
    })
}

/// List requests newest first, optionally restricted to the given statuses.
pub async fn list_requests(
    db: &Pool<Sqlite>,
    statuses: &[RequestStatus],
) -> Result<Vec<Request>> {
    let mut sql = String::from(
        "SELECT id, full_name, artist, title, notes, source, performer, status, created_at, updated_at FROM requests",
    );
    if !statuses.is_empty() {
        let placeholders = vec!["?"; statuses.len()].join(", ");
        sql.push_str(&format!(" WHERE status IN ({placeholders})"));
    }
    sql.push_str(" ORDER BY created_at DESC, id");

    let mut query = sqlx::query(&sql);
    for status in statuses {
        query = query.bind(status.as_str());
    }
    let rows = query.fetch_all(db).await?;

    Ok(rows.iter().map(request_from_row).collect())
}

/// Count queue rows per status. Statuses without rows report zero.
pub async fn status_counts(db: &Pool<Sqlite>) -> Result<StatusCounts> {
    let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM requests GROUP BY status")
        .fetch_all(db)
        .await?;

    let mut counts = StatusCounts::default();
    for row in &rows {
        let status: String = row.get("status");
        let n: i64 = row.get("n");
        match RequestStatus::parse(&status) {
            Some(RequestStatus::Pending) => counts.pending = n,
            Some(RequestStatus::OnStage) => counts.on_stage = n,
            Some(RequestStatus::Done) => counts.done = n,
            Some(RequestStatus::NoShow) => counts.no_show = n,
            None => {}
        }
    }
    Ok(counts)
}

/// Fetch one request by id.
pub async fn get_request(db: &Pool<Sqlite>, id: Uuid) -> Result<Request> {
    let row = sqlx::query(
        r#"
        SELECT id, full_name, artist, title, notes, source, performer, status, created_at, updated_at
        FROM requests WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Request not found: {id}")))?;

    Ok(request_from_row(&row))
}

/// Relabel a request, returning the updated record.
pub async fn set_status(
    db: &Pool<Sqlite>,
    id: Uuid,
    status: RequestStatus,
) -> Result<Request> {
    let result = sqlx::query("UPDATE requests SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Request not found: {id}")));
    }
    get_request(db, id).await
}

/// Remove one request.
pub async fn delete_request(db: &Pool<Sqlite>, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM requests WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Request not found: {id}")));
    }
    Ok(())
}

/// Empty the queue, returning how many rows were removed.
pub async fn delete_all_requests(db: &Pool<Sqlite>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM requests").execute(db).await?;
    Ok(result.rows_affected())
}

fn request_from_row(row: &SqliteRow) -> Request {
    let source: String = row.get("source");
    let performer: String = row.get("performer");
    let status: String = row.get("status");
    Request {
        id: row.get("id"),
        full_name: row.get("full_name"),
        artist: row.get("artist"),
        title: row.get("title"),
        notes: row.get("notes"),
        // CHECK constraints keep these columns in range; defaults are a backstop.
        source: RequestSource::parse(&source).unwrap_or_default(),
        performer: RequestPerformer::parse(&performer).unwrap_or_default(),
        status: RequestStatus::parse(&status).unwrap_or_default(),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}
