//! Database operations for the `videos` table.

use chrono::{DateTime, Utc};
use mediadash_core::VideoRecord;
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `videos` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VideoRow {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub duration_iso: Option<String>,
    pub duration_seconds: Option<i64>,
    pub duration_hms: String,
    pub url: String,
    pub transcript: String,
}

impl From<VideoRow> for VideoRecord {
    fn from(row: VideoRow) -> Self {
        Self {
            video_id: row.video_id,
            title: row.title,
            description: row.description,
            published_at: row.published_at,
            duration_iso: row.duration_iso,
            duration_seconds: row.duration_seconds,
            duration_hms: row.duration_hms,
            url: row.url,
            transcript: row.transcript,
        }
    }
}

/// Replace the entire `videos` table with `records`.
///
/// Runs in one transaction: every existing row is deleted, then each record
/// inserted. A record repeating an earlier `video_id` overwrites it.
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the table is left as it
/// was before the call.
pub async fn replace_videos(pool: &SqlitePool, records: &[VideoRecord]) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM videos").execute(&mut *tx).await?;

    let mut written = 0_u64;
    for record in records {
        let result = sqlx::query(
            "INSERT OR REPLACE INTO videos \
                 (video_id, title, description, published_at, duration_iso, \
                  duration_seconds, duration_hms, url, transcript) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.video_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.published_at)
        .bind(&record.duration_iso)
        .bind(record.duration_seconds)
        .bind(&record.duration_hms)
        .bind(&record.url)
        .bind(&record.transcript)
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

/// List stored videos, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_videos(pool: &SqlitePool, limit: i64) -> Result<Vec<VideoRow>, DbError> {
    let rows = sqlx::query_as::<_, VideoRow>(
        "SELECT video_id, title, description, published_at, duration_iso, \
                duration_seconds, duration_hms, url, transcript \
         FROM videos \
         ORDER BY published_at DESC, video_id ASC \
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Number of rows in the `videos` table.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_videos(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
