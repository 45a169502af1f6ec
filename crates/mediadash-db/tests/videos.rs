//! Tests for the `videos` table against an in-memory SQLite database.

use chrono::{TimeZone, Utc};
use mediadash_core::{VideoRecord, TRANSCRIPT_UNAVAILABLE};
use mediadash_db::{count_videos, list_videos, replace_videos, PoolConfig};

/// In-memory databases are per connection, so the pool is pinned to one.
async fn memory_pool() -> sqlx::SqlitePool {
    let pool = mediadash_db::connect_pool(
        "sqlite::memory:",
        PoolConfig {
            max_connections: 1,
            acquire_timeout_secs: 5,
        },
    )
    .await
    .expect("connect");
    mediadash_db::run_migrations(&pool).await.expect("migrate");
    pool
}

fn record(id: &str, day: u32) -> VideoRecord {
    VideoRecord {
        video_id: id.to_string(),
        title: format!("Video {id}"),
        description: "desc".to_string(),
        published_at: Utc.with_ymd_and_hms(2025, 5, day, 9, 30, 0).unwrap(),
        duration_iso: Some("PT3M".to_string()),
        duration_seconds: Some(180),
        duration_hms: "0:03:00".to_string(),
        url: VideoRecord::watch_url(id),
        transcript: TRANSCRIPT_UNAVAILABLE.to_string(),
    }
}

#[tokio::test]
async fn replace_videos_writes_all_records() {
    let pool = memory_pool().await;
    let written = replace_videos(&pool, &[record("a", 1), record("b", 2)])
        .await
        .expect("replace");
    assert_eq!(written, 2);
    assert_eq!(count_videos(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn second_run_replaces_first_run_entirely() {
    let pool = memory_pool().await;
    replace_videos(&pool, &[record("a", 1), record("b", 2)])
        .await
        .unwrap();
    replace_videos(&pool, &[record("c", 3)]).await.unwrap();

    let rows = list_videos(&pool, 10).await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, ["c"]);
}

#[tokio::test]
async fn list_videos_orders_newest_first_and_round_trips_fields() {
    let pool = memory_pool().await;
    let mut no_duration = record("old", 1);
    no_duration.duration_iso = None;
    no_duration.duration_seconds = None;
    no_duration.duration_hms = "unknown".to_string();
    replace_videos(&pool, &[no_duration.clone(), record("new", 20)])
        .await
        .unwrap();

    let rows = list_videos(&pool, 10).await.unwrap();
    assert_eq!(rows[0].video_id, "new");
    let old: VideoRecord = rows[1].clone().into();
    assert_eq!(old, no_duration);
}

#[tokio::test]
async fn list_videos_respects_limit() {
    let pool = memory_pool().await;
    let records: Vec<VideoRecord> = (1..=5).map(|d| record(&format!("v{d}"), d)).collect();
    replace_videos(&pool, &records).await.unwrap();
    assert_eq!(list_videos(&pool, 3).await.unwrap().len(), 3);
}
