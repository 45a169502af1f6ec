//! Integration tests for the collector using wiremock HTTP mocks.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mediadash_core::{TRANSCRIPT_UNAVAILABLE, UNKNOWN_DURATION};
use mediadash_youtube::{
    collect_channel, list_videos_in_window, CollectRequest, PageCursor, PlaylistPager,
    PublishWindow, ScanMode, YoutubeClient, YoutubeError,
};

fn test_client(server: &MockServer) -> YoutubeClient {
    YoutubeClient::with_base_urls(
        "test-key",
        5,
        "mediadash-test/0.1",
        &server.uri(),
        &format!("{}/timedtext", server.uri()),
    )
    .expect("client construction should not fail")
}

fn may_window() -> PublishWindow {
    PublishWindow::new(
        Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

fn item(video_id: &str, published_at: &str) -> serde_json::Value {
    json!({
        "snippet": {
            "publishedAt": published_at,
            "title": format!("Video {video_id}"),
            "description": "desc",
            "resourceId": { "videoId": video_id }
        }
    })
}

async fn mount_channel(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UC_NYT"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "contentDetails": { "relatedPlaylists": { "uploads": "UU_NYT" } } }]
        })))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Channel resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uploads_playlist_id_resolves_channel() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    let client = test_client(&server);
    let id = client.uploads_playlist_id("UC_NYT").await.expect("resolve");
    assert_eq!(id, "UU_NYT");
}

#[tokio::test]
async fn uploads_playlist_id_reports_unknown_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.uploads_playlist_id("UC_NOPE").await.unwrap_err();
    assert!(matches!(err, YoutubeError::ChannelNotFound(ref id) if id == "UC_NOPE"));
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listing_follows_page_tokens_and_stops_at_window_start() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UU_NYT"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                item("june", "2025-06-02T09:00:00Z"),
                item("may30", "2025-05-30T09:00:00Z"),
            ],
            "nextPageToken": "PAGE2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "PAGE2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                item("may01", "2025-05-01T00:00:00Z"),
                item("april", "2025-04-30T23:59:59Z"),
                item("may_late", "2025-05-15T00:00:00Z"),
            ],
            "nextPageToken": "PAGE3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Never requested: paging stops at the first item older than the window.
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "PAGE3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let window = may_window();
    let videos = list_videos_in_window(&client, "UU_NYT", &window, ScanMode::EarlyExit).await;

    let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
    assert_eq!(ids, ["may30", "may01"]);
    for v in &videos {
        assert!(window.contains(v.published_at));
    }
}

#[tokio::test]
async fn full_scan_reads_every_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [item("april", "2025-04-20T00:00:00Z")],
            "nextPageToken": "PAGE2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "PAGE2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [item("may", "2025-05-20T00:00:00Z")]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let videos = list_videos_in_window(&client, "UU_NYT", &may_window(), ScanMode::FullScan).await;
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].video_id, "may");
}

#[tokio::test]
async fn failed_page_is_empty_and_ends_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut pager = PlaylistPager::new(&client, "UU_NYT");
    assert_eq!(pager.next_page().await, Some(Vec::new()));
    assert_eq!(pager.cursor(), &PageCursor::Exhausted);
    assert_eq!(pager.next_page().await, None);
}

#[tokio::test]
async fn pager_can_resume_from_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "PAGE7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [item("resumed", "2025-05-02T00:00:00Z")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut pager = PlaylistPager::resume(&client, "UU_NYT", PageCursor::Next("PAGE7".into()));
    let page = pager.next_page().await.expect("one page");
    assert_eq!(page[0].video_id, "resumed");
    assert_eq!(pager.cursor(), &PageCursor::Exhausted);
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn durations_are_fetched_in_batches_of_fifty() {
    let server = MockServer::start().await;
    let ids: Vec<String> = (0..120).map(|i| format!("v{i:03}")).collect();

    // Echo back a duration only for ids in the first batch, plus an id that
    // was never requested, to show the map mirrors upstream content.
    let first_batch_items: Vec<serde_json::Value> = ids[..50]
        .iter()
        .map(|id| json!({ "id": id, "contentDetails": { "duration": "PT1M" } }))
        .chain(std::iter::once(
            json!({ "id": "extra", "contentDetails": { "duration": "PT2M" } }),
        ))
        .collect();

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", ids[..50].join(",")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": first_batch_items })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", ids[50..100].join(",")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", ids[100..].join(",")))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let durations = client.video_durations(&ids).await;

    assert_eq!(durations.len(), 51);
    assert_eq!(durations.get("v000").map(String::as_str), Some("PT1M"));
    assert_eq!(durations.get("extra").map(String::as_str), Some("PT2M"));
    assert!(!durations.contains_key("v050"));
    assert!(!durations.contains_key("v119"));
}

// ---------------------------------------------------------------------------
// Transcripts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transcript_concatenates_text_elements() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("lang", "en"))
        .and(query_param("v", "vid1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<transcript><text start=\"0\">Hello</text><text start=\"1\">world</text></transcript>",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.fetch_transcript("vid1", "en").await, "Hello world");
}

#[tokio::test]
async fn transcript_falls_back_to_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("v", "blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   \n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("v", "missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("v", "broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<transcript><text>oops"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("v", "silent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<transcript/>"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    for id in ["blank", "missing", "broken", "silent"] {
        assert_eq!(
            client.fetch_transcript(id, "en").await,
            TRANSCRIPT_UNAVAILABLE,
            "video {id}"
        );
    }
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_channel_enriches_every_listed_video() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                item("a1", "2025-05-20T10:00:00Z"),
                item("b2", "2025-05-10T10:00:00Z"),
                item("old", "2025-04-01T10:00:00Z"),
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "a1", "contentDetails": { "duration": "PT1H2M3S" } },
                { "id": "b2", "contentDetails": { "duration": "P1Y" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("v", "a1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<transcript><text>Top story</text></transcript>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("v", "b2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let request = CollectRequest {
        channel_id: "UC_NYT".to_string(),
        window: may_window(),
        scan_mode: ScanMode::EarlyExit,
        transcript_lang: "en".to_string(),
    };
    let outcome = collect_channel(&client, &request).await;

    assert_eq!(outcome.playlist_id.as_deref(), Some("UU_NYT"));
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.transcripts_found, 1);

    let a1 = &outcome.records[0];
    assert_eq!(a1.video_id, "a1");
    assert_eq!(a1.duration_seconds, Some(3723));
    assert_eq!(a1.duration_hms, "1:02:03");
    assert_eq!(a1.url, "https://www.youtube.com/watch?v=a1");
    assert_eq!(a1.transcript, "Top story");

    let b2 = &outcome.records[1];
    assert_eq!(b2.duration_iso.as_deref(), Some("P1Y"));
    assert_eq!(b2.duration_seconds, None);
    assert_eq!(b2.duration_hms, UNKNOWN_DURATION);
    assert_eq!(b2.transcript, TRANSCRIPT_UNAVAILABLE);
}

#[tokio::test]
async fn collect_channel_with_unknown_channel_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let request = CollectRequest {
        channel_id: "UC_NYT".to_string(),
        window: may_window(),
        scan_mode: ScanMode::EarlyExit,
        transcript_lang: "en".to_string(),
    };
    let outcome = collect_channel(&client, &request).await;
    assert!(outcome.playlist_id.is_none());
    assert!(outcome.records.is_empty());
}
