//! End-to-end collection run for one channel.
//!
//! Stages run strictly in sequence: resolve the uploads playlist, list videos
//! in the window, look up durations, convert them, fetch transcripts. The
//! caller persists [`CollectionOutcome::records`].

use mediadash_core::VideoRecord;

use crate::client::YoutubeClient;
use crate::duration::{parse_iso8601_duration, VideoDuration};
use crate::listing::{list_videos_in_window, PublishWindow, ScanMode};

/// Parameters for one collection run.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    pub channel_id: String,
    pub window: PublishWindow,
    pub scan_mode: ScanMode,
    pub transcript_lang: String,
}

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct CollectionOutcome {
    /// `None` when the channel could not be resolved.
    pub playlist_id: Option<String>,
    pub records: Vec<VideoRecord>,
    pub durations_found: usize,
    pub transcripts_found: usize,
}

/// Runs every collector stage for `request`.
///
/// Never fails: an unresolvable channel produces an empty outcome, and
/// per-video gaps are filled with sentinels.
pub async fn collect_channel(client: &YoutubeClient, request: &CollectRequest) -> CollectionOutcome {
    let playlist_id = match client.uploads_playlist_id(&request.channel_id).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(
                channel_id = %request.channel_id,
                error = %e,
                "could not resolve uploads playlist; nothing to collect"
            );
            return CollectionOutcome::default();
        }
    };
    tracing::info!(channel_id = %request.channel_id, %playlist_id, "resolved uploads playlist");

    let videos =
        list_videos_in_window(client, &playlist_id, &request.window, request.scan_mode).await;
    if videos.is_empty() {
        return CollectionOutcome {
            playlist_id: Some(playlist_id),
            ..CollectionOutcome::default()
        };
    }

    let video_ids: Vec<String> = videos.iter().map(|v| v.video_id.clone()).collect();
    let durations = client.video_durations(&video_ids).await;
    tracing::info!(
        requested = video_ids.len(),
        found = durations.len(),
        "duration lookup complete"
    );

    tracing::info!(videos = videos.len(), "fetching transcripts");
    let mut records = Vec::with_capacity(videos.len());
    let mut transcripts_found = 0_usize;

    for video in videos {
        let duration_iso = durations.get(&video.video_id).cloned();
        let duration = duration_iso
            .as_deref()
            .map_or(VideoDuration::Unknown, parse_iso8601_duration);

        let transcript = client
            .fetch_transcript(&video.video_id, &request.transcript_lang)
            .await;
        let record = VideoRecord {
            url: VideoRecord::watch_url(&video.video_id),
            video_id: video.video_id,
            title: video.title,
            description: video.description,
            published_at: video.published_at,
            duration_iso,
            duration_seconds: duration.seconds(),
            duration_hms: duration.hms(),
            transcript,
        };
        if record.has_transcript() {
            transcripts_found += 1;
        }
        records.push(record);
    }

    CollectionOutcome {
        playlist_id: Some(playlist_id),
        durations_found: durations.len(),
        transcripts_found,
        records,
    }
}
