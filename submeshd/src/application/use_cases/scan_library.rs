//! The scanner's per-file pipeline (§4.1 intake, §5 file-stability):
//! derive a video title, skip files already registered, and publish
//! `subtitle.requested` plus the `media.file.detected` audit event.
//! Structured like the downloader/translator use cases: a single
//! orchestrating function over the dedup store and bus.

use std::path::Path;

use uuid::Uuid;

use crate::domain::events::event_type::{MEDIA_FILE_DETECTED, SUBTITLE_REQUESTED};
use crate::domain::events::payloads::{MediaFileDetectedPayload, SubtitleRequestedPayload};
use crate::domain::events::EventEnvelope;
use crate::domain::repositories::DedupStore;
use crate::infrastructure::bus::EventBus;
use crate::shared::error::ApplicationError;

const SOURCE: &str = "scanner";

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub default_language: String,
}

/// Derives a human-readable title from a bare filename using the same
/// filename-parsing pipeline the library uses for media identification,
/// falling back to the stem when no title is recovered.
pub fn derive_video_title(path: &Path) -> String {
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
    let parsed = media_identifier::parse(file_name);
    parsed.title.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name)
            .to_string()
    })
}

/// Handles one video file found by the periodic sync or the stability
/// watcher: skip it if it is already a known duplicate (defence in
/// depth only, the Manager's `subtitle.requested` handler performs the
/// authoritative check), otherwise publish the request event and an
/// audit trail entry.
pub async fn handle_detected_file(
    dedup: &dyn DedupStore,
    bus: &dyn EventBus,
    config: &ScanConfig,
    path: &Path,
) -> Result<(), ApplicationError> {
    let video_url = path.display().to_string();
    let video_title = derive_video_title(path);

    let candidate_id = Uuid::new_v4();
    let check = dedup.check_and_register(&video_url, &config.default_language, candidate_id).await;
    let job_id = check.existing_job_id.unwrap_or(candidate_id);

    if check.is_duplicate {
        tracing::debug!(path = %video_url, job_id = %job_id, "already registered, skipping");
        return Ok(());
    }

    let payload = SubtitleRequestedPayload {
        video_url: video_url.clone(),
        video_title: video_title.clone(),
        language: config.default_language.clone(),
        target_language: None,
        preferred_sources: None,
    };
    let envelope = EventEnvelope::new(SUBTITLE_REQUESTED, job_id, SOURCE, serde_json::to_value(&payload)?);
    bus.publish(SUBTITLE_REQUESTED, &envelope).await?;

    emit_detected(bus, job_id, &video_url, Some(video_title)).await
}

async fn emit_detected(
    bus: &dyn EventBus,
    job_id: Uuid,
    path: &str,
    video_title: Option<String>,
) -> Result<(), ApplicationError> {
    let payload = MediaFileDetectedPayload {
        path: path.to_string(),
        video_title,
    };
    let envelope = EventEnvelope::new(MEDIA_FILE_DETECTED, job_id, SOURCE, serde_json::to_value(&payload)?);
    bus.publish(MEDIA_FILE_DETECTED, &envelope).await?;
    Ok(())
}
