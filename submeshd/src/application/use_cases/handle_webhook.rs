//! `POST /webhooks/jellyfin` (§6.1, §4.6): ignores non-video items and
//! non-added/updated events; otherwise short-circuits rapid repeats via
//! the dedup store and creates a download job. The reply body
//! distinguishes `received`, `duplicate`, `ignored`, and `error`.

use uuid::Uuid;

use crate::application::use_cases::create_download_job::publish_download_task;
use crate::domain::entities::Job;
use crate::domain::repositories::{DedupStore, JobRepository};
use crate::infrastructure::bus::EventBus;
use crate::shared::error::ApplicationError;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub item_type: String,
    pub item_name: String,
    #[serde(default)]
    pub item_path: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub library_name: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Received { job_id: Uuid },
    Duplicate { job_id: Uuid },
    Ignored,
    Error { message: String },
}

const VIDEO_ITEM_TYPES: &[&str] = &["Movie", "Episode", "Video"];
const ACTIONABLE_EVENTS: &[&str] = &["added", "updated"];

pub async fn handle_webhook(
    job_repo: &dyn JobRepository,
    dedup: &dyn DedupStore,
    bus: &dyn EventBus,
    default_language: &str,
    request: WebhookRequest,
) -> WebhookOutcome {
    if !VIDEO_ITEM_TYPES.iter().any(|t| t.eq_ignore_ascii_case(&request.item_type)) {
        return WebhookOutcome::Ignored;
    }
    if !ACTIONABLE_EVENTS.iter().any(|e| e.eq_ignore_ascii_case(&request.event)) {
        return WebhookOutcome::Ignored;
    }

    let Some(video_url) = request.video_url.clone().or_else(|| request.item_path.clone()) else {
        return WebhookOutcome::Error {
            message: "webhook item carried neither video_url nor item_path".to_string(),
        };
    };

    let candidate_id = Uuid::new_v4();
    let check = dedup.check_and_register(&video_url, default_language, candidate_id).await;
    if check.is_duplicate {
        return WebhookOutcome::Duplicate {
            job_id: check.existing_job_id.unwrap_or(candidate_id),
        };
    }

    let job_id = check.existing_job_id.unwrap_or(candidate_id);
    let job = Job::with_id(job_id, video_url.clone(), request.item_name.clone(), default_language, None);

    if let Err(err) = create_and_publish(job_repo, bus, &job, video_url, request.item_name).await {
        return WebhookOutcome::Error { message: err.to_string() };
    }

    WebhookOutcome::Received { job_id }
}

async fn create_and_publish(
    job_repo: &dyn JobRepository,
    bus: &dyn EventBus,
    job: &Job,
    video_url: String,
    video_title: String,
) -> Result<(), ApplicationError> {
    job_repo.create(job).await?;
    publish_download_task(bus, job.id, video_url, video_title, job.language.clone(), None).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_video_item_types_are_ignored() {
        let request = WebhookRequest {
            event: "added".into(),
            item_type: "Audio".into(),
            item_name: "Song".into(),
            item_path: None,
            item_id: None,
            library_name: None,
            video_url: None,
        };
        assert!(!VIDEO_ITEM_TYPES.iter().any(|t| t.eq_ignore_ascii_case(&request.item_type)));
    }

    #[test]
    fn non_actionable_events_are_ignored() {
        assert!(!ACTIONABLE_EVENTS.iter().any(|e| e.eq_ignore_ascii_case("removed")));
        assert!(ACTIONABLE_EVENTS.iter().any(|e| e.eq_ignore_ascii_case("Added")));
    }
}
