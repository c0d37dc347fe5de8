//! `POST /subtitles/download` (§6.1): persists a fresh `PENDING` job,
//! then enqueues the download task and emits the observability event,
//! publishing over the distributed bus rather than spawning an
//! in-process task.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::Job;
use crate::domain::events::event_type::{DOWNLOAD_QUEUE_ROUTING_KEY, SUBTITLE_DOWNLOAD_REQUESTED};
use crate::domain::events::payloads::DownloadRequestedPayload;
use crate::domain::events::tasks::DownloadTask;
use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::domain::services::validation::{
    validate_target_language, validate_language_code, validate_video_title, validate_video_url_scheme,
};
use crate::infrastructure::bus::EventBus;
use crate::shared::error::ApplicationError;

pub struct DownloadJobRequest {
    pub video_url: String,
    pub video_title: String,
    pub language: String,
    pub target_language: Option<String>,
    pub preferred_sources: Option<Vec<String>>,
}

const SOURCE: &str = "manager";

pub async fn create_download_job(
    job_repo: &dyn JobRepository,
    bus: &dyn EventBus,
    request: DownloadJobRequest,
) -> Result<Job, ApplicationError> {
    validate_video_url_scheme(&request.video_url)?;
    validate_video_title(&request.video_title)?;
    validate_language_code(&request.language)?;
    validate_target_language(&request.language, request.target_language.as_deref())?;

    let job = Job::new(
        request.video_url.clone(),
        request.video_title.clone(),
        request.language.clone(),
        request.target_language.clone(),
    );
    job_repo.create(&job).await?;

    publish_download_task(
        bus,
        job.id,
        request.video_url,
        request.video_title,
        request.language,
        request.preferred_sources,
    )
    .await?;

    Ok(job)
}

pub async fn publish_download_task(
    bus: &dyn EventBus,
    job_id: Uuid,
    video_url: String,
    video_title: String,
    language: String,
    preferred_sources: Option<Vec<String>>,
) -> Result<(), ApplicationError> {
    let task = DownloadTask {
        job_id,
        video_url: video_url.clone(),
        video_title: video_title.clone(),
        catalogue_id: None,
        language: language.clone(),
        preferred_sources,
    };
    let task_envelope = EventEnvelope::new(
        DOWNLOAD_QUEUE_ROUTING_KEY,
        job_id,
        SOURCE,
        serde_json::to_value(&task)?,
    );
    bus.publish(DOWNLOAD_QUEUE_ROUTING_KEY, &task_envelope).await?;

    let payload = DownloadRequestedPayload {
        video_url,
        video_title,
        language,
    };
    let event_envelope = EventEnvelope::new(
        SUBTITLE_DOWNLOAD_REQUESTED,
        job_id,
        SOURCE,
        serde_json::to_value(&payload)?,
    );
    bus.publish(SUBTITLE_DOWNLOAD_REQUESTED, &event_envelope).await?;
    Ok(())
}

/// Keeps `Arc<dyn EventBus>` ergonomic for callers holding shared state.
pub async fn create_download_job_shared(
    job_repo: Arc<dyn JobRepository>,
    bus: Arc<dyn EventBus>,
    request: DownloadJobRequest,
) -> Result<Job, ApplicationError> {
    create_download_job(job_repo.as_ref(), bus.as_ref(), request).await
}
