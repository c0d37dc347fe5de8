//! `POST /subtitles/translate` (§6.1): creates a job with an empty
//! `video_url` (§9 note b — downstream code must tolerate this, so
//! `video_url` validation is deliberately skipped here) and publishes
//! directly to the translation queue.

use uuid::Uuid;

use crate::domain::entities::Job;
use crate::domain::events::event_type::{SUBTITLE_TRANSLATE_REQUESTED, TRANSLATION_QUEUE_ROUTING_KEY};
use crate::domain::events::payloads::TranslateRequestedPayload;
use crate::domain::events::tasks::TranslationTask;
use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::domain::services::validation::{validate_language_code, validate_target_language};
use crate::infrastructure::bus::EventBus;
use crate::shared::error::ApplicationError;

pub struct TranslateJobRequest {
    pub subtitle_path: String,
    pub source_language: String,
    pub target_language: String,
    pub video_title: Option<String>,
}

const SOURCE: &str = "manager";

pub async fn create_translate_job(
    job_repo: &dyn JobRepository,
    bus: &dyn EventBus,
    request: TranslateJobRequest,
) -> Result<Job, ApplicationError> {
    validate_language_code(&request.source_language)?;
    validate_target_language(&request.source_language, Some(&request.target_language))?;
    if request.subtitle_path.is_empty() {
        return Err(ApplicationError::Domain(crate::shared::error::DomainError::EmptyVideoUrl));
    }

    let job = Job::new(
        "",
        request.video_title.clone().unwrap_or_else(|| request.subtitle_path.clone()),
        request.source_language.clone(),
        Some(request.target_language.clone()),
    );
    job_repo.create(&job).await?;

    publish_translation_task(
        bus,
        job.id,
        request.subtitle_path,
        request.source_language,
        request.target_language,
        None,
    )
    .await?;

    Ok(job)
}

pub async fn publish_translation_task(
    bus: &dyn EventBus,
    job_id: Uuid,
    source_path: String,
    source_language: String,
    target_language: String,
    degraded: Option<bool>,
) -> Result<(), ApplicationError> {
    let task = TranslationTask {
        job_id,
        source_path: source_path.clone(),
        source_language: source_language.clone(),
        target_language: target_language.clone(),
    };
    let task_envelope = EventEnvelope::new(
        TRANSLATION_QUEUE_ROUTING_KEY,
        job_id,
        SOURCE,
        serde_json::to_value(&task)?,
    );
    bus.publish(TRANSLATION_QUEUE_ROUTING_KEY, &task_envelope).await?;

    // Observability only: consumers must not use this to create a
    // second task (§9 note a).
    let payload = TranslateRequestedPayload {
        source_path,
        source_language,
        target_language,
        degraded,
    };
    let event_envelope = EventEnvelope::new(
        SUBTITLE_TRANSLATE_REQUESTED,
        job_id,
        SOURCE,
        serde_json::to_value(&payload)?,
    );
    bus.publish(SUBTITLE_TRANSLATE_REQUESTED, &event_envelope).await?;
    Ok(())
}
