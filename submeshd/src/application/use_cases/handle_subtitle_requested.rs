//! The Manager's `subtitle.requested` consumer (§4.3): validates the
//! payload, applies defence-in-depth dedup, and enqueues the download
//! task. Implements `MessageHandler` so it can be registered directly
//! on an `EventBus` consumer loop.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::use_cases::create_download_job::publish_download_task;
use crate::domain::entities::Job;
use crate::domain::events::event_type::JOB_FAILED;
use crate::domain::events::payloads::JobFailedPayload;
use crate::domain::events::EventEnvelope;
use crate::domain::repositories::{DedupStore, JobRepository};
use crate::domain::services::validation::{validate_language_code, validate_video_title, validate_video_url};
use crate::infrastructure::bus::{EventBus, MessageHandler};
use crate::shared::error::{BusError, ErrorType};

#[derive(Debug, Deserialize)]
struct SubtitleRequestedBody {
    video_url: String,
    video_title: String,
    language: String,
}

pub struct SubtitleRequestedHandler {
    job_repo: Arc<dyn JobRepository>,
    dedup: Arc<dyn DedupStore>,
    bus: Arc<dyn EventBus>,
}

const SOURCE: &str = "manager";

impl SubtitleRequestedHandler {
    pub fn new(job_repo: Arc<dyn JobRepository>, dedup: Arc<dyn DedupStore>, bus: Arc<dyn EventBus>) -> Self {
        Self { job_repo, dedup, bus }
    }

    async fn publish_failure(&self, envelope: &EventEnvelope, message: String) -> Result<(), BusError> {
        let payload = JobFailedPayload {
            error_type: ErrorType::InvalidRequest,
            message,
        };
        let failure = EventEnvelope::new(
            JOB_FAILED,
            envelope.job_id,
            SOURCE,
            serde_json::to_value(&payload)?,
        );
        self.bus.publish(JOB_FAILED, &failure).await
    }

    /// Persists a `PENDING` job row for `job_id` if one does not already
    /// exist. The scanner (and any other `subtitle.requested` publisher)
    /// does not persist a job record itself, so this must run before
    /// validation: a malformed or invalid payload still needs a row for
    /// the `job.failed` published below to transition to `FAILED` (§8
    /// scenario 6). Idempotent under redelivery: a job that already
    /// exists is left untouched rather than recreated.
    async fn ensure_job_persisted(
        &self,
        job_id: Uuid,
        video_url: &str,
        video_title: &str,
        language: &str,
    ) -> Result<(), BusError> {
        let existing = self.job_repo.get(job_id).await.map_err(|e| BusError::Publish(e.to_string()))?;
        if existing.is_some() {
            return Ok(());
        }
        let job = Job::with_id(job_id, video_url, video_title, language, None);
        self.job_repo.create(&job).await.map_err(|e| BusError::Publish(e.to_string()))
    }
}

#[async_trait]
impl MessageHandler for SubtitleRequestedHandler {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), BusError> {
        let body: SubtitleRequestedBody = match serde_json::from_value(envelope.payload.clone()) {
            Ok(body) => body,
            Err(err) => {
                self.ensure_job_persisted(envelope.job_id, "", "", "").await?;
                return self.publish_failure(&envelope, format!("malformed payload: {err}")).await;
            }
        };

        self.ensure_job_persisted(envelope.job_id, &body.video_url, &body.video_title, &body.language)
            .await?;

        if let Err(err) = validate_video_url(&body.video_url)
            .and_then(|_| validate_video_title(&body.video_title))
            .and_then(|_| validate_language_code(&body.language))
        {
            return self.publish_failure(&envelope, err.to_string()).await;
        }

        let check = self
            .dedup
            .check_and_register(&body.video_url, &body.language, envelope.job_id)
            .await;
        if check.is_duplicate {
            if let Some(existing) = check.existing_job_id {
                if existing != envelope.job_id {
                    tracing::info!(job_id = %envelope.job_id, existing = %existing, "true duplicate, skipping");
                    return Ok(());
                }
            }
            // Same id: scanner already registered it, this is the same job.
        }

        publish_download_task(
            self.bus.as_ref(),
            envelope.job_id,
            body.video_url,
            body.video_title,
            body.language,
            None,
        )
        .await
        .map_err(|e| BusError::Publish(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::JobEvent;
    use crate::domain::repositories::DuplicateCheckResult;
    use crate::domain::value_objects::JobStatus;
    use crate::infrastructure::bus::in_memory::InMemoryEventBus;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingJobRepo {
        jobs: Mutex<Vec<Job>>,
    }

    #[async_trait]
    impl JobRepository for RecordingJobRepo {
        async fn create(&self, job: &Job) -> Result<(), crate::shared::error::StoreError> {
            self.jobs.lock().await.push(job.clone());
            Ok(())
        }
        async fn get(&self, job_id: Uuid) -> Result<Option<Job>, crate::shared::error::StoreError> {
            Ok(self.jobs.lock().await.iter().find(|j| j.id == job_id).cloned())
        }
        async fn list(&self) -> Result<Vec<Job>, crate::shared::error::StoreError> {
            Ok(self.jobs.lock().await.clone())
        }
        async fn update_status(
            &self,
            job_id: Uuid,
            new_status: JobStatus,
            error_message: Option<String>,
        ) -> Result<(), crate::shared::error::StoreError> {
            let mut jobs = self.jobs.lock().await;
            let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) else {
                return Err(crate::shared::error::StoreError::JobNotFound(job_id.to_string()));
            };
            if crate::domain::value_objects::is_valid_transition(job.status, new_status) {
                job.status = new_status;
                job.error_message = error_message;
            }
            Ok(())
        }
        async fn set_result_url(&self, job_id: Uuid, result_url: String) -> Result<(), crate::shared::error::StoreError> {
            if let Some(job) = self.jobs.lock().await.iter_mut().find(|j| j.id == job_id) {
                job.result_url = Some(result_url);
            }
            Ok(())
        }
        async fn append_event(&self, _job_id: Uuid, _event: JobEvent) -> Result<(), crate::shared::error::StoreError> {
            Ok(())
        }
        async fn list_events(&self, _job_id: Uuid) -> Result<Vec<JobEvent>, crate::shared::error::StoreError> {
            Ok(vec![])
        }
    }

    struct NeverDuplicate;

    #[async_trait]
    impl DedupStore for NeverDuplicate {
        async fn check_and_register(&self, _video_url: &str, _language: &str, candidate_job_id: Uuid) -> DuplicateCheckResult {
            DuplicateCheckResult {
                is_duplicate: false,
                existing_job_id: Some(candidate_job_id),
                message: "registered".to_string(),
            }
        }
    }

    /// §8 scenario 6: a `subtitle.requested` event with an empty
    /// `video_url` must still leave a job row behind so the `job.failed`
    /// it triggers can actually transition that job to `FAILED`.
    #[tokio::test]
    async fn validation_failure_still_persists_a_job_the_consumer_can_fail() {
        let job_repo = Arc::new(RecordingJobRepo::default());
        let dedup = Arc::new(NeverDuplicate);
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = SubtitleRequestedHandler::new(job_repo.clone(), dedup, bus.clone());

        let job_id = Uuid::new_v4();
        let envelope = EventEnvelope::new(
            "subtitle.requested",
            job_id,
            "scanner",
            serde_json::json!({"video_url": "", "video_title": "A Movie", "language": "en"}),
        );

        handler.handle(envelope).await.unwrap();

        let job = job_repo.get(job_id).await.unwrap().expect("job must have been persisted before validation ran");
        assert_eq!(job.status, JobStatus::Pending);

        job_repo.update_status(job_id, JobStatus::Failed, Some("video_url must be non-empty".to_string())).await.unwrap();
        let failed = job_repo.get(job_id).await.unwrap().unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn malformed_payload_still_persists_a_job_the_consumer_can_fail() {
        let job_repo = Arc::new(RecordingJobRepo::default());
        let dedup = Arc::new(NeverDuplicate);
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = SubtitleRequestedHandler::new(job_repo.clone(), dedup, bus.clone());

        let job_id = Uuid::new_v4();
        let envelope = EventEnvelope::new("subtitle.requested", job_id, "scanner", serde_json::json!({"not": "a valid body"}));

        handler.handle(envelope).await.unwrap();

        assert!(job_repo.get(job_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn valid_request_persists_exactly_one_job_and_enqueues_download() {
        let job_repo = Arc::new(RecordingJobRepo::default());
        let dedup = Arc::new(NeverDuplicate);
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = SubtitleRequestedHandler::new(job_repo.clone(), dedup, bus.clone());

        let job_id = Uuid::new_v4();
        let envelope = EventEnvelope::new(
            "subtitle.requested",
            job_id,
            "scanner",
            serde_json::json!({"video_url": "/media/a.mp4", "video_title": "A Movie", "language": "en"}),
        );

        handler.handle(envelope).await.unwrap();

        assert_eq!(job_repo.jobs.lock().await.len(), 1);
    }
}
