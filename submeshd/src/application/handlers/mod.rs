//! The Consumer's event dispatcher: appends every event to the job's
//! log, then applies the deterministic status projection of §4.7's
//! table. One handler module per event type.

pub mod download_requested_handler;
pub mod failed_handler;
pub mod media_detected_handler;
pub mod missing_handler;
pub mod ready_handler;
pub mod translate_requested_handler;
pub mod translated_handler;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::JobEvent;
use crate::domain::events::event_type::*;
use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::infrastructure::bus::MessageHandler;
use crate::shared::error::{BusError, StoreError};

pub struct ConsumerDispatcher {
    job_repo: Arc<dyn JobRepository>,
    source: String,
}

impl ConsumerDispatcher {
    pub fn new(job_repo: Arc<dyn JobRepository>, source: impl Into<String>) -> Self {
        Self {
            job_repo,
            source: source.into(),
        }
    }

    pub async fn dispatch(&self, envelope: &EventEnvelope) -> Result<(), StoreError> {
        let event = JobEvent::new(envelope.event_type.clone(), envelope.payload.clone(), self.source.clone());
        self.job_repo.append_event(envelope.job_id, event).await?;

        match envelope.event_type.as_str() {
            SUBTITLE_DOWNLOAD_REQUESTED => download_requested_handler::handle(self.job_repo.as_ref(), envelope).await,
            SUBTITLE_TRANSLATE_REQUESTED => translate_requested_handler::handle(self.job_repo.as_ref(), envelope).await,
            SUBTITLE_READY => ready_handler::handle(self.job_repo.as_ref(), envelope).await,
            SUBTITLE_TRANSLATED => translated_handler::handle(self.job_repo.as_ref(), envelope).await,
            SUBTITLE_MISSING => missing_handler::handle(self.job_repo.as_ref(), envelope).await,
            JOB_FAILED => failed_handler::handle(self.job_repo.as_ref(), envelope).await,
            MEDIA_FILE_DETECTED => media_detected_handler::handle(self.job_repo.as_ref(), envelope).await,
            // subtitle.requested and other unbound routing keys are not
            // part of the Consumer's projection table; log and ignore.
            other => {
                tracing::debug!(event_type = other, "no status projection for this event type");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl MessageHandler for ConsumerDispatcher {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), BusError> {
        self.dispatch(&envelope)
            .await
            .map_err(|e| BusError::Publish(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Job;
    use crate::domain::value_objects::JobStatus;
    use serde_json::json;

    // Exercises the dispatcher's routing table against an in-memory
    // fake repository, since a real Redis instance is not available in
    // unit tests.
    struct FakeJobRepo {
        job: tokio::sync::Mutex<Job>,
        events: tokio::sync::Mutex<Vec<JobEvent>>,
    }

    #[async_trait]
    impl JobRepository for FakeJobRepo {
        async fn create(&self, _job: &Job) -> Result<(), StoreError> {
            Ok(())
        }
        async fn get(&self, _job_id: uuid::Uuid) -> Result<Option<Job>, StoreError> {
            Ok(Some(self.job.lock().await.clone()))
        }
        async fn list(&self) -> Result<Vec<Job>, StoreError> {
            Ok(vec![self.job.lock().await.clone()])
        }
        async fn update_status(
            &self,
            _job_id: uuid::Uuid,
            new_status: JobStatus,
            error_message: Option<String>,
        ) -> Result<(), StoreError> {
            let mut job = self.job.lock().await;
            if crate::domain::value_objects::is_valid_transition(job.status, new_status) {
                job.status = new_status;
                job.error_message = error_message;
            }
            Ok(())
        }
        async fn set_result_url(&self, _job_id: uuid::Uuid, result_url: String) -> Result<(), StoreError> {
            self.job.lock().await.result_url = Some(result_url);
            Ok(())
        }
        async fn append_event(&self, _job_id: uuid::Uuid, event: JobEvent) -> Result<(), StoreError> {
            self.events.lock().await.push(event);
            Ok(())
        }
        async fn list_events(&self, _job_id: uuid::Uuid) -> Result<Vec<JobEvent>, StoreError> {
            Ok(self.events.lock().await.clone())
        }
    }

    #[tokio::test]
    async fn ready_event_projects_done_and_sets_result_url() {
        let mut job = Job::new("/m/a.mp4", "A", "en", None);
        job.status = JobStatus::DownloadInProgress;
        let job_id = job.id;
        let repo = Arc::new(FakeJobRepo {
            job: tokio::sync::Mutex::new(job),
            events: tokio::sync::Mutex::new(Vec::new()),
        });
        let dispatcher = ConsumerDispatcher::new(repo.clone(), "consumer");

        let envelope = EventEnvelope::new(
            SUBTITLE_READY,
            job_id,
            "downloader",
            json!({"path": "/m/a.en.srt", "language": "en", "url": "file:///m/a.en.srt"}),
        );
        dispatcher.dispatch(&envelope).await.unwrap();

        let updated = repo.get(job_id).await.unwrap().unwrap();
        assert_eq!(updated.status, JobStatus::Done);
        assert_eq!(updated.result_url.as_deref(), Some("file:///m/a.en.srt"));
    }

    #[tokio::test]
    async fn failed_event_projects_failed_with_message() {
        let job = Job::new("", "A", "en", None);
        let job_id = job.id;
        let repo = Arc::new(FakeJobRepo {
            job: tokio::sync::Mutex::new(job),
            events: tokio::sync::Mutex::new(Vec::new()),
        });
        let dispatcher = ConsumerDispatcher::new(repo.clone(), "consumer");

        let envelope = EventEnvelope::new(
            JOB_FAILED,
            job_id,
            "manager",
            json!({"error_type": "invalid_request", "message": "video_url must be non-empty"}),
        );
        dispatcher.dispatch(&envelope).await.unwrap();

        let updated = repo.get(job_id).await.unwrap().unwrap();
        assert_eq!(updated.status, JobStatus::Failed);
        assert_eq!(updated.error_message.as_deref(), Some("video_url must be non-empty"));
    }

    #[tokio::test]
    async fn media_detected_is_audit_only() {
        let job = Job::new("/m/a.mp4", "A", "en", None);
        let job_id = job.id;
        let original_status = job.status;
        let repo = Arc::new(FakeJobRepo {
            job: tokio::sync::Mutex::new(job),
            events: tokio::sync::Mutex::new(Vec::new()),
        });
        let dispatcher = ConsumerDispatcher::new(repo.clone(), "consumer");

        let envelope = EventEnvelope::new(MEDIA_FILE_DETECTED, job_id, "scanner", json!({"path": "/m/a.mp4"}));
        dispatcher.dispatch(&envelope).await.unwrap();

        let updated = repo.get(job_id).await.unwrap().unwrap();
        assert_eq!(updated.status, original_status);
        assert_eq!(repo.list_events(job_id).await.unwrap().len(), 1);
    }
}
