//! Projects `job.failed` onto `FAILED`, carrying the error message
//! (§4.7).

use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::JobStatus;
use crate::shared::error::StoreError;

pub async fn handle(job_repo: &dyn JobRepository, envelope: &EventEnvelope) -> Result<(), StoreError> {
    let message = envelope
        .payload
        .get("message")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    job_repo
        .update_status(envelope.job_id, JobStatus::Failed, message)
        .await
}
