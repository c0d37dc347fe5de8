//! Projects `subtitle.ready` onto `DONE` and records the result URL
//! (§4.7).

use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::JobStatus;
use crate::shared::error::StoreError;

pub async fn handle(job_repo: &dyn JobRepository, envelope: &EventEnvelope) -> Result<(), StoreError> {
    if let Some(url) = envelope.payload.get("url").and_then(|v| v.as_str()) {
        job_repo.set_result_url(envelope.job_id, url.to_string()).await?;
    }
    job_repo.update_status(envelope.job_id, JobStatus::Done, None).await
}
