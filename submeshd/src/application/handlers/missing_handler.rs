//! Projects `subtitle.missing` onto `SUBTITLE_MISSING` (§4.7).

use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::JobStatus;
use crate::shared::error::StoreError;

pub async fn handle(job_repo: &dyn JobRepository, envelope: &EventEnvelope) -> Result<(), StoreError> {
    job_repo
        .update_status(envelope.job_id, JobStatus::SubtitleMissing, None)
        .await
}
