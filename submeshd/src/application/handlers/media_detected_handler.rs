//! `media.file.detected` is audit-only: the event is appended to the
//! job log by the dispatcher, but no status projection happens here
//! (§4.7).

use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::shared::error::StoreError;

pub async fn handle(_job_repo: &dyn JobRepository, _envelope: &EventEnvelope) -> Result<(), StoreError> {
    Ok(())
}
