//! Projects `subtitle.translate.requested` onto `TRANSLATE_QUEUED`
//! (§4.7). This is observability only: it never creates a translation
//! task itself (see §9 note a) — the task is published directly to the
//! translation queue by whichever service decided to translate.

use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::JobStatus;
use crate::shared::error::StoreError;

pub async fn handle(job_repo: &dyn JobRepository, envelope: &EventEnvelope) -> Result<(), StoreError> {
    job_repo
        .update_status(envelope.job_id, JobStatus::TranslateQueued, None)
        .await
}
