//! The job store contract (§3 ownership: "the job store owns job records
//! and event logs"), an async trait implemented against a Redis-backed
//! store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Job, JobEvent};
use crate::domain::value_objects::JobStatus;
use crate::shared::error::StoreError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), StoreError>;

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>, StoreError>;

    async fn list(&self) -> Result<Vec<Job>, StoreError>;

    /// Applies a status transition iff it is valid per
    /// `domain::value_objects::is_valid_transition`; otherwise this is a
    /// silent no-op (idempotent handlers never error on a stale event).
    /// `updated_at` is refreshed only when the transition is applied.
    async fn update_status(
        &self,
        job_id: Uuid,
        new_status: JobStatus,
        error_message: Option<String>,
    ) -> Result<(), StoreError>;

    async fn set_result_url(&self, job_id: Uuid, result_url: String) -> Result<(), StoreError>;

    /// Appends an immutable entry to the job's event log.
    async fn append_event(&self, job_id: Uuid, event: JobEvent) -> Result<(), StoreError>;

    /// Returns the event log, most-recent first (LIFO), per §3.
    async fn list_events(&self, job_id: Uuid) -> Result<Vec<JobEvent>, StoreError>;
}
