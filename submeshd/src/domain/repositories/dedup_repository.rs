//! Duplicate-suppression contract (§4.6), grounded byte-for-byte in
//! `original_source/common/duplicate_prevention.py`'s
//! `DuplicatePreventionService.check_and_register`.

use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCheckResult {
    pub is_duplicate: bool,
    pub existing_job_id: Option<Uuid>,
    pub message: String,
}

#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Atomic "GET if exists; else SET with TTL W". On backend
    /// unavailability, returns `is_duplicate: false` (graceful
    /// degradation) rather than erroring, per §4.6.
    async fn check_and_register(
        &self,
        video_url: &str,
        language: &str,
        candidate_job_id: Uuid,
    ) -> DuplicateCheckResult;
}
