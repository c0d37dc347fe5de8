//! The `Job` aggregate of §3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::JobStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub video_url: String,
    pub video_title: String,
    pub language: String,
    pub target_language: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error_message: Option<String>,
    pub result_url: Option<String>,
}

impl Job {
    /// Builds a fresh `PENDING` job with a random 128-bit identifier.
    /// `target_language == language` is rejected by the caller before
    /// this constructor is reached (see `domain::services::validation`).
    pub fn new(
        video_url: impl Into<String>,
        video_title: impl Into<String>,
        language: impl Into<String>,
        target_language: Option<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), video_url, video_title, language, target_language)
    }

    /// Builds a fresh `PENDING` job with a caller-supplied identifier;
    /// used when the id must match one already registered in the dedup
    /// store (e.g. the webhook adapter's candidate id).
    pub fn with_id(
        id: Uuid,
        video_url: impl Into<String>,
        video_title: impl Into<String>,
        language: impl Into<String>,
        target_language: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            video_url: video_url.into(),
            video_title: video_title.into(),
            language: language.into(),
            target_language,
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
            error_message: None,
            result_url: None,
        }
    }
}
