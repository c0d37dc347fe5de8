//! Typed event payloads, one struct per event type of §6.2, mirroring the
//! teacher's one-struct-per-domain-event module layout
//! (`domain/events/subtitle_generation.rs`, `media_identified.rs`) but
//! serialised into the generic `EventEnvelope::payload` map instead of
//! being dispatched in-process via `TypeId`.

use serde::{Deserialize, Serialize};

use crate::shared::error::ErrorType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleRequestedPayload {
    pub video_url: String,
    pub video_title: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequestedPayload {
    pub video_url: String,
    pub video_title: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleReadyPayload {
    pub path: String,
    pub language: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleMissingPayload {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequestedPayload {
    pub source_path: String,
    pub source_language: String,
    pub target_language: String,
    /// Set when the downloader's `api_error_fallback` branch publishes
    /// this observationally for a file it has not actually created
    /// (see §9 note c); the translator's `file_not_found` handling is
    /// the intended recovery path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleTranslatedPayload {
    pub path: String,
    pub source_language: String,
    pub target_language: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationCompletedPayload {
    pub target_language: String,
    pub chunks_completed: usize,
    pub total_chunks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFileDetectedPayload {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFailedPayload {
    pub error_type: ErrorType,
    pub message: String,
}
