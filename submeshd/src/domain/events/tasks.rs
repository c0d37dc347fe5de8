//! Direct-routed task bodies for the download and translation queues
//! (§4.4, §4.5). These are work items, not broadcast events, but they
//! travel over the same topic exchange with a direct routing key equal
//! to the queue name.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTask {
    pub job_id: Uuid,
    pub video_url: String,
    pub video_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalogue_id: Option<String>,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationTask {
    pub job_id: Uuid,
    pub source_path: String,
    pub source_language: String,
    pub target_language: String,
}
