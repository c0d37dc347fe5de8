//! Response shapes for `GET /subtitles/status/{job_id}` and
//! `GET /subtitles/{job_id}/events` (§6.1). The job record itself is
//! returned as the domain `Job` directly: no view-specific shaping is
//! needed, so it serialises straight out of `presentation`.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::JobEvent;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: Uuid,
    pub status: &'static str,
    pub progress: u8,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobEventDto {
    pub event_type: String,
    pub payload: serde_json::Value,
    pub source: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<JobEvent> for JobEventDto {
    fn from(event: JobEvent) -> Self {
        Self {
            event_type: event.event_type,
            payload: event.payload,
            source: event.source,
            timestamp: event.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub job_id: Uuid,
    pub event_count: usize,
    pub events: Vec<JobEventDto>,
}
