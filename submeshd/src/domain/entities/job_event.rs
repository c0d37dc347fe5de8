//! A single, immutable entry in a job's append-only event log (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub event_type: String,
    pub payload: Value,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl JobEvent {
    pub fn new(event_type: impl Into<String>, payload: Value, source: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            source: source.into(),
            timestamp: Utc::now(),
        }
    }
}
