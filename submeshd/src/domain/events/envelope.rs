//! The JSON envelope every bus message carries, per §6.2.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: String,
    pub job_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, job_id: Uuid, source: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            job_id,
            timestamp: Utc::now(),
            source: source.into(),
            payload,
            correlation_id: None,
            metadata: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}
