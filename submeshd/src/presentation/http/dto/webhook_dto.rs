//! Response body for `POST /webhooks/jellyfin` (§6.1). Wraps the
//! use case's `WebhookOutcome` so the HTTP status code and body shape
//! stay a presentation concern.

use serde::Serialize;

use crate::application::use_cases::WebhookOutcome;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    #[serde(flatten)]
    pub outcome: WebhookOutcome,
}
