//! `POST /webhooks/jellyfin` (§6.1).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::use_cases::{handle_webhook, WebhookOutcome, WebhookRequest};
use crate::presentation::http::dto::WebhookResponse;
use crate::presentation::http::state::AppState;

pub async fn jellyfin_webhook(State(state): State<Arc<AppState>>, Json(body): Json<WebhookRequest>) -> impl IntoResponse {
    let outcome = handle_webhook(
        state.job_repo.as_ref(),
        state.dedup.as_ref(),
        state.bus.as_ref(),
        &state.webhook_default_language,
        body,
    )
    .await;

    let status = match &outcome {
        WebhookOutcome::Received { .. } => StatusCode::CREATED,
        WebhookOutcome::Duplicate { .. } => StatusCode::OK,
        WebhookOutcome::Ignored => StatusCode::OK,
        WebhookOutcome::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(WebhookResponse { outcome }))
}
