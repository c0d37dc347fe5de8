//! Router assembly for the manager's HTTP surface, grounded in the
//! teacher's `main.rs` `Router::new().route(...).layer(...).with_state(...)`
//! idiom.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{health_handlers, queue_handlers, subtitle_handlers, webhook_handlers};
use super::middleware::logging::logging_middleware;
use super::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handlers::health_check))
        .route("/health/consumer", get(health_handlers::consumer_health))
        .route("/subtitles", get(subtitle_handlers::list_jobs))
        .route("/subtitles/download", post(subtitle_handlers::create_download))
        .route("/subtitles/translate", post(subtitle_handlers::create_translate))
        .route("/subtitles/status/:job_id", get(subtitle_handlers::get_status))
        .route("/subtitles/:job_id/events", get(subtitle_handlers::get_events))
        .route("/subtitles/:job_id", get(subtitle_handlers::get_job))
        .route("/webhooks/jellyfin", post(webhook_handlers::jellyfin_webhook))
        .route("/scan", post(queue_handlers::forward_scan))
        .route("/queue/status", get(queue_handlers::queue_status))
        .layer(axum::middleware::from_fn(logging_middleware))
        .with_state(state)
}
