//! `/subtitles*` handlers (§6.1): extract state, run a use case, map
//! the outcome onto a status code and JSON body.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::use_cases::{create_download_job, create_translate_job, DownloadJobRequest, TranslateJobRequest};
use crate::presentation::http::dto::{EventsResponse, StatusResponse};
use crate::presentation::http::state::AppState;
use crate::shared::error::ApplicationError;

#[derive(Debug, Deserialize)]
pub struct CreateDownloadBody {
    pub video_url: String,
    pub video_title: String,
    pub language: String,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub preferred_sources: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTranslateBody {
    pub subtitle_path: String,
    pub source_language: String,
    pub target_language: String,
    #[serde(default)]
    pub video_title: Option<String>,
}

pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let jobs = state.job_repo.list().await.map_err(ApplicationError::from)?;
    Ok(Json(jobs))
}

pub async fn get_job(State(state): State<Arc<AppState>>, Path(job_id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    match state.job_repo.get(job_id).await.map_err(ApplicationError::from)? {
        Some(job) => Ok(Json(job)),
        None => Err(ApiError::NotFound),
    }
}

pub async fn get_status(State(state): State<Arc<AppState>>, Path(job_id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    match state.job_repo.get(job_id).await.map_err(ApplicationError::from)? {
        Some(job) => Ok(Json(StatusResponse {
            id: job.id,
            status: job.status.as_str(),
            progress: job.status.progress(),
            message: job.error_message,
        })),
        None => Err(ApiError::NotFound),
    }
}

pub async fn get_events(State(state): State<Arc<AppState>>, Path(job_id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    if state.job_repo.get(job_id).await.map_err(ApplicationError::from)?.is_none() {
        return Err(ApiError::NotFound);
    }
    let events = state.job_repo.list_events(job_id).await.map_err(ApplicationError::from)?;
    let events: Vec<_> = events.into_iter().map(Into::into).collect();
    Ok(Json(EventsResponse {
        job_id,
        event_count: events.len(),
        events,
    }))
}

pub async fn create_download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateDownloadBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = DownloadJobRequest {
        video_url: body.video_url,
        video_title: body.video_title,
        language: body.language,
        target_language: body.target_language,
        preferred_sources: body.preferred_sources,
    };
    let job = create_download_job(state.job_repo.as_ref(), state.bus.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn create_translate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTranslateBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = TranslateJobRequest {
        subtitle_path: body.subtitle_path,
        source_language: body.source_language,
        target_language: body.target_language,
        video_title: body.video_title,
    };
    let job = create_translate_job(state.job_repo.as_ref(), state.bus.as_ref(), request).await?;
    Ok((StatusCode::OK, Json(job)))
}

/// Maps `ApplicationError` onto the 422/404/5xx split mandated by
/// §6.1: validation failures are client errors, everything else is an
/// internal error surfaced with its message for operator visibility.
pub enum ApiError {
    NotFound,
    Validation(String),
    Internal(String),
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(domain_err) => ApiError::Validation(domain_err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "job not found".to_string()),
            ApiError::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
