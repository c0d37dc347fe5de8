//! The downloader's per-message algorithm (§4.4): the download-or-
//! fallback-to-translate decision tree, structured as a single
//! orchestrating function driving an external client, writing progress
//! to the job store, and emitting terminal events over the distributed
//! bus.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::use_cases::create_translate_job::publish_translation_task;
use crate::domain::events::event_type::{JOB_FAILED, SUBTITLE_MISSING, SUBTITLE_READY};
use crate::domain::events::payloads::{JobFailedPayload, SubtitleMissingPayload, SubtitleReadyPayload};
use crate::domain::events::tasks::DownloadTask;
use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::domain::services::fingerprint::compute_fingerprint;
use crate::domain::value_objects::language_code::normalize_to_iso639_1;
use crate::domain::value_objects::JobStatus;
use crate::infrastructure::bus::{EventBus, MessageHandler};
use crate::infrastructure::external::catalogue::{CatalogueClient, CatalogueResult};
use crate::infrastructure::subtitle::filename::{derive_subtitle_path, is_local_file_path, to_local_path};
use crate::shared::error::{ApplicationError, BusError, CatalogueError, ErrorType};

const SOURCE: &str = "downloader";

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub translation_enabled: bool,
    pub fallback_language: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            translation_enabled: true,
            fallback_language: "en".to_string(),
        }
    }
}

pub async fn handle_download_task(
    job_repo: &dyn JobRepository,
    bus: &dyn EventBus,
    catalogue: &dyn CatalogueClient,
    config: &DownloaderConfig,
    task: DownloadTask,
) -> Result<(), ApplicationError> {
    // Step 1: the downloader is one of the two services allowed to
    // write an `*_IN_PROGRESS` projection directly (§4.7).
    job_repo
        .update_status(task.job_id, JobStatus::DownloadInProgress, None)
        .await?;

    let local_path = to_local_path(&task.video_url);
    let is_local = is_local_file_path(&task.video_url);

    // Step 2: content fingerprint, local files only, >= 128 KiB.
    let fingerprint = if is_local {
        compute_fingerprint(&local_path).ok().flatten()
    } else {
        None
    };
    let file_size = if is_local {
        std::fs::metadata(&local_path).map(|m| m.len()).unwrap_or(0)
    } else {
        0
    };

    // Step 3: search in the desired language.
    let primary = search_catalogue(
        catalogue,
        fingerprint.as_deref(),
        file_size,
        task.catalogue_id.as_deref(),
        &task.video_title,
        &task.language,
    )
    .await;

    match primary {
        Ok(results) if !results.is_empty() => {
            return complete_with_result(
                job_repo,
                bus,
                catalogue,
                task.job_id,
                is_local,
                &local_path,
                &task.language,
                &results[0],
            )
            .await;
        }
        Ok(_) => {
            // Empty result set: fall through to the fallback/miss branches below.
        }
        Err(CatalogueError::RateLimit) => {
            return emit_job_failed(bus, task.job_id, ErrorType::RateLimit, "catalogue rate limit exceeded").await;
        }
        Err(CatalogueError::Authentication(msg)) => {
            return handle_degraded_fallback(bus, config, task, ErrorType::AuthenticationError, msg).await;
        }
        Err(CatalogueError::Api(msg)) => {
            return handle_degraded_fallback(bus, config, task, ErrorType::ApiError, msg).await;
        }
        Err(CatalogueError::Json(err)) => {
            return emit_job_failed(bus, task.job_id, ErrorType::JsonParseError, &err.to_string()).await;
        }
        Err(CatalogueError::Http(err)) => {
            return emit_job_failed(bus, task.job_id, ErrorType::ApiError, &err.to_string()).await;
        }
    }

    // Step 5/6/7: no hit in the desired language.
    if !config.translation_enabled {
        return emit_missing(bus, task.job_id, &task.language, "no translation configured").await;
    }

    let fallback = fallback_search(catalogue, fingerprint.as_deref(), file_size, &task.video_title, &config.fallback_language).await;
    match fallback {
        Ok(Some(result)) => {
            complete_fallback_and_queue_translation(
                job_repo,
                bus,
                catalogue,
                task.job_id,
                is_local,
                &local_path,
                &task.language,
                &result,
            )
            .await
        }
        Ok(None) => emit_missing(bus, task.job_id, &task.language, "no subtitle found in any language").await,
        Err(err) => emit_job_failed(bus, task.job_id, ErrorType::ApiError, &err.to_string()).await,
    }
}

async fn search_catalogue(
    catalogue: &dyn CatalogueClient,
    fingerprint: Option<&str>,
    file_size: u64,
    catalogue_id: Option<&str>,
    title: &str,
    language: &str,
) -> Result<Vec<CatalogueResult>, CatalogueError> {
    if let Some(fp) = fingerprint {
        let by_fingerprint = catalogue.search_by_fingerprint(fp, file_size, language).await?;
        if !by_fingerprint.is_empty() {
            return Ok(by_fingerprint);
        }
    }
    catalogue.search_by_metadata(catalogue_id, title, language).await
}

/// Step 5a/5b: fingerprint then metadata in the fallback language, then
/// any language at all.
async fn fallback_search(
    catalogue: &dyn CatalogueClient,
    fingerprint: Option<&str>,
    file_size: u64,
    title: &str,
    fallback_language: &str,
) -> Result<Option<CatalogueResult>, CatalogueError> {
    let in_fallback = search_catalogue(catalogue, fingerprint, file_size, None, title, fallback_language).await?;
    if let Some(result) = in_fallback.into_iter().next() {
        return Ok(Some(result));
    }
    let any_language = catalogue.search_any_language(fingerprint, title).await?;
    Ok(any_language.into_iter().next())
}

async fn complete_with_result(
    job_repo: &dyn JobRepository,
    bus: &dyn EventBus,
    catalogue: &dyn CatalogueClient,
    job_id: Uuid,
    is_local: bool,
    local_path: &Path,
    language: &str,
    result: &CatalogueResult,
) -> Result<(), ApplicationError> {
    if !is_local {
        return emit_job_failed(bus, job_id, ErrorType::InvalidVideoPath, "video_url is not a local file").await;
    }
    let output_path = derive_subtitle_path(local_path, language);
    catalogue.download(result, &output_path).await?;

    let _ = job_repo; // status transition to DONE is owned by the Consumer projection (§4.7)
    let payload = SubtitleReadyPayload {
        path: output_path.display().to_string(),
        language: language.to_string(),
        url: format!("file://{}", output_path.display()),
    };
    let envelope = EventEnvelope::new(SUBTITLE_READY, job_id, SOURCE, serde_json::to_value(&payload)?);
    bus.publish(SUBTITLE_READY, &envelope).await?;
    Ok(())
}

async fn complete_fallback_and_queue_translation(
    job_repo: &dyn JobRepository,
    bus: &dyn EventBus,
    catalogue: &dyn CatalogueClient,
    job_id: Uuid,
    is_local: bool,
    local_path: &Path,
    target_language: &str,
    result: &CatalogueResult,
) -> Result<(), ApplicationError> {
    if !is_local {
        return emit_job_failed(bus, job_id, ErrorType::InvalidVideoPath, "video_url is not a local file").await;
    }
    let source_language = normalize_to_iso639_1(&result.language);
    let output_path = derive_subtitle_path(local_path, &source_language);
    catalogue.download(result, &output_path).await?;

    if !output_path.is_file() {
        return emit_job_failed(bus, job_id, ErrorType::FileNotFound, "downloaded subtitle missing from disk").await;
    }
    let _ = job_repo;

    publish_translation_task(
        bus,
        job_id,
        output_path.display().to_string(),
        source_language,
        target_language.to_string(),
        None,
    )
    .await
}

/// §4.4 step 8: `api_error`/`authentication_error` fall back to
/// translation using the fallback language, with a `degraded` marker —
/// the translation request points at a subtitle path the downloader
/// has not actually created (§9 note c); the translator's
/// `file_not_found` handling is the intended recovery.
async fn handle_degraded_fallback(
    bus: &dyn EventBus,
    config: &DownloaderConfig,
    task: DownloadTask,
    error_type: ErrorType,
    message: String,
) -> Result<(), ApplicationError> {
    if !config.translation_enabled {
        return emit_job_failed(bus, task.job_id, error_type, &message).await;
    }
    let local_path = to_local_path(&task.video_url);
    let assumed_path = derive_subtitle_path(&local_path, &config.fallback_language);
    publish_translation_task(
        bus,
        task.job_id,
        assumed_path.display().to_string(),
        config.fallback_language.clone(),
        task.language.clone(),
        Some(true),
    )
    .await
}

async fn emit_job_failed(
    bus: &dyn EventBus,
    job_id: Uuid,
    error_type: ErrorType,
    message: &str,
) -> Result<(), ApplicationError> {
    let payload = JobFailedPayload {
        error_type,
        message: message.to_string(),
    };
    let envelope = EventEnvelope::new(JOB_FAILED, job_id, SOURCE, serde_json::to_value(&payload)?);
    bus.publish(JOB_FAILED, &envelope).await?;
    Ok(())
}

async fn emit_missing(bus: &dyn EventBus, job_id: Uuid, language: &str, reason: &str) -> Result<(), ApplicationError> {
    let payload = SubtitleMissingPayload {
        language: language.to_string(),
        reason: Some(reason.to_string()),
    };
    let envelope = EventEnvelope::new(SUBTITLE_MISSING, job_id, SOURCE, serde_json::to_value(&payload)?);
    bus.publish(SUBTITLE_MISSING, &envelope).await?;
    Ok(())
}

/// Adapts `handle_download_task` to `MessageHandler` so the downloader
/// binary can register it directly on a consumer loop bound to the
/// download queue's routing key.
pub struct DownloadTaskHandler {
    job_repo: Arc<dyn JobRepository>,
    bus: Arc<dyn EventBus>,
    catalogue: Arc<dyn CatalogueClient>,
    config: DownloaderConfig,
}

impl DownloadTaskHandler {
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        bus: Arc<dyn EventBus>,
        catalogue: Arc<dyn CatalogueClient>,
        config: DownloaderConfig,
    ) -> Self {
        Self {
            job_repo,
            bus,
            catalogue,
            config,
        }
    }
}

#[async_trait]
impl MessageHandler for DownloadTaskHandler {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), BusError> {
        let task: DownloadTask = serde_json::from_value(envelope.payload)?;
        handle_download_task(self.job_repo.as_ref(), self.bus.as_ref(), self.catalogue.as_ref(), &self.config, task)
            .await
            .map_err(|e| BusError::Publish(e.to_string()))
    }
}
