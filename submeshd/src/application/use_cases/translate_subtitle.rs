//! The translator's per-message algorithm (§4.5): checkpoint-resumable
//! chunked translation. Structured after the downloader's use case —
//! a single orchestrating function driving an external client, writing
//! progress to the job store, and emitting terminal events — grounded
//! additionally in `original_source/src/translator/translation_worker.py`
//! for the chunk-loop and checkpoint-then-continue shape.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{SubtitleSegment, TranslationCheckpoint};
use crate::domain::events::event_type::{JOB_FAILED, SUBTITLE_TRANSLATED, TRANSLATION_COMPLETED};
use crate::domain::events::payloads::{JobFailedPayload, SubtitleTranslatedPayload, TranslationCompletedPayload};
use crate::domain::events::tasks::TranslationTask;
use crate::domain::events::EventEnvelope;
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::JobStatus;
use crate::infrastructure::bus::{EventBus, MessageHandler};
use crate::infrastructure::checkpoint::FsCheckpointStore;
use crate::infrastructure::external::llm::TranslationClient;
use crate::infrastructure::subtitle::filename::derive_translated_path;
use crate::infrastructure::subtitle::srt::{format_srt, parse_srt_or_fail};
use crate::shared::error::{ApplicationError, BusError, ErrorType};

const SOURCE: &str = "translator";

/// Chunks of at most this many subtitle lines are sent to the
/// translation client per request, per §4.5 step 3.
pub const MAX_CHUNK_SIZE: usize = 50;

/// Builds the downloadable URL for a completed translation (§4.5 step
/// 6): the configured base URL plus `{job_id}.{target_language}.srt`.
pub fn build_download_url(download_base_url: &str, job_id: Uuid, target_language: &str) -> String {
    format!("{}/{job_id}.{target_language}.srt", download_base_url.trim_end_matches('/'))
}

pub async fn handle_translation_task(
    job_repo: &dyn JobRepository,
    bus: &dyn EventBus,
    translation_client: &dyn TranslationClient,
    checkpoints: &FsCheckpointStore,
    download_base_url: &str,
    task: TranslationTask,
) -> Result<(), ApplicationError> {
    // Step: the translator is the other service allowed to write an
    // `*_IN_PROGRESS` projection directly (§4.7).
    job_repo
        .update_status(task.job_id, JobStatus::TranslateInProgress, None)
        .await?;

    let content = match tokio::fs::read_to_string(&task.source_path).await {
        Ok(content) => content,
        Err(_) => {
            return emit_job_failed(
                bus,
                task.job_id,
                ErrorType::FileNotFound,
                &format!("source subtitle not found at {}", task.source_path),
            )
            .await;
        }
    };

    let segments = match parse_srt_or_fail(&content) {
        Ok(segments) => segments,
        Err(err) => return emit_job_failed(bus, task.job_id, ErrorType::ProcessingError, &err.to_string()).await,
    };

    let chunks: Vec<&[SubtitleSegment]> = segments.chunks(MAX_CHUNK_SIZE).collect();
    let total_chunks = chunks.len();

    let mut checkpoint = match checkpoints.load(task.job_id, &task.target_language).await {
        Ok(Some(existing)) if existing.matches(&task.source_path, &task.source_language, &task.target_language) => {
            info!(job_id = %task.job_id, completed = existing.completed_chunks.len(), total_chunks, "resuming from checkpoint");
            existing
        }
        Ok(Some(_)) => {
            warn!(job_id = %task.job_id, "checkpoint metadata mismatch, restarting from scratch");
            TranslationCheckpoint::new(task.job_id, &task.source_path, &task.source_language, &task.target_language, total_chunks)
        }
        Ok(None) => TranslationCheckpoint::new(task.job_id, &task.source_path, &task.source_language, &task.target_language, total_chunks),
        Err(err) => return emit_job_failed(bus, task.job_id, ErrorType::ProcessingError, &err.to_string()).await,
    };

    for (chunk_index, chunk) in chunks.iter().enumerate() {
        if checkpoint.is_chunk_complete(chunk_index) {
            continue;
        }

        let texts: Vec<String> = chunk.iter().map(|s| s.text.clone()).collect();
        let translated_texts = match translation_client
            .translate_chunk(&texts, &task.source_language, &task.target_language)
            .await
        {
            Ok(texts) => texts,
            Err(err) => {
                return emit_job_failed(bus, task.job_id, ErrorType::TranslationError, &err.to_string()).await;
            }
        };

        let translated_segments: Vec<SubtitleSegment> = chunk
            .iter()
            .zip(translated_texts.into_iter())
            .map(|(original, text)| SubtitleSegment {
                index: original.index,
                start: original.start.clone(),
                end: original.end.clone(),
                text,
            })
            .collect();

        checkpoint.mark_chunk_complete(chunk_index, translated_segments);
        checkpoints.save(&checkpoint).await?;

        let progress = EventEnvelope::new(
            TRANSLATION_COMPLETED,
            task.job_id,
            SOURCE,
            serde_json::to_value(&TranslationCompletedPayload {
                target_language: task.target_language.clone(),
                chunks_completed: checkpoint.completed_chunks.len(),
                total_chunks,
            })?,
        );
        bus.publish(TRANSLATION_COMPLETED, &progress).await?;
    }

    let output_path = derive_translated_path(Path::new(&task.source_path), &task.target_language);
    let formatted = format_srt(&checkpoint.translated_segments);
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&output_path, formatted).await?;

    checkpoints.delete(task.job_id, &task.target_language).await?;

    let download_url = build_download_url(download_base_url, task.job_id, &task.target_language);

    // Step 6: the translator is the other service allowed to write a
    // terminal projection directly (§4.7) — `DONE` with the result URL,
    // on overall success, before the Consumer's own event-log-driven
    // projection runs (the latter is then a same-state no-op).
    job_repo.set_result_url(task.job_id, download_url.clone()).await?;
    job_repo.update_status(task.job_id, JobStatus::Done, None).await?;

    let payload = SubtitleTranslatedPayload {
        path: output_path.display().to_string(),
        source_language: task.source_language.clone(),
        target_language: task.target_language.clone(),
        url: download_url,
    };
    let envelope = EventEnvelope::new(SUBTITLE_TRANSLATED, task.job_id, SOURCE, serde_json::to_value(&payload)?);
    bus.publish(SUBTITLE_TRANSLATED, &envelope).await?;
    Ok(())
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

/// Adapts `handle_translation_task` to `MessageHandler` for the
/// translator binary's consumer loop, bound to the translation queue's
/// routing key.
pub struct TranslationTaskHandler {
    job_repo: Arc<dyn JobRepository>,
    bus: Arc<dyn EventBus>,
    translation_client: Arc<dyn TranslationClient>,
    checkpoints: Arc<FsCheckpointStore>,
    download_base_url: String,
}

impl TranslationTaskHandler {
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        bus: Arc<dyn EventBus>,
        translation_client: Arc<dyn TranslationClient>,
        checkpoints: Arc<FsCheckpointStore>,
        download_base_url: impl Into<String>,
    ) -> Self {
        Self {
            job_repo,
            bus,
            translation_client,
            checkpoints,
            download_base_url: download_base_url.into(),
        }
    }
}

#[async_trait]
impl MessageHandler for TranslationTaskHandler {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), BusError> {
        let task: TranslationTask = serde_json::from_value(envelope.payload)?;
        handle_translation_task(
            self.job_repo.as_ref(),
            self.bus.as_ref(),
            self.translation_client.as_ref(),
            self.checkpoints.as_ref(),
            &self.download_base_url,
            task,
        )
        .await
        .map_err(|e| BusError::Publish(e.to_string()))
    }
}
