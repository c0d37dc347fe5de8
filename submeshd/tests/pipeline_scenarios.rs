//! End-to-end coverage of the six pipeline scenarios: a direct catalogue
//! hit, a miss with translation disabled, a miss that falls back to
//! translation, a translator crash-and-resume, two rapid identical
//! webhooks colliding on dedup, and a validation failure. Each test
//! drives the real use-case functions (not mocks of them) across a
//! shared in-memory job repository and a small recording event bus,
//! manually handing the envelope each stage publishes to the next stage,
//! and asserting on repository state afterwards.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use submeshd::application::handlers::ConsumerDispatcher;
use submeshd::application::use_cases::create_download_job::{create_download_job, DownloadJobRequest};
use submeshd::application::use_cases::download_subtitle::{handle_download_task, DownloaderConfig};
use submeshd::application::use_cases::handle_webhook::{handle_webhook, WebhookOutcome, WebhookRequest};
use submeshd::application::use_cases::translate_subtitle::handle_translation_task;
use submeshd::domain::entities::{Job, JobEvent};
use submeshd::domain::events::event_type::*;
use submeshd::domain::events::tasks::{DownloadTask, TranslationTask};
use submeshd::domain::events::EventEnvelope;
use submeshd::domain::repositories::{DedupStore, DuplicateCheckResult, JobRepository};
use submeshd::domain::value_objects::JobStatus;
use submeshd::infrastructure::bus::{ConsumerConfig, EventBus, MessageHandler};
use submeshd::infrastructure::checkpoint::FsCheckpointStore;
use submeshd::infrastructure::external::catalogue::{CatalogueClient, CatalogueResult};
use submeshd::infrastructure::external::llm::TranslationClient;
use submeshd::shared::error::{BusError, CatalogueError, StoreError, TranslationError};
use submeshd::shared::shutdown::ShutdownSignal;

/// A multi-job in-memory `JobRepository`, enforcing the same transition
/// table the Redis-backed store does, so the dispatcher tests exercise
/// real idempotency rather than an always-accepting stub.
#[derive(Default)]
struct InMemoryJobRepo {
    jobs: Mutex<HashMap<Uuid, Job>>,
    events: Mutex<HashMap<Uuid, Vec<JobEvent>>>,
}

impl InMemoryJobRepo {
    async fn job(&self, id: Uuid) -> Job {
        self.jobs.lock().await.get(&id).cloned().expect("job must exist")
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepo {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        self.jobs.lock().await.insert(job.id, job.clone());
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.lock().await.get(&job_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.jobs.lock().await.values().cloned().collect())
    }

    async fn update_status(&self, job_id: Uuid, new_status: JobStatus, error_message: Option<String>) -> Result<(), StoreError> {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = jobs.get_mut(&job_id) else {
            return Err(StoreError::JobNotFound(job_id.to_string()));
        };
        if submeshd::domain::value_objects::is_valid_transition(job.status, new_status) {
            job.status = new_status;
            job.error_message = error_message;
        }
        Ok(())
    }

    async fn set_result_url(&self, job_id: Uuid, result_url: String) -> Result<(), StoreError> {
        if let Some(job) = self.jobs.lock().await.get_mut(&job_id) {
            job.result_url = Some(result_url);
        }
        Ok(())
    }

    async fn append_event(&self, job_id: Uuid, event: JobEvent) -> Result<(), StoreError> {
        self.events.lock().await.entry(job_id).or_default().push(event);
        Ok(())
    }

    async fn list_events(&self, job_id: Uuid) -> Result<Vec<JobEvent>, StoreError> {
        Ok(self.events.lock().await.get(&job_id).cloned().unwrap_or_default())
    }
}

/// Mirrors `RedisDedupStore`'s contract (§4.6) with a plain `HashMap`
/// instead of a Lua `GET`-or-`SET-EX` script: first registration for a
/// `video_url:language` pair wins, later ones see the winner's job id.
#[derive(Default)]
struct InMemoryDedupStore {
    registered: Mutex<HashMap<String, Uuid>>,
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn check_and_register(&self, video_url: &str, language: &str, candidate_job_id: Uuid) -> DuplicateCheckResult {
        let key = format!("{video_url}:{language}");
        let mut registered = self.registered.lock().await;
        match registered.get(&key) {
            Some(existing) => DuplicateCheckResult {
                is_duplicate: true,
                existing_job_id: Some(*existing),
                message: "duplicate within dedup window".to_string(),
            },
            None => {
                registered.insert(key, candidate_job_id);
                DuplicateCheckResult {
                    is_duplicate: false,
                    existing_job_id: Some(candidate_job_id),
                    message: "registered".to_string(),
                }
            }
        }
    }
}

/// A test-double `EventBus` that just records every publish, keyed by
/// routing key, so a test can pull the envelope one stage published and
/// hand it to the next. `run_consumer` is never exercised by these
/// tests: every stage is invoked directly instead of via a background
/// consumer loop, to keep the scenarios deterministic.
#[derive(Default)]
struct RecordingBus {
    published: Mutex<Vec<(String, EventEnvelope)>>,
}

impl RecordingBus {
    async fn last(&self, routing_key: &str) -> EventEnvelope {
        self.published
            .lock()
            .await
            .iter()
            .rev()
            .find(|(key, _)| key == routing_key)
            .unwrap_or_else(|| panic!("no envelope was published on {routing_key}"))
            .1
            .clone()
    }

    async fn was_published(&self, routing_key: &str) -> bool {
        self.published.lock().await.iter().any(|(key, _)| key == routing_key)
    }
}

#[async_trait]
impl EventBus for RecordingBus {
    async fn publish(&self, routing_key: &str, envelope: &EventEnvelope) -> Result<(), BusError> {
        self.published.lock().await.push((routing_key.to_string(), envelope.clone()));
        Ok(())
    }

    async fn run_consumer(&self, _config: ConsumerConfig, _handler: Arc<dyn MessageHandler>, _shutdown: ShutdownSignal) -> Result<(), BusError> {
        Ok(())
    }
}

/// A canned subtitle catalogue: per-language metadata results, plus a
/// fixed two-line SRT body written by `download`, so the translator has
/// something real to parse downstream of a fallback hit.
#[derive(Default)]
struct FakeCatalogueClient {
    by_language: HashMap<String, Vec<CatalogueResult>>,
}

impl FakeCatalogueClient {
    fn with_result(language: &str, result: CatalogueResult) -> Self {
        let mut by_language = HashMap::new();
        by_language.insert(language.to_string(), vec![result]);
        Self { by_language }
    }
}

#[async_trait]
impl CatalogueClient for FakeCatalogueClient {
    async fn search_by_fingerprint(&self, _fingerprint: &str, _file_size: u64, _language: &str) -> Result<Vec<CatalogueResult>, CatalogueError> {
        Ok(vec![])
    }

    async fn search_by_metadata(&self, _catalogue_id: Option<&str>, _title: &str, language: &str) -> Result<Vec<CatalogueResult>, CatalogueError> {
        Ok(self.by_language.get(language).cloned().unwrap_or_default())
    }

    async fn search_any_language(&self, _fingerprint: Option<&str>, _title: &str) -> Result<Vec<CatalogueResult>, CatalogueError> {
        Ok(vec![])
    }

    async fn download(&self, _result: &CatalogueResult, destination: &Path) -> Result<(), CatalogueError> {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CatalogueError::Api(e.to_string()))?;
        }
        std::fs::write(
            destination,
            "1\n00:00:01,000 --> 00:00:02,000\nhello\n\n2\n00:00:03,000 --> 00:00:04,000\nworld\n\n",
        )
        .map_err(|e| CatalogueError::Api(e.to_string()))?;
        Ok(())
    }
}

struct UppercaseClient;

#[async_trait]
impl TranslationClient for UppercaseClient {
    async fn translate_chunk(&self, texts: &[String], _source_language: &str, _target_language: &str) -> Result<Vec<String>, TranslationError> {
        Ok(texts.iter().map(|t| t.to_uppercase()).collect())
    }
}

/// Fails the `nth` call (0-indexed) it receives, succeeds on every
/// other call, so a test can simulate a crash partway through a
/// multi-chunk translation and then resume with a fresh client.
struct FailsOnNthCallClient {
    calls: AtomicUsize,
    fail_at: usize,
}

#[async_trait]
impl TranslationClient for FailsOnNthCallClient {
    async fn translate_chunk(&self, texts: &[String], _source_language: &str, _target_language: &str) -> Result<Vec<String>, TranslationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_at {
            return Err(TranslationError::Api("simulated crash".to_string()));
        }
        Ok(texts.iter().map(|t| t.to_uppercase()).collect())
    }
}

fn download_request(video_url: String, language: &str) -> DownloadJobRequest {
    DownloadJobRequest {
        video_url,
        video_title: "A Movie".to_string(),
        language: language.to_string(),
        target_language: None,
        preferred_sources: None,
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[tokio::test]
async fn direct_catalogue_hit_reaches_done_with_a_result_url() {
    let dir = tempfile::tempdir().unwrap();
    let video_path = dir.path().join("movie.mp4");
    std::fs::write(&video_path, b"small video file, below the fingerprint threshold").unwrap();

    let repo = Arc::new(InMemoryJobRepo::default());
    let bus = Arc::new(RecordingBus::default());
    let catalogue = FakeCatalogueClient::with_result(
        "en",
        CatalogueResult {
            id: "abc123".to_string(),
            language: "en".to_string(),
            download_ref: "ref-1".to_string(),
        },
    );

    let job = create_download_job(repo.as_ref(), bus.as_ref(), download_request(file_url(&video_path), "en"))
        .await
        .unwrap();
    assert_eq!(repo.job(job.id).await.status, JobStatus::Pending);

    let dispatcher = ConsumerDispatcher::new(repo.clone(), "consumer");
    dispatcher.dispatch(&bus.last(SUBTITLE_DOWNLOAD_REQUESTED).await).await.unwrap();
    assert_eq!(repo.job(job.id).await.status, JobStatus::DownloadQueued);

    let task: DownloadTask = serde_json::from_value(bus.last(DOWNLOAD_QUEUE_ROUTING_KEY).await.payload).unwrap();
    handle_download_task(repo.as_ref(), bus.as_ref(), &catalogue, &DownloaderConfig::default(), task)
        .await
        .unwrap();
    assert_eq!(repo.job(job.id).await.status, JobStatus::DownloadInProgress);
    assert!(bus.was_published(SUBTITLE_READY).await);

    dispatcher.dispatch(&bus.last(SUBTITLE_READY).await).await.unwrap();
    let finished = repo.job(job.id).await;
    assert_eq!(finished.status, JobStatus::Done);
    assert_eq!(finished.result_url.as_deref(), Some(format!("file://{}", video_path.with_file_name("movie.en.srt").display()).as_str()));
}

#[tokio::test]
async fn miss_with_translation_disabled_lands_on_subtitle_missing() {
    let dir = tempfile::tempdir().unwrap();
    let video_path = dir.path().join("movie.mp4");
    std::fs::write(&video_path, b"no catalogue entry will ever match this").unwrap();

    let repo = Arc::new(InMemoryJobRepo::default());
    let bus = Arc::new(RecordingBus::default());
    let catalogue = FakeCatalogueClient::default();
    let config = DownloaderConfig {
        translation_enabled: false,
        fallback_language: "en".to_string(),
    };

    let job = create_download_job(repo.as_ref(), bus.as_ref(), download_request(file_url(&video_path), "he"))
        .await
        .unwrap();

    let task: DownloadTask = serde_json::from_value(bus.last(DOWNLOAD_QUEUE_ROUTING_KEY).await.payload).unwrap();
    handle_download_task(repo.as_ref(), bus.as_ref(), &catalogue, &config, task).await.unwrap();
    assert!(bus.was_published(SUBTITLE_MISSING).await);
    assert!(!bus.was_published(SUBTITLE_TRANSLATE_REQUESTED).await);

    let dispatcher = ConsumerDispatcher::new(repo.clone(), "consumer");
    dispatcher.dispatch(&bus.last(SUBTITLE_MISSING).await).await.unwrap();
    assert_eq!(repo.job(job.id).await.status, JobStatus::SubtitleMissing);
}

#[tokio::test]
async fn miss_with_fallback_translation_completes_via_the_translator() {
    let dir = tempfile::tempdir().unwrap();
    let video_path = dir.path().join("movie.mp4");
    std::fs::write(&video_path, b"no Hebrew subtitle exists, only an English one").unwrap();

    let repo = Arc::new(InMemoryJobRepo::default());
    let bus = Arc::new(RecordingBus::default());
    // Only the fallback language ("en") has a catalogue hit; "he" misses.
    let catalogue = FakeCatalogueClient::with_result(
        "en",
        CatalogueResult {
            id: "abc123".to_string(),
            language: "eng".to_string(),
            download_ref: "ref-2".to_string(),
        },
    );
    let config = DownloaderConfig::default();

    let job = create_download_job(repo.as_ref(), bus.as_ref(), download_request(file_url(&video_path), "he"))
        .await
        .unwrap();

    let download_task: DownloadTask = serde_json::from_value(bus.last(DOWNLOAD_QUEUE_ROUTING_KEY).await.payload).unwrap();
    handle_download_task(repo.as_ref(), bus.as_ref(), &catalogue, &config, download_task).await.unwrap();
    assert!(bus.was_published(SUBTITLE_TRANSLATE_REQUESTED).await);
    assert!(!bus.was_published(SUBTITLE_MISSING).await);

    let dispatcher = ConsumerDispatcher::new(repo.clone(), "consumer");
    dispatcher.dispatch(&bus.last(SUBTITLE_TRANSLATE_REQUESTED).await).await.unwrap();
    assert_eq!(repo.job(job.id).await.status, JobStatus::TranslateQueued);

    let translation_task: TranslationTask = serde_json::from_value(bus.last(TRANSLATION_QUEUE_ROUTING_KEY).await.payload).unwrap();
    assert_eq!(translation_task.source_language, "en");
    assert_eq!(translation_task.target_language, "he");

    let checkpoints = FsCheckpointStore::new(dir.path().join("checkpoints"));
    let client = UppercaseClient;
    let download_base_url = "https://downloads.example.com/subtitles";
    handle_translation_task(repo.as_ref(), bus.as_ref(), &client, &checkpoints, download_base_url, translation_task)
        .await
        .unwrap();
    // The translator writes DONE directly with the result URL (§4.7); the
    // Consumer's own projection below then finds the job already DONE.
    assert_eq!(repo.job(job.id).await.status, JobStatus::Done);

    dispatcher.dispatch(&bus.last(SUBTITLE_TRANSLATED).await).await.unwrap();
    let finished = repo.job(job.id).await;
    assert_eq!(finished.status, JobStatus::Done);
    // A downloadable URL built from the configured base URL, not a local
    // `file://` path: the reader must not be able to reach the filesystem.
    let result_url = finished.result_url.unwrap();
    assert_eq!(result_url, format!("{download_base_url}/{}.he.srt", job.id));
    assert!(!result_url.starts_with("file://"));
}

fn srt_with_segments(count: u32) -> String {
    let mut body = String::new();
    for i in 1..=count {
        let start_sec = i;
        body.push_str(&format!(
            "{i}\n00:00:{start_sec:02},000 --> 00:00:{:02},000\nline number {i}\n\n",
            start_sec + 1
        ));
    }
    body
}

#[tokio::test]
async fn translator_resumes_from_checkpoint_after_a_simulated_crash() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("movie.en.srt");
    // 60 lines => two chunks of 50 and 10 (MAX_CHUNK_SIZE == 50).
    std::fs::write(&source_path, srt_with_segments(60)).unwrap();

    let repo = Arc::new(InMemoryJobRepo::default());
    let bus = Arc::new(RecordingBus::default());
    let checkpoints = FsCheckpointStore::new(dir.path().join("checkpoints"));
    let job_id = Uuid::new_v4();
    let task = TranslationTask {
        job_id,
        source_path: source_path.display().to_string(),
        source_language: "en".to_string(),
        target_language: "he".to_string(),
    };

    // Seed the job as the translator would actually find it: already
    // TRANSLATE_QUEUED by the time its task reaches this queue.
    let mut seed = Job::with_id(job_id, "file:///m/movie.mp4", "A Movie", "en", Some("he".to_string()));
    seed.status = JobStatus::TranslateQueued;
    repo.create(&seed).await.unwrap();

    // First attempt: the second chunk (call index 1) fails, simulating a
    // crash partway through.
    let crashing_client = FailsOnNthCallClient {
        calls: AtomicUsize::new(0),
        fail_at: 1,
    };
    let download_base_url = "https://downloads.example.com/subtitles";
    let result = handle_translation_task(repo.as_ref(), bus.as_ref(), &crashing_client, &checkpoints, download_base_url, task.clone()).await;
    assert!(result.is_ok(), "the handler itself completes, publishing job.failed instead of returning Err");
    assert!(bus.was_published(JOB_FAILED).await);
    assert!(checkpoints.exists(job_id, "he").await, "checkpoint must survive the crash");
    assert_eq!(crashing_client.calls.load(Ordering::SeqCst), 2);

    // Resume: a fresh, always-succeeding client must only be asked to
    // translate the chunk that was not yet completed.
    let resumed_bus = Arc::new(RecordingBus::default());
    let counting_client = FailsOnNthCallClient {
        calls: AtomicUsize::new(0),
        fail_at: usize::MAX,
    };
    handle_translation_task(
        repo.as_ref(),
        resumed_bus.as_ref(),
        &counting_client,
        &checkpoints,
        download_base_url,
        task.clone(),
    )
    .await
    .unwrap();

    assert_eq!(counting_client.calls.load(Ordering::SeqCst), 1, "only the unfinished chunk should be retranslated");
    assert!(!checkpoints.exists(job_id, "he").await, "checkpoint is deleted once the job completes");
    assert!(resumed_bus.was_published(SUBTITLE_TRANSLATED).await);

    let output = submeshd::infrastructure::subtitle::filename::derive_translated_path(&source_path, "he");
    let contents = std::fs::read_to_string(output).unwrap();
    assert!(contents.contains("LINE NUMBER 1"));
    assert!(contents.contains("LINE NUMBER 60"));
}

#[tokio::test]
async fn two_rapid_identical_webhooks_collide_on_dedup() {
    let repo = Arc::new(InMemoryJobRepo::default());
    let dedup = Arc::new(InMemoryDedupStore::default());
    let bus = Arc::new(RecordingBus::default());

    let request = WebhookRequest {
        event: "added".to_string(),
        item_type: "Movie".to_string(),
        item_name: "A Movie".to_string(),
        item_path: Some("/media/a-movie.mp4".to_string()),
        item_id: None,
        library_name: None,
        video_url: None,
    };

    let first = handle_webhook(repo.as_ref(), dedup.as_ref(), bus.as_ref(), "en", request.clone()).await;
    let second = handle_webhook(repo.as_ref(), dedup.as_ref(), bus.as_ref(), "en", request).await;

    let WebhookOutcome::Received { job_id: first_id } = first else {
        panic!("expected the first webhook to be received, got {first:?}");
    };
    let WebhookOutcome::Duplicate { job_id: second_id } = second else {
        panic!("expected the second webhook to be flagged as a duplicate, got {second:?}");
    };
    assert_eq!(first_id, second_id);
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn validation_failure_creates_no_job_and_publishes_nothing() {
    let repo = Arc::new(InMemoryJobRepo::default());
    let bus = Arc::new(RecordingBus::default());

    // No recognised scheme: rejected by `validate_video_url_scheme`
    // before a job is ever constructed.
    let result = create_download_job(repo.as_ref(), bus.as_ref(), download_request("/media/a-movie.mp4".to_string(), "en")).await;

    assert!(result.is_err());
    assert!(repo.list().await.unwrap().is_empty());
    assert!(!bus.was_published(DOWNLOAD_QUEUE_ROUTING_KEY).await);
    assert!(!bus.was_published(SUBTITLE_DOWNLOAD_REQUESTED).await);
}
