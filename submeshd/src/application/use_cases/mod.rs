pub mod create_download_job;
pub mod create_translate_job;
pub mod download_subtitle;
pub mod handle_subtitle_requested;
pub mod handle_webhook;
pub mod scan_library;
pub mod translate_subtitle;

pub use create_download_job::{create_download_job, create_download_job_shared, DownloadJobRequest};
pub use create_translate_job::{create_translate_job, TranslateJobRequest};
pub use download_subtitle::{handle_download_task, DownloadTaskHandler, DownloaderConfig};
pub use handle_subtitle_requested::SubtitleRequestedHandler;
pub use handle_webhook::{handle_webhook, WebhookOutcome, WebhookRequest};
pub use scan_library::{derive_video_title, handle_detected_file, ScanConfig};
pub use translate_subtitle::{handle_translation_task, TranslationTaskHandler};
