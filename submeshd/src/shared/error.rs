//! Layered error taxonomy shared by every binary in the workspace.

use thiserror::Error;

/// Errors raised while validating or manipulating domain state.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid job status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: String, to: String },

    #[error("language code must be two lowercase ASCII letters, got {0:?}")]
    InvalidLanguageCode(String),

    #[error("target_language must differ from language")]
    TargetEqualsSource,

    #[error("video_url must be non-empty")]
    EmptyVideoUrl,

    #[error("video_title must be non-empty and at most 500 characters")]
    InvalidVideoTitle,
}

/// Errors from the event bus (AMQP or in-memory).
#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus connection error: {0}")]
    Connection(String),

    #[error("failed to publish message: {0}")]
    Publish(String),

    #[error("failed to declare topology: {0}")]
    Topology(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("amqp error: {0}")]
    Lapin(#[from] lapin::Error),
}

/// Errors from the Redis-backed job store and dedup store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("job {0} not found")]
    JobNotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the subtitle catalogue client.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("rate limited by catalogue")]
    RateLimit,

    #[error("catalogue API error: {0}")]
    Api(String),

    #[error("catalogue authentication error: {0}")]
    Authentication(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors from the LLM translation client.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation API error: {0}")]
    Api(String),

    #[error("translation request timed out")]
    Timeout,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("could not parse chunk response as JSON: {0}")]
    ChunkParse(String),
}

/// Errors parsing or formatting SRT subtitle files.
#[derive(Debug, Error)]
pub enum SubtitleFormatError {
    #[error("no segments survived parsing")]
    NoSegments,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the chunked translation engine / checkpoint store.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("checkpoint metadata does not match current task, ignoring")]
    MetadataMismatch,
}

/// The top-level error type each binary's application layer returns;
/// aggregates every lower layer via `#[from]`, mirrored after the way
/// the catalogue/LLM/store/bus errors are mapped onto the `error_type`
/// taxonomy of job.failed payloads.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Subtitle(#[from] SubtitleFormatError),

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// The closed set of `error_type` values carried in `job.failed` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    InvalidRequest,
    InvalidVideoPath,
    FileNotFound,
    RateLimit,
    ApiError,
    AuthenticationError,
    QueuePublishFailed,
    JsonParseError,
    TranslationError,
    ProcessingError,
}

impl ApplicationError {
    /// Maps an error onto the `error_type` taxonomy of §7, best-effort.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ApplicationError::Domain(_) => ErrorType::InvalidRequest,
            ApplicationError::Bus(BusError::Publish(_)) => ErrorType::QueuePublishFailed,
            ApplicationError::Bus(_) => ErrorType::ProcessingError,
            ApplicationError::Store(_) => ErrorType::ProcessingError,
            ApplicationError::Catalogue(CatalogueError::RateLimit) => ErrorType::RateLimit,
            ApplicationError::Catalogue(CatalogueError::Authentication(_)) => {
                ErrorType::AuthenticationError
            }
            ApplicationError::Catalogue(CatalogueError::Json(_)) => ErrorType::JsonParseError,
            ApplicationError::Catalogue(_) => ErrorType::ApiError,
            ApplicationError::Translation(TranslationError::ChunkParse(_)) => {
                ErrorType::JsonParseError
            }
            ApplicationError::Translation(_) => ErrorType::TranslationError,
            ApplicationError::Subtitle(_) => ErrorType::TranslationError,
            ApplicationError::Chunk(ChunkError::Json(_)) => ErrorType::JsonParseError,
            ApplicationError::Chunk(_) => ErrorType::TranslationError,
            ApplicationError::Json(_) => ErrorType::JsonParseError,
            ApplicationError::Other(_) => ErrorType::ProcessingError,
        }
    }
}
