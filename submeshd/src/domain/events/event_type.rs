//! Routing keys / event type strings of §6.2.

pub const SUBTITLE_REQUESTED: &str = "subtitle.requested";
pub const SUBTITLE_DOWNLOAD_REQUESTED: &str = "subtitle.download.requested";
pub const SUBTITLE_READY: &str = "subtitle.ready";
pub const SUBTITLE_MISSING: &str = "subtitle.missing";
pub const SUBTITLE_TRANSLATE_REQUESTED: &str = "subtitle.translate.requested";
pub const SUBTITLE_TRANSLATED: &str = "subtitle.translated";
pub const TRANSLATION_COMPLETED: &str = "translation.completed";
pub const MEDIA_FILE_DETECTED: &str = "media.file.detected";
pub const JOB_FAILED: &str = "job.failed";

/// Direct routing keys for the two work queues (§4.3/§4.4/§4.5); these are
/// task deliveries, not broadcast events, but they travel over the same
/// exchange so they share the routing-key namespace.
pub const DOWNLOAD_QUEUE_ROUTING_KEY: &str = "subtitle.download";
pub const TRANSLATION_QUEUE_ROUTING_KEY: &str = "subtitle.translation";

/// Binding patterns the Consumer subscribes with (§4.2).
pub const CONSUMER_BINDINGS: &[&str] = &["subtitle.#", "job.#", "media.#"];
