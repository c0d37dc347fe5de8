//! `GET /queue/status` and `GET /health/consumer` response shapes
//! (§6.1). The manager does not track per-queue depth itself (that
//! belongs to the broker); these are best-effort counters maintained
//! in-process and surfaced for operator visibility, same spirit as the
//! teacher's `active_workers` style gauges.

use serde::Serialize;

#[derive(Debug, Serialize, Default)]
pub struct ActiveWorkers {
    pub downloader: u32,
    pub translator: u32,
    pub consumer: u32,
}

#[derive(Debug, Serialize)]
pub struct QueueStatusResponse {
    pub download_queue_size: u64,
    pub translation_queue_size: u64,
    pub active_workers: ActiveWorkers,
}

#[derive(Debug, Serialize)]
pub struct ConsumerHealthResponse {
    pub status: &'static str,
    pub connected: bool,
    pub queue_name: String,
    pub routing_key: String,
}
