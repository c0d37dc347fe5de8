//! Shared application state for the manager's HTTP surface. The
//! dependency set is small enough that a single `State(Arc<AppState>)`
//! per handler reads more plainly than threading each field through
//! `FromRef<AppState>`.

use std::sync::Arc;

use crate::domain::repositories::{DedupStore, JobRepository};
use crate::infrastructure::bus::EventBus;

pub struct AppState {
    pub job_repo: Arc<dyn JobRepository>,
    pub dedup: Arc<dyn DedupStore>,
    pub bus: Arc<dyn EventBus>,
    /// Base URL of the scanner's own HTTP surface, used to forward
    /// `POST /scan` per §6.1.
    pub scanner_base_url: String,
    /// Default language applied to jobs created from webhook deliveries.
    pub webhook_default_language: String,
    pub consumer_queue_name: String,
    pub consumer_routing_key: String,
    pub http_client: reqwest::Client,
}
