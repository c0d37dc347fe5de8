//! The scanner service (§4.1, §5): periodically walks the configured
//! media root for video files, waits for each candidate to settle
//! before registering it, and exposes a `POST /scan` endpoint so the
//! manager can forward on-demand scan requests (§6.1).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use submeshd::application::use_cases::{handle_detected_file, ScanConfig};
use submeshd::infrastructure::bus::amqp::AmqpEventBus;
use submeshd::infrastructure::bus::EventBus;
use submeshd::infrastructure::config::{env_parsed, env_string};
use submeshd::infrastructure::filesystem::walker::find_video_files;
use submeshd::infrastructure::filesystem::{FileStabilityWatcher, StabilityConfig};
use submeshd::infrastructure::store::RedisDedupStore;
use submeshd::shared::shutdown::ShutdownSignal;

struct Config {
    amqp_url: String,
    redis_url: String,
    media_root: PathBuf,
    http_addr: String,
    scan_interval_secs: u64,
    dedup_window_secs: u64,
    default_language: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            amqp_url: env_string("AMQP_URL", "amqp://127.0.0.1:5672/%2f"),
            redis_url: env_string("REDIS_URL", "redis://127.0.0.1:6379"),
            media_root: PathBuf::from(env_string("MEDIA_ROOT", "/media")),
            http_addr: env_string("SCANNER_HTTP_ADDR", "0.0.0.0:8081"),
            scan_interval_secs: env_parsed("SCAN_INTERVAL_SECS", 300u64),
            dedup_window_secs: env_parsed("DEDUP_WINDOW_SECS", 6 * 3600u64),
            default_language: env_string("SCANNER_DEFAULT_LANGUAGE", "en"),
        }
    }
}

struct ScannerState {
    media_root: PathBuf,
    dedup: Arc<RedisDedupStore>,
    bus: Arc<dyn EventBus>,
    watcher: FileStabilityWatcher,
    scan_config: ScanConfig,
}

async fn run_scan(state: &ScannerState) {
    let files = find_video_files(&state.media_root);
    tracing::info!(count = files.len(), root = %state.media_root.display(), "scan found candidate files");
    for path in files {
        let settled = state.watcher.wait_for_stable(path.clone()).await;
        if !settled {
            // A newer event for the same path cancelled this one; the
            // newer wait owns reporting the result.
            continue;
        }
        if let Err(err) = handle_detected_file(state.dedup.as_ref(), state.bus.as_ref(), &state.scan_config, &path).await {
            tracing::warn!(path = %path.display(), error = %err, "failed to register detected file");
        }
    }
}

async fn trigger_scan(State(state): State<Arc<ScannerState>>) -> impl IntoResponse {
    tokio::spawn(async move { run_scan(&state).await });
    (StatusCode::ACCEPTED, "scan triggered")
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "submeshd-scanner" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let bus: Arc<dyn EventBus> = Arc::new(AmqpEventBus::new(&config.amqp_url));
    let dedup = Arc::new(
        RedisDedupStore::connect(&config.redis_url, Duration::from_secs(config.dedup_window_secs)).await,
    );

    let state = Arc::new(ScannerState {
        media_root: config.media_root.clone(),
        dedup,
        bus,
        watcher: FileStabilityWatcher::new(StabilityConfig::default()),
        scan_config: ScanConfig {
            default_language: config.default_language.clone(),
        },
    });

    let shutdown = ShutdownSignal::new();
    shutdown.spawn_ctrl_c_listener();

    let periodic_state = state.clone();
    let periodic_shutdown = shutdown.clone();
    let interval = Duration::from_secs(config.scan_interval_secs);
    let periodic_task = tokio::spawn(async move {
        while !periodic_shutdown.is_requested() {
            run_scan(&periodic_state).await;
            tokio::time::sleep(interval).await;
        }
    });

    let router = Router::new()
        .route("/scan", post(trigger_scan))
        .route("/health", get(health))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!(addr = %config.http_addr, root = %config.media_root.display(), "scanner listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    shutdown.request();
    let _ = periodic_task.await;
    Ok(())
}
