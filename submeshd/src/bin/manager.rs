//! The manager service (§4.3): serves the HTTP surface of §6.1 and runs
//! the `subtitle.requested` consumer concurrently (env-loaded `Config`,
//! `tracing_subscriber` init, `axum::serve` against a `TcpListener`).

use std::sync::Arc;

use submeshd::application::use_cases::SubtitleRequestedHandler;
use submeshd::domain::events::event_type::SUBTITLE_REQUESTED;
use submeshd::infrastructure::bus::amqp::AmqpEventBus;
use submeshd::infrastructure::bus::{ConsumerConfig, EventBus, MessageHandler};
use submeshd::infrastructure::config::{env_parsed, env_string};
use submeshd::infrastructure::store::{RedisDedupStore, RedisJobStore, TtlPolicy};
use submeshd::presentation::http::{build_router, AppState};
use submeshd::shared::shutdown::ShutdownSignal;

struct Config {
    amqp_url: String,
    redis_url: String,
    http_addr: String,
    scanner_base_url: String,
    webhook_default_language: String,
    dedup_window_secs: u64,
}

impl Config {
    fn from_env() -> Self {
        Self {
            amqp_url: env_string("AMQP_URL", "amqp://127.0.0.1:5672/%2f"),
            redis_url: env_string("REDIS_URL", "redis://127.0.0.1:6379"),
            http_addr: env_string("MANAGER_HTTP_ADDR", "0.0.0.0:8080"),
            scanner_base_url: env_string("SCANNER_BASE_URL", "http://127.0.0.1:8081"),
            webhook_default_language: env_string("WEBHOOK_DEFAULT_LANGUAGE", "en"),
            dedup_window_secs: env_parsed("DEDUP_WINDOW_SECS", 6 * 3600u64),
        }
    }
}

const QUEUE_NAME: &str = "manager.subtitle-requested";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let job_repo = Arc::new(RedisJobStore::connect(&config.redis_url, TtlPolicy::default()).await?);
    let dedup = Arc::new(
        RedisDedupStore::connect(&config.redis_url, std::time::Duration::from_secs(config.dedup_window_secs)).await,
    );
    let bus: Arc<dyn EventBus> = Arc::new(AmqpEventBus::new(&config.amqp_url));

    let state = Arc::new(AppState {
        job_repo: job_repo.clone(),
        dedup: dedup.clone(),
        bus: bus.clone(),
        scanner_base_url: config.scanner_base_url.clone(),
        webhook_default_language: config.webhook_default_language.clone(),
        consumer_queue_name: QUEUE_NAME.to_string(),
        consumer_routing_key: SUBTITLE_REQUESTED.to_string(),
        http_client: reqwest::Client::new(),
    });

    let shutdown = ShutdownSignal::new();
    shutdown.spawn_ctrl_c_listener();

    let handler: Arc<dyn MessageHandler> = Arc::new(SubtitleRequestedHandler::new(job_repo.clone(), dedup, bus.clone()));
    let consumer_config = ConsumerConfig::new(QUEUE_NAME, vec![SUBTITLE_REQUESTED.to_string()]);
    let consumer_bus = bus.clone();
    let consumer_shutdown = shutdown.clone();
    let consumer_task = tokio::spawn(async move {
        if let Err(err) = consumer_bus.run_consumer(consumer_config, handler, consumer_shutdown).await {
            tracing::error!(error = %err, "subtitle.requested consumer loop exited with an error");
        }
    });

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!(addr = %config.http_addr, "manager listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    shutdown.request();
    let _ = consumer_task.await;
    Ok(())
}
