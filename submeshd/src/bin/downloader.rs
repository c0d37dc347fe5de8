//! The downloader service (§4.4): consumes the download queue and runs
//! the catalogue-search decision tree.

use std::sync::Arc;

use submeshd::application::use_cases::{DownloadTaskHandler, DownloaderConfig};
use submeshd::domain::events::event_type::DOWNLOAD_QUEUE_ROUTING_KEY;
use submeshd::infrastructure::bus::amqp::AmqpEventBus;
use submeshd::infrastructure::bus::{ConsumerConfig, EventBus, MessageHandler};
use submeshd::infrastructure::config::{env_bool, env_string};
use submeshd::infrastructure::external::catalogue::HttpCatalogueClient;
use submeshd::infrastructure::store::{RedisJobStore, TtlPolicy};
use submeshd::shared::shutdown::ShutdownSignal;

struct Config {
    amqp_url: String,
    redis_url: String,
    catalogue_base_url: String,
    catalogue_api_key: String,
    translation_enabled: bool,
    fallback_language: String,
    health_addr: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            amqp_url: env_string("AMQP_URL", "amqp://127.0.0.1:5672/%2f"),
            redis_url: env_string("REDIS_URL", "redis://127.0.0.1:6379"),
            catalogue_base_url: env_string("CATALOGUE_BASE_URL", "http://127.0.0.1:9000"),
            catalogue_api_key: env_string("CATALOGUE_API_KEY", ""),
            translation_enabled: env_bool("DOWNLOADER_TRANSLATION_ENABLED", true),
            fallback_language: env_string("DOWNLOADER_FALLBACK_LANGUAGE", "en"),
            health_addr: env_string("DOWNLOADER_HEALTH_ADDR", "0.0.0.0:8090"),
        }
    }
}

const QUEUE_NAME: &str = "downloader.tasks";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let job_repo = Arc::new(RedisJobStore::connect(&config.redis_url, TtlPolicy::default()).await?);
    let bus: Arc<dyn EventBus> = Arc::new(AmqpEventBus::new(&config.amqp_url));
    let catalogue = Arc::new(HttpCatalogueClient::new(config.catalogue_base_url, config.catalogue_api_key));

    let downloader_config = DownloaderConfig {
        translation_enabled: config.translation_enabled,
        fallback_language: config.fallback_language,
    };
    let handler: Arc<dyn MessageHandler> = Arc::new(DownloadTaskHandler::new(job_repo, bus.clone(), catalogue, downloader_config));
    let consumer_config = ConsumerConfig::new(QUEUE_NAME, vec![DOWNLOAD_QUEUE_ROUTING_KEY.to_string()]);

    let shutdown = ShutdownSignal::new();
    shutdown.spawn_ctrl_c_listener();

    let health_addr = config.health_addr.clone();
    tokio::spawn(async move {
        if let Err(err) = submeshd::shared::health::serve(&health_addr, "submeshd-downloader").await {
            tracing::error!(error = %err, "health endpoint exited with an error");
        }
    });

    tracing::info!(queue = QUEUE_NAME, "downloader consumer starting");
    bus.run_consumer(consumer_config, handler, shutdown).await?;
    Ok(())
}
