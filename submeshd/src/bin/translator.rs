//! The translator service (§4.5): consumes the translation queue and
//! runs the checkpoint-resumable chunked translation engine.

use std::sync::Arc;

use submeshd::application::use_cases::TranslationTaskHandler;
use submeshd::domain::events::event_type::TRANSLATION_QUEUE_ROUTING_KEY;
use submeshd::infrastructure::bus::amqp::AmqpEventBus;
use submeshd::infrastructure::bus::{ConsumerConfig, EventBus, MessageHandler};
use submeshd::infrastructure::checkpoint::FsCheckpointStore;
use submeshd::infrastructure::config::env_string;
use submeshd::infrastructure::external::llm::HttpLlmClient;
use submeshd::infrastructure::store::{RedisJobStore, TtlPolicy};
use submeshd::shared::shutdown::ShutdownSignal;

struct Config {
    amqp_url: String,
    redis_url: String,
    llm_base_url: String,
    llm_model: String,
    checkpoint_dir: String,
    health_addr: String,
    download_base_url: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            amqp_url: env_string("AMQP_URL", "amqp://127.0.0.1:5672/%2f"),
            redis_url: env_string("REDIS_URL", "redis://127.0.0.1:6379"),
            llm_base_url: env_string("LLM_BASE_URL", "http://127.0.0.1:11434"),
            llm_model: env_string("LLM_MODEL", "llama3"),
            checkpoint_dir: env_string("CHECKPOINT_DIR", "/var/lib/submeshd/checkpoints"),
            health_addr: env_string("TRANSLATOR_HEALTH_ADDR", "0.0.0.0:8091"),
            download_base_url: env_string("DOWNLOAD_BASE_URL", "http://127.0.0.1:8080/subtitles/download-links"),
        }
    }
}

const QUEUE_NAME: &str = "translator.tasks";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let job_repo = Arc::new(RedisJobStore::connect(&config.redis_url, TtlPolicy::default()).await?);
    let bus: Arc<dyn EventBus> = Arc::new(AmqpEventBus::new(&config.amqp_url));
    let translation_client = Arc::new(HttpLlmClient::new(config.llm_base_url, config.llm_model));
    let checkpoints = Arc::new(FsCheckpointStore::new(config.checkpoint_dir));

    let handler: Arc<dyn MessageHandler> = Arc::new(TranslationTaskHandler::new(
        job_repo,
        bus.clone(),
        translation_client,
        checkpoints,
        config.download_base_url,
    ));
    let consumer_config = ConsumerConfig::new(QUEUE_NAME, vec![TRANSLATION_QUEUE_ROUTING_KEY.to_string()]);

    let shutdown = ShutdownSignal::new();
    shutdown.spawn_ctrl_c_listener();

    let health_addr = config.health_addr.clone();
    tokio::spawn(async move {
        if let Err(err) = submeshd::shared::health::serve(&health_addr, "submeshd-translator").await {
            tracing::error!(error = %err, "health endpoint exited with an error");
        }
    });

    tracing::info!(queue = QUEUE_NAME, "translator consumer starting");
    bus.run_consumer(consumer_config, handler, shutdown).await?;
    Ok(())
}
