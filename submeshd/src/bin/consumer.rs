//! The consumer service (§4.7): binds every event type and projects it
//! onto each job's status and event log via `ConsumerDispatcher`.

use std::sync::Arc;

use submeshd::application::handlers::ConsumerDispatcher;
use submeshd::domain::events::event_type::CONSUMER_BINDINGS;
use submeshd::infrastructure::bus::amqp::AmqpEventBus;
use submeshd::infrastructure::bus::{ConsumerConfig, EventBus, MessageHandler};
use submeshd::infrastructure::config::env_string;
use submeshd::infrastructure::store::{RedisJobStore, TtlPolicy};
use submeshd::shared::shutdown::ShutdownSignal;

struct Config {
    amqp_url: String,
    redis_url: String,
    health_addr: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            amqp_url: env_string("AMQP_URL", "amqp://127.0.0.1:5672/%2f"),
            redis_url: env_string("REDIS_URL", "redis://127.0.0.1:6379"),
            health_addr: env_string("CONSUMER_HEALTH_ADDR", "0.0.0.0:8092"),
        }
    }
}

const QUEUE_NAME: &str = "consumer.projection";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let job_repo = Arc::new(RedisJobStore::connect(&config.redis_url, TtlPolicy::default()).await?);
    let bus: Arc<dyn EventBus> = Arc::new(AmqpEventBus::new(&config.amqp_url));

    let handler: Arc<dyn MessageHandler> = Arc::new(ConsumerDispatcher::new(job_repo, "consumer"));
    let bindings: Vec<String> = CONSUMER_BINDINGS.iter().map(|s| s.to_string()).collect();
    let consumer_config = ConsumerConfig::new(QUEUE_NAME, bindings);

    let shutdown = ShutdownSignal::new();
    shutdown.spawn_ctrl_c_listener();

    let health_addr = config.health_addr.clone();
    tokio::spawn(async move {
        if let Err(err) = submeshd::shared::health::serve(&health_addr, "submeshd-consumer").await {
            tracing::error!(error = %err, "health endpoint exited with an error");
        }
    });

    tracing::info!(queue = QUEUE_NAME, "consumer starting");
    bus.run_consumer(consumer_config, handler, shutdown).await?;
    Ok(())
}
