//! An in-process test double for `EventBus`: publish/subscribe over a
//! shared broadcast channel, keyed by routing-key glob pattern instead
//! of a message type, since this bus carries untyped `EventEnvelope`s
//! rather than generically-typed in-process events.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::events::EventEnvelope;
use crate::shared::error::BusError;
use crate::shared::shutdown::ShutdownSignal;

use super::{ConsumerConfig, EventBus, MessageHandler};

/// Matches an AMQP-topic-style binding pattern (`.`-separated segments,
/// `#` matches zero or more trailing segments) against a routing key.
pub fn matches_binding(pattern: &str, routing_key: &str) -> bool {
    if pattern == routing_key {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix(".#") {
        return routing_key == prefix || routing_key.starts_with(&format!("{prefix}."));
    }
    if pattern == "#" {
        return true;
    }
    false
}

#[derive(Clone)]
pub struct InMemoryEventBus {
    sender: broadcast::Sender<(String, EventEnvelope)>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, routing_key: &str, envelope: &EventEnvelope) -> Result<(), BusError> {
        // No subscribers is not an error: the exchange still accepted the
        // message, it simply has nothing bound to it yet.
        let _ = self.sender.send((routing_key.to_string(), envelope.clone()));
        Ok(())
    }

    async fn run_consumer(
        &self,
        config: ConsumerConfig,
        handler: Arc<dyn MessageHandler>,
        shutdown: ShutdownSignal,
    ) -> Result<(), BusError> {
        let mut receiver = self.sender.subscribe();
        loop {
            if shutdown.is_requested() {
                return Ok(());
            }
            let received = tokio::time::timeout(std::time::Duration::from_millis(200), receiver.recv()).await;
            let (routing_key, envelope) = match received {
                Ok(Ok(msg)) => msg,
                Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(broadcast::error::RecvError::Closed)) => return Ok(()),
                Err(_) => continue,
            };
            if !config.bindings.iter().any(|b| matches_binding(b, &routing_key)) {
                continue;
            }
            if let Err(err) = handler.handle(envelope).await {
                tracing::warn!(queue = %config.queue_name, error = %err, "handler failed, message dropped by test double");
            }
        }
    }
}
