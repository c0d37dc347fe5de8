//! The distributed event bus contract of §4.2, generalised from the
//! teacher's in-process `EventBus` trait
//! (`interfaces/messaging/event_bus.rs`, `publish`/`subscribe`,
//! `EventBusConfig`) into a dyn-safe, envelope-based contract suitable
//! for a real topic exchange: publish by routing key, run a durable
//! consumer loop bound with one or more wildcard patterns.

pub mod amqp;
pub mod in_memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::events::EventEnvelope;
use crate::shared::error::BusError;
use crate::shared::shutdown::ShutdownSignal;

/// What a durable consumer binds: a queue name and the routing-key
/// patterns bound to it, plus the prefetch count (always 1 per §4.2/§5).
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub queue_name: String,
    pub bindings: Vec<String>,
    pub prefetch: u16,
}

impl ConsumerConfig {
    pub fn new(queue_name: impl Into<String>, bindings: Vec<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            bindings,
            prefetch: 1,
        }
    }
}

/// A message handler is invoked once per delivery; returning `Ok` acks
/// the message, returning `Err` leaves it unacked so the broker
/// redelivers it (§7 propagation policy).
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), BusError>;
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, routing_key: &str, envelope: &EventEnvelope) -> Result<(), BusError>;

    /// Runs `connect → declare → subscribe → drain → on error, back off
    /// and retry` until `shutdown` is requested. In-flight messages are
    /// allowed to finish; the loop then returns.
    async fn run_consumer(
        &self,
        config: ConsumerConfig,
        handler: Arc<dyn MessageHandler>,
        shutdown: ShutdownSignal,
    ) -> Result<(), BusError>;
}
