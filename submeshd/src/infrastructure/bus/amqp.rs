//! `lapin`-backed topic exchange implementation of `EventBus` (§4.2).
//!
//! Declares the durable topic exchange `subtitle.events`; publishes use
//! persistent delivery mode and publisher confirms; consumers declare
//! their own durable queue, bind the configured patterns, set prefetch
//! 1, and follow the *connect → declare → subscribe → drain → backoff*
//! reconnect contract.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ConnectionProperties, ExchangeKind};

use crate::domain::events::EventEnvelope;
use crate::shared::backoff::Backoff;
use crate::shared::error::BusError;
use crate::shared::shutdown::ShutdownSignal;

use super::{ConsumerConfig, EventBus, MessageHandler};

pub const EXCHANGE_NAME: &str = "subtitle.events";

pub struct AmqpEventBus {
    uri: String,
}

impl AmqpEventBus {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    async fn connect(&self) -> Result<Connection, BusError> {
        let conn = Connection::connect(&self.uri, ConnectionProperties::default())
            .await
            .map_err(|e| BusError::Connection(e.to_string()))?;
        Ok(conn)
    }

    async fn declare_exchange(&self, conn: &Connection) -> Result<lapin::Channel, BusError> {
        let channel = conn.create_channel().await?;
        channel
            .exchange_declare(
                EXCHANGE_NAME,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(channel)
    }
}

#[async_trait]
impl EventBus for AmqpEventBus {
    async fn publish(&self, routing_key: &str, envelope: &EventEnvelope) -> Result<(), BusError> {
        let conn = self.connect().await?;
        let channel = self.declare_exchange(&conn).await?;
        let body = serde_json::to_vec(envelope)?;
        let confirm = channel
            .basic_publish(
                EXCHANGE_NAME,
                routing_key,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_delivery_mode(2)
                    .with_content_type("application/json".into()),
            )
            .await
            .map_err(|e| BusError::Publish(e.to_string()))?;
        confirm
            .await
            .map_err(|e| BusError::Publish(e.to_string()))?;
        Ok(())
    }

    async fn run_consumer(
        &self,
        config: ConsumerConfig,
        handler: Arc<dyn MessageHandler>,
        shutdown: ShutdownSignal,
    ) -> Result<(), BusError> {
        let mut backoff = Backoff::default();

        while !shutdown.is_requested() {
            match self.run_consumer_once(&config, handler.clone(), shutdown.clone()).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::warn!(queue = %config.queue_name, error = %err, "consumer loop failed, backing off");
                    let delay = backoff.next_delay();
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Ok(())
    }
}

impl AmqpEventBus {
    async fn run_consumer_once(
        &self,
        config: &ConsumerConfig,
        handler: Arc<dyn MessageHandler>,
        shutdown: ShutdownSignal,
    ) -> Result<(), BusError> {
        let conn = self.connect().await?;
        let channel = self.declare_exchange(&conn).await?;

        channel
            .queue_declare(
                &config.queue_name,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        for binding in &config.bindings {
            channel
                .queue_bind(
                    &config.queue_name,
                    EXCHANGE_NAME,
                    binding,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;
        }

        channel
            .basic_qos(config.prefetch, BasicQosOptions::default())
            .await?;

        let mut consumer = channel
            .basic_consume(
                &config.queue_name,
                &format!("{}-consumer", config.queue_name),
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let mut backoff = Backoff::default();

        loop {
            if shutdown.is_requested() {
                return Ok(());
            }
            let next = tokio::time::timeout(Duration::from_secs(30), consumer.next()).await;
            let delivery = match next {
                Ok(Some(Ok(delivery))) => delivery,
                Ok(Some(Err(err))) => return Err(BusError::Connection(err.to_string())),
                Ok(None) => return Err(BusError::Connection("consumer stream closed".into())),
                Err(_) => continue, // idle timeout; loop back and re-check shutdown flag
            };

            let envelope: EventEnvelope = match serde_json::from_slice(&delivery.data) {
                Ok(envelope) => envelope,
                Err(err) => {
                    tracing::error!(error = %err, "failed to deserialize envelope, acking to avoid poison-message loop");
                    delivery.ack(BasicAckOptions::default()).await?;
                    continue;
                }
            };

            match handler.handle(envelope).await {
                Ok(()) => {
                    delivery.ack(BasicAckOptions::default()).await?;
                    backoff.reset();
                }
                Err(err) => {
                    tracing::warn!(error = %err, "handler failed, leaving message unacked for redelivery");
                    delivery
                        .nack(BasicNackOptions {
                            requeue: true,
                            ..Default::default()
                        })
                        .await?;
                }
            }
        }
    }
}
