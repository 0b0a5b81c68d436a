use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};
use std::time::Duration;

use super::{encode, PublishError, Publisher, Topics};
use crate::models::OutboundMessage;
use crate::utils::{retry_on_transient, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, RetryConfig};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishes records to Kafka (or any Kafka-compatible broker).
/// Topic is chosen by record class, the key is the record's routing key.
pub struct KafkaPublisher {
    producer: FutureProducer,
    topics: Topics,
    retry: RetryConfig,
    circuit_breaker: CircuitBreaker,
}

impl KafkaPublisher {
    pub fn new(brokers: &str, topics: Topics, retry: RetryConfig) -> anyhow::Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("enable.idempotence", "true")
            .create()?;

        tracing::info!(
            brokers = %brokers,
            customer_topic = %topics.customer,
            error_topic = %topics.error,
            "Kafka producer created"
        );

        Ok(Self {
            producer,
            topics,
            retry,
            circuit_breaker: CircuitBreaker::new("kafka", CircuitBreakerConfig::default()),
        })
    }

    async fn send_once(&self, topic: &str, key: &str, payload: &str, attempt: u32) -> Result<(), PublishError> {
        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(topic).key(key).payload(payload);
                self.producer
                    .send(record, Timeout::After(SEND_TIMEOUT))
                    .await
                    .map(|_| ())
                    .map_err(|(e, _)| e)
            })
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(topic = %topic, key = %key, attempt, "Published to Kafka");
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(topic = %topic, key = %key, "Circuit breaker open, Kafka unavailable");
                Err(PublishError::CircuitOpen("kafka"))
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                let breaker = self.circuit_breaker.state().await;
                tracing::warn!(
                    topic = %topic,
                    key = %key,
                    attempt,
                    error = %e,
                    breaker = ?breaker,
                    "Kafka send failed"
                );
                Err(PublishError::transport("kafka", e))
            }
        }
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    fn name(&self) -> &'static str {
        "kafka"
    }

    async fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError> {
        let payload = encode(message)?;
        let payload = payload.as_str();
        let topic = self.topics.for_message(message);
        let key = message.routing_key();

        retry_on_transient(&self.retry, |attempt| self.send_once(topic, key, payload, attempt))
            .await
            .into_result()
    }
}
