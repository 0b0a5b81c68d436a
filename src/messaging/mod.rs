// ============================================================================
// Messaging - Outbound Transports
// ============================================================================
//
// The pipeline hands every record to one `Publisher`, chosen at startup:
// - stdout       - JSON lines on standard output
// - kafka        - rdkafka FutureProducer, retried + circuit breaker
// - nats         - async-nats core publish, retried
// - none         - discards everything
//
// Records that could not be delivered can be kept in a dead-letter file.
//
// ============================================================================

mod dead_letter;
mod kafka;
mod nats;
mod stdout;

use async_trait::async_trait;

use crate::models::{MessageType, OutboundMessage};
use crate::utils::IsTransient;

pub use dead_letter::{DeadLetter, DeadLetterFile};
pub use kafka::KafkaPublisher;
pub use nats::NatsPublisher;
pub use stdout::StdoutPublisher;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("cannot serialize {message_type} '{key}': {reason}")]
    Serialization {
        message_type: &'static str,
        key: String,
        reason: String,
    },

    #[error("{transport} delivery failed: {reason}")]
    Transport {
        transport: &'static str,
        reason: String,
    },

    #[error("{0} circuit breaker is open")]
    CircuitOpen(&'static str),
}

impl PublishError {
    pub fn transport(transport: &'static str, reason: impl std::fmt::Display) -> Self {
        PublishError::Transport {
            transport,
            reason: reason.to_string(),
        }
    }
}

impl IsTransient for PublishError {
    fn is_transient(&self) -> bool {
        matches!(self, PublishError::Transport { .. })
    }
}

/// Serialize a record, mapping failure to a permanent publish error
pub(crate) fn encode(message: &OutboundMessage) -> Result<String, PublishError> {
    message.to_json().map_err(|e| PublishError::Serialization {
        message_type: message.message_type().as_str(),
        key: message.routing_key().to_string(),
        reason: e.to_string(),
    })
}

/// Sink for outbound records. Called once per record, in order.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError>;

    /// Called once after the last record of a run
    async fn flush(&self) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Destination (Kafka topic / NATS subject) per record class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub customer: String,
    pub error: String,
}

impl Topics {
    pub fn new(customer: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            customer: customer.into(),
            error: error.into(),
        }
    }

    pub fn for_message(&self, message: &OutboundMessage) -> &str {
        match message.message_type() {
            MessageType::CustomerMessage => &self.customer,
            MessageType::ErrorMessage => &self.error,
        }
    }
}

/// Accepts and drops every record
pub struct NoopPublisher;

#[async_trait]
impl Publisher for NoopPublisher {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError> {
        tracing::trace!(key = %message.routing_key(), "Discarding record");
        Ok(())
    }
}
