use async_nats::{Client, ConnectOptions, HeaderMap};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use super::{encode, PublishError, Publisher, Topics};
use crate::models::OutboundMessage;
use crate::utils::{retry_on_transient, RetryConfig};

const KEY_HEADER: &str = "Recon-Key";
const TYPE_HEADER: &str = "Recon-Type";

/// Publishes records on NATS subjects, one subject per record class.
/// The routing key and record type travel as headers.
pub struct NatsPublisher {
    client: Client,
    topics: Topics,
    retry: RetryConfig,
}

impl NatsPublisher {
    pub async fn connect(
        url: &str,
        credentials: Option<(String, String)>,
        topics: Topics,
        retry: RetryConfig,
    ) -> anyhow::Result<Self> {
        tracing::info!(url = %url, "Connecting to NATS");

        let mut options = ConnectOptions::new()
            .name("order_recon")
            .connection_timeout(Duration::from_secs(5));
        if let Some((user, password)) = credentials {
            options = options.user_and_password(user, password);
        }

        let client = options.connect(url).await?;

        tracing::info!(
            url = %url,
            customer_subject = %topics.customer,
            error_subject = %topics.error,
            "Connected to NATS"
        );

        Ok(Self { client, topics, retry })
    }

    async fn send_once(&self, subject: &str, message: &OutboundMessage, payload: &Bytes) -> Result<(), PublishError> {
        let mut headers = HeaderMap::new();
        headers.insert(KEY_HEADER, message.routing_key());
        headers.insert(TYPE_HEADER, message.message_type().as_str());

        self.client
            .publish_with_headers(subject.to_string(), headers, payload.clone())
            .await
            .map_err(|e| PublishError::transport("nats", e))?;

        tracing::debug!(subject = %subject, key = %message.routing_key(), "Published to NATS");
        Ok(())
    }
}

#[async_trait]
impl Publisher for NatsPublisher {
    fn name(&self) -> &'static str {
        "nats"
    }

    async fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError> {
        let payload = Bytes::from(encode(message)?);
        let payload = &payload;
        let subject = self.topics.for_message(message);

        retry_on_transient(&self.retry, |_attempt| self.send_once(subject, message, payload))
            .await
            .into_result()
    }

    async fn flush(&self) -> Result<(), PublishError> {
        self.client
            .flush()
            .await
            .map_err(|e| PublishError::transport("nats", e))
    }
}
