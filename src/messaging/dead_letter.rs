use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::models::{MessageType, OutboundMessage};

// ============================================================================
// Dead Letters
// ============================================================================
//
// A record the transport refused after all attempts. Appended as one JSON
// document per line so an operator can inspect or replay the run's failures.
//
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeadLetter {
    pub run_id: Uuid,
    pub message_type: MessageType,
    pub routing_key: String,
    /// The record exactly as it would have been published, or empty when it
    /// could not be serialized
    pub payload: String,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

impl DeadLetter {
    pub fn new(run_id: Uuid, message: &OutboundMessage, error: impl ToString) -> Self {
        Self::with_payload(run_id, message, message.to_json(), error.to_string())
    }

    fn with_payload(
        run_id: Uuid,
        message: &OutboundMessage,
        payload: serde_json::Result<String>,
        error: String,
    ) -> Self {
        let (payload, error) = match payload {
            Ok(json) => (json, error),
            Err(e) => (String::new(), format!("{error}; payload not serializable: {e}")),
        };

        Self {
            run_id,
            message_type: message.message_type(),
            routing_key: message.routing_key().to_string(),
            payload,
            error,
            failed_at: Utc::now(),
        }
    }
}

pub struct DeadLetterFile {
    path: PathBuf,
}

impl DeadLetterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn append(&self, letter: &DeadLetter) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(letter)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::warn!(
            run_id = %letter.run_id,
            key = %letter.routing_key,
            message_type = letter.message_type.as_str(),
            path = %self.path.display(),
            "Record written to dead-letter file"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerReference, OrderReference};
    use crate::models::ErrorRecord;

    #[tokio::test]
    async fn test_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dead_letters.jsonl");
        let file = DeadLetterFile::new(&path);
        let run_id = Uuid::new_v4();

        let first: OutboundMessage =
            ErrorRecord::missing_customer(CustomerReference::new("C9"), OrderReference::new("O2")).into();
        let second: OutboundMessage = ErrorRecord::missing_order(OrderReference::new("O5")).into();

        file.append(&DeadLetter::new(run_id, &first, "broker down")).await.unwrap();
        file.append(&DeadLetter::new(run_id, &second, "broker down")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let letters: Vec<DeadLetter> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(letters.len(), 2);
        assert_eq!(letters[0].run_id, run_id);
        assert_eq!(letters[0].routing_key, "O2");
        assert_eq!(letters[0].message_type, MessageType::ErrorMessage);
        assert_eq!(letters[0].payload, first.to_json().unwrap());
        let payload: serde_json::Value = serde_json::from_str(&letters[1].payload).unwrap();
        assert_eq!(payload["order_reference"], "O5");
        assert_eq!(payload["customer_reference"], serde_json::Value::Null);
        assert_eq!(letters[1].error, "broker down");
    }

    #[test]
    fn test_unserializable_payload_is_reported_in_error() {
        let message: OutboundMessage = ErrorRecord::missing_order(OrderReference::new("O5")).into();
        let failure = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

        let letter = DeadLetter::with_payload(Uuid::new_v4(), &message, Err(failure), "broker down".into());

        assert!(letter.payload.is_empty());
        assert_eq!(letter.routing_key, "O5");
        assert!(letter.error.starts_with("broker down; payload not serializable: "));
    }
}
