//! Command-line configuration.
//!
//! Every flag has an environment fallback; a `.env` file is loaded first.

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, ValueEnum};
use std::path::PathBuf;

use crate::loader::parse_run_date;
use crate::messaging::Topics;

/// Daily customer/order reconciliation
#[derive(Parser, Debug, Clone)]
#[command(name = "order_recon")]
#[command(about = "Reconcile the daily customer, order and item extracts and publish the results")]
pub struct Args {
    /// Where the extracts are read from
    #[arg(long, env = "RECON_SOURCE", value_enum, default_value_t = SourceKind::Local)]
    pub source: SourceKind,

    /// Root directory for the local source
    #[arg(long, env = "RECON_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Base URL of the object-store bucket endpoint
    #[arg(long, env = "RECON_OBJECT_STORE_URL")]
    pub object_store_url: Option<String>,

    /// Bearer token for the object store
    #[arg(long, env = "RECON_OBJECT_STORE_TOKEN", hide_env_values = true)]
    pub object_store_token: Option<String>,

    /// Prefix (directory or key prefix) prepended to the extract names
    #[arg(long, env = "RECON_KEY_PREFIX", default_value = "")]
    pub key_prefix: String,

    /// Run date, DDMMYYYY or YYYY-MM-DD (default: today)
    #[arg(long, env = "RECON_RUN_DATE", value_parser = parse_run_date)]
    pub run_date: Option<NaiveDate>,

    /// Where results are published
    #[arg(long, env = "RECON_TRANSPORT", value_enum, default_value_t = TransportKind::Stdout)]
    pub transport: TransportKind,

    /// Kafka bootstrap servers
    #[arg(long, env = "KAFKA_BROKERS", default_value = "127.0.0.1:9092")]
    pub kafka_brokers: String,

    #[command(flatten)]
    pub nats: NatsArgs,

    /// Topic / subject for customer summaries
    #[arg(long, env = "RECON_CUSTOMER_TOPIC", default_value = "customer_messages")]
    pub customer_topic: String,

    /// Topic / subject for validation errors
    #[arg(long, env = "RECON_ERROR_TOPIC", default_value = "error_messages")]
    pub error_topic: String,

    /// Delivery attempts per record before it counts as failed
    #[arg(long, env = "RECON_PUBLISH_ATTEMPTS", default_value = "3")]
    pub publish_attempts: u32,

    /// JSON-lines file receiving records that could not be delivered
    #[arg(long, env = "RECON_DEAD_LETTER_FILE")]
    pub dead_letter_file: Option<PathBuf>,

    /// Prometheus textfile written at the end of the run
    #[arg(long, env = "RECON_METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// NATS connection settings
#[derive(ClapArgs, Debug, Clone)]
pub struct NatsArgs {
    /// NATS server URL
    #[arg(long, env = "NATS_URL", default_value = "nats://127.0.0.1:4222")]
    pub nats_url: String,

    #[arg(long, env = "NATS_USER")]
    pub nats_user: Option<String>,

    #[arg(long, env = "NATS_PASSWORD", hide_env_values = true)]
    pub nats_password: Option<String>,
}

impl NatsArgs {
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.nats_user, &self.nats_password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Local,
    ObjectStore,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Stdout,
    Kafka,
    Nats,
    /// Discard every record
    #[value(name = "none")]
    Discard,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("--object-store-url (RECON_OBJECT_STORE_URL) is required with --source object-store")]
    MissingObjectStoreUrl,

    #[error("--publish-attempts must be at least 1")]
    NoPublishAttempts,
}

impl Args {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source == SourceKind::ObjectStore
            && self.object_store_url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err(ConfigError::MissingObjectStoreUrl);
        }

        if self.publish_attempts == 0 {
            return Err(ConfigError::NoPublishAttempts);
        }

        Ok(())
    }

    pub fn topics(&self) -> Topics {
        Topics::new(&self.customer_topic, &self.error_topic)
    }
}
