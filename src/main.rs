use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod loader;
mod messaging;
mod metrics;
mod models;
mod pipeline;
mod reconciliation;
mod utils;

use config::{Args, LogFormat, SourceKind, TransportKind};
use loader::{LocalLoader, ObjectStoreLoader, SnapshotLoader, SourceNames};
use messaging::{DeadLetterFile, KafkaPublisher, NatsPublisher, NoopPublisher, Publisher, StdoutPublisher};
use pipeline::Pipeline;
use utils::RetryConfig;

const OBJECT_STORE_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(&args);
    args.validate()?;

    let run_date = args
        .run_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let names = SourceNames::for_date(run_date, &args.key_prefix);
    tracing::info!(run_date = %run_date, "Reconciliation job starting");

    // === 1. Clients, built once and injected ===
    let loader = build_loader(&args)?;
    let publisher = build_publisher(&args).await?;
    let metrics = Arc::new(metrics::Metrics::new()?);

    let mut pipeline = Pipeline::new(loader, publisher, metrics.clone());
    if let Some(path) = &args.dead_letter_file {
        pipeline = pipeline.with_dead_letters(DeadLetterFile::new(path));
    }

    // === 2. Run ===
    let outcome = pipeline.run(&names).await;

    // Metrics are written for failed runs too
    if let Some(path) = &args.metrics_file {
        if let Err(e) = metrics.write_textfile(path).await {
            tracing::error!(path = %path.display(), error = %e, "Could not write metrics file");
        }
    }

    let report = outcome.context("reconciliation run aborted")?;
    if !report.is_clean() {
        anyhow::bail!(
            "run {} finished with {} undelivered record(s){}",
            report.run_id,
            report.failed.len(),
            report
                .flush_error
                .as_deref()
                .map(|e| format!(", flush failed: {}", e))
                .unwrap_or_default()
        );
    }

    tracing::info!(run_id = %report.run_id, "Reconciliation job complete");
    Ok(())
}

/// Logs go to stderr; stdout belongs to the stdout transport.
/// RUST_LOG overrides --log-level.
fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,order_recon={}", args.log_level)));

    match args.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

fn build_loader(args: &Args) -> anyhow::Result<Arc<dyn SnapshotLoader>> {
    let loader: Arc<dyn SnapshotLoader> = match args.source {
        SourceKind::Local => Arc::new(LocalLoader::new(&args.data_dir)),
        SourceKind::ObjectStore => {
            let url = args
                .object_store_url
                .as_deref()
                .context("object store URL not configured")?;
            Arc::new(ObjectStoreLoader::new(
                url,
                args.object_store_token.clone(),
                OBJECT_STORE_TIMEOUT,
            )?)
        }
    };

    tracing::info!(source = %loader.describe(), "Loader ready");
    Ok(loader)
}

async fn build_publisher(args: &Args) -> anyhow::Result<Arc<dyn Publisher>> {
    let retry = RetryConfig::with_attempts(args.publish_attempts);

    let publisher: Arc<dyn Publisher> = match args.transport {
        TransportKind::Stdout => Arc::new(StdoutPublisher::stdout()),
        TransportKind::Kafka => Arc::new(
            KafkaPublisher::new(&args.kafka_brokers, args.topics(), retry)
                .context("creating Kafka producer")?,
        ),
        TransportKind::Nats => Arc::new(
            NatsPublisher::connect(&args.nats.nats_url, args.nats.credentials(), args.topics(), retry)
                .await
                .context("connecting to NATS")?,
        ),
        TransportKind::Discard => Arc::new(NoopPublisher),
    };

    tracing::info!(transport = publisher.name(), "Publisher ready");
    Ok(publisher)
}
