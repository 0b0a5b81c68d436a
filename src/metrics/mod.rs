// Private module declaration
mod textfile;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};
use std::path::Path;

// ============================================================================
// Metrics Module - Prometheus metrics for one reconciliation run
// ============================================================================
//
// Covers:
// - Records loaded per entity
// - Validation errors per kind
// - Summaries produced
// - Deliveries and delivery failures per record class
// - Stage durations (load, reconcile, aggregate, publish)
//
// The job is a batch run, so nothing is scraped: the registry is rendered in
// text exposition format to a file at the end of the run.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub records_loaded: IntCounterVec,
    pub validation_errors: IntCounterVec,
    pub summaries: IntCounter,
    pub messages_published: IntCounterVec,
    pub publish_failures: IntCounterVec,
    pub stage_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let records_loaded = IntCounterVec::new(
            Opts::new("recon_records_loaded_total", "Records loaded from the source extracts"),
            &["entity"],
        )?;
        registry.register(Box::new(records_loaded.clone()))?;

        let validation_errors = IntCounterVec::new(
            Opts::new("recon_validation_errors_total", "Referential-integrity errors found"),
            &["kind"],
        )?;
        registry.register(Box::new(validation_errors.clone()))?;

        let summaries = IntCounter::new("recon_summaries_total", "Customer summaries produced")?;
        registry.register(Box::new(summaries.clone()))?;

        let messages_published = IntCounterVec::new(
            Opts::new("recon_messages_published_total", "Records accepted by the transport"),
            &["message_type"],
        )?;
        registry.register(Box::new(messages_published.clone()))?;

        let publish_failures = IntCounterVec::new(
            Opts::new("recon_publish_failures_total", "Records the transport did not accept"),
            &["message_type"],
        )?;
        registry.register(Box::new(publish_failures.clone()))?;

        let stage_duration = HistogramVec::new(
            HistogramOpts::new("recon_stage_duration_seconds", "Duration of each pipeline stage")
                .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]),
            &["stage"],
        )?;
        registry.register(Box::new(stage_duration.clone()))?;

        Ok(Self {
            registry,
            records_loaded,
            validation_errors,
            summaries,
            messages_published,
            publish_failures,
            stage_duration,
        })
    }

    pub fn record_loaded(&self, entity: &str, count: usize) {
        self.records_loaded.with_label_values(&[entity]).inc_by(count as u64);
    }

    pub fn record_validation_error(&self, kind: &str) {
        self.validation_errors.with_label_values(&[kind]).inc();
    }

    pub fn record_summaries(&self, count: usize) {
        self.summaries.inc_by(count as u64);
    }

    pub fn record_delivery(&self, message_type: &str, success: bool) {
        if success {
            self.messages_published.with_label_values(&[message_type]).inc();
        } else {
            self.publish_failures.with_label_values(&[message_type]).inc();
        }
    }

    pub fn observe_stage(&self, stage: &str, duration_secs: f64) {
        self.stage_duration.with_label_values(&[stage]).observe(duration_secs);
    }

    pub async fn write_textfile(&self, path: &Path) -> anyhow::Result<()> {
        textfile::write(&self.registry, path).await
    }
}
