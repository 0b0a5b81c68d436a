use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::loader::{load_snapshot, EntityKind, LoadError, SnapshotLoader, SourceNames};
use crate::messaging::{DeadLetter, DeadLetterFile, Publisher};
use crate::metrics::Metrics;
use crate::models::{MessageType, OutboundMessage};
use crate::reconciliation::{reconcile, summarize, AggregationError};

// ============================================================================
// Pipeline - one reconciliation run
// ============================================================================
//
// load → reconcile + summarize → publish (summaries, then errors)
//
// Load and aggregation failures abort the run before anything is published.
// Delivery failures do not: every record is still offered to the transport,
// and the failures are reported back in the RunReport.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedDelivery {
    pub message_type: MessageType,
    pub routing_key: String,
    pub error: String,
}

#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub summaries: usize,
    pub errors: usize,
    pub published: usize,
    pub failed: Vec<FailedDelivery>,
    pub flush_error: Option<String>,
}

impl RunReport {
    /// Every record reached the transport
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.flush_error.is_none()
    }
}

pub struct Pipeline {
    loader: Arc<dyn SnapshotLoader>,
    publisher: Arc<dyn Publisher>,
    metrics: Arc<Metrics>,
    dead_letters: Option<DeadLetterFile>,
}

impl Pipeline {
    pub fn new(loader: Arc<dyn SnapshotLoader>, publisher: Arc<dyn Publisher>, metrics: Arc<Metrics>) -> Self {
        Self {
            loader,
            publisher,
            metrics,
            dead_letters: None,
        }
    }

    pub fn with_dead_letters(mut self, file: DeadLetterFile) -> Self {
        self.dead_letters = Some(file);
        self
    }

    pub async fn run(&self, names: &SourceNames) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4();
        tracing::info!(
            run_id = %run_id,
            source = %self.loader.describe(),
            transport = self.publisher.name(),
            customers = %names.customers,
            orders = %names.orders,
            items = %names.items,
            "Starting reconciliation run"
        );

        let started = Instant::now();
        let snapshot = load_snapshot(self.loader.as_ref(), names).await?;
        self.metrics.observe_stage("load", started.elapsed().as_secs_f64());
        self.metrics.record_loaded(EntityKind::Customers.as_str(), snapshot.customers.len());
        self.metrics.record_loaded(EntityKind::Orders.as_str(), snapshot.orders.len());
        self.metrics.record_loaded(EntityKind::Items.as_str(), snapshot.items.len());

        let started = Instant::now();
        let errors = reconcile(&snapshot);
        self.metrics.observe_stage("reconcile", started.elapsed().as_secs_f64());
        for error in &errors {
            self.metrics.record_validation_error(error.message.label());
        }

        let started = Instant::now();
        let summaries = summarize(&snapshot)?;
        self.metrics.observe_stage("aggregate", started.elapsed().as_secs_f64());
        self.metrics.record_summaries(summaries.len());

        tracing::info!(
            run_id = %run_id,
            summaries = summaries.len(),
            errors = errors.len(),
            "Reconciliation complete"
        );

        let mut report = RunReport {
            run_id,
            summaries: summaries.len(),
            errors: errors.len(),
            published: 0,
            failed: Vec::new(),
            flush_error: None,
        };

        let started = Instant::now();
        let outbound = summaries
            .into_iter()
            .map(OutboundMessage::from)
            .chain(errors.into_iter().map(OutboundMessage::from));
        for message in outbound {
            self.deliver(run_id, &message, &mut report).await;
        }

        if let Err(e) = self.publisher.flush().await {
            tracing::error!(run_id = %run_id, error = %e, "Flushing transport failed");
            report.flush_error = Some(e.to_string());
        }
        self.metrics.observe_stage("publish", started.elapsed().as_secs_f64());

        tracing::info!(
            run_id = %run_id,
            published = report.published,
            failed = report.failed.len(),
            "Run finished"
        );

        Ok(report)
    }

    async fn deliver(&self, run_id: Uuid, message: &OutboundMessage, report: &mut RunReport) {
        let message_type = message.message_type();

        match self.publisher.publish(message).await {
            Ok(()) => {
                self.metrics.record_delivery(message_type.as_str(), true);
                report.published += 1;
            }
            Err(e) => {
                self.metrics.record_delivery(message_type.as_str(), false);
                tracing::error!(
                    run_id = %run_id,
                    key = %message.routing_key(),
                    message_type = message_type.as_str(),
                    error = %e,
                    "Failed to deliver record"
                );

                if let Some(file) = &self.dead_letters {
                    if let Err(write_err) = file.append(&DeadLetter::new(run_id, message, &e)).await {
                        tracing::error!(
                            run_id = %run_id,
                            key = %message.routing_key(),
                            error = %write_err,
                            "Could not write dead letter"
                        );
                    }
                }

                report.failed.push(FailedDelivery {
                    message_type,
                    routing_key: message.routing_key().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
}
