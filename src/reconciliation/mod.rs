// ============================================================================
// Reconciliation Core
// ============================================================================
//
// Pure functions over one immutable daily snapshot:
// - reconciler  - referential-integrity checks, produces ErrorRecords
// - aggregator  - per-customer order count and spend, produces SummaryRecords
//
// Neither stage knows about files, buckets or transports.
//
// ============================================================================

mod aggregator;
mod index;
mod reconciler;
mod snapshot;

pub use aggregator::{summarize, AggregationError};
pub use reconciler::reconcile;
pub use snapshot::Snapshot;
