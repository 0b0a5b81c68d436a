// ============================================================================
// Loader - Source Extracts
// ============================================================================
//
// Fetches the three daily extracts and turns them into typed entities.
//
// Structure:
// - parse         - CSV bytes → flat records, header validation
// - local         - extracts on local disk
// - object_store  - extracts behind an HTTP object-store endpoint
// - naming        - <entity>_<DDMMYYYY>.csv source identifiers
//
// Every failure here is fatal for the run and is reported as either
// SourceUnavailable or MalformedSource.
//
// ============================================================================

mod local;
mod naming;
mod object_store;
mod parse;

use async_trait::async_trait;
use std::fmt;

use crate::domain::{Customer, FlatRecord, Order, OrderItem, RecordError};
use crate::reconciliation::Snapshot;

pub use local::LocalLoader;
pub use naming::{parse_run_date, SourceNames};
pub use object_store::ObjectStoreLoader;
pub use parse::parse_records;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customers,
    Orders,
    Items,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customers => "customers",
            EntityKind::Orders => "orders",
            EntityKind::Items => "items",
        }
    }

    /// Columns every extract of this kind must carry in its header
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Customers => &["customer_reference"],
            EntityKind::Orders => &["order_reference", "customer_reference"],
            EntityKind::Items => &["order_reference", "total_price"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    #[error("source '{source_id}' is malformed: {reason}")]
    MalformedSource { source_id: String, reason: String },
}

impl LoadError {
    pub fn unavailable(source_id: &str, reason: impl fmt::Display) -> Self {
        LoadError::SourceUnavailable {
            source_id: source_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(source_id: &str, reason: impl fmt::Display) -> Self {
        LoadError::MalformedSource {
            source_id: source_id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Where extracts come from. Implementations only need to produce the raw
/// bytes of a source; parsing is shared.
#[async_trait]
pub trait SnapshotLoader: Send + Sync {
    /// Human-readable location, for logs
    fn describe(&self) -> String;

    async fn fetch(&self, source_id: &str) -> Result<Vec<u8>, LoadError>;

    async fn load(&self, kind: EntityKind, source_id: &str) -> Result<Vec<FlatRecord>, LoadError> {
        let bytes = self.fetch(source_id).await?;
        let records = parse_records(kind, source_id, &bytes)?;

        tracing::info!(
            entity = %kind,
            source = %source_id,
            records = records.len(),
            "Loaded extract"
        );

        Ok(records)
    }
}

/// Load all three extracts concurrently and build the run's snapshot.
/// The first failure wins; nothing partial is returned.
pub async fn load_snapshot(
    loader: &dyn SnapshotLoader,
    names: &SourceNames,
) -> Result<Snapshot, LoadError> {
    let (customers, orders, items) = tokio::try_join!(
        loader.load(EntityKind::Customers, &names.customers),
        loader.load(EntityKind::Orders, &names.orders),
        loader.load(EntityKind::Items, &names.items),
    )?;

    Ok(Snapshot::new(
        materialize(&names.customers, &customers, Customer::from_record)?,
        materialize(&names.orders, &orders, Order::from_record)?,
        materialize(&names.items, &items, OrderItem::from_record)?,
    ))
}

fn materialize<T>(
    source_id: &str,
    records: &[FlatRecord],
    build: impl Fn(&FlatRecord) -> Result<T, RecordError>,
) -> Result<Vec<T>, LoadError> {
    records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            // +2: one for the header line, one for 1-based numbering
            build(record).map_err(|e| LoadError::malformed(source_id, format!("line {}: {}", row + 2, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct InMemoryLoader {
        files: HashMap<String, String>,
    }

    #[async_trait]
    impl SnapshotLoader for InMemoryLoader {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        async fn fetch(&self, source_id: &str) -> Result<Vec<u8>, LoadError> {
            self.files
                .get(source_id)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| LoadError::unavailable(source_id, "not found"))
        }
    }

    fn names() -> SourceNames {
        SourceNames {
            customers: "customers.csv".into(),
            orders: "orders.csv".into(),
            items: "items.csv".into(),
        }
    }

    fn loader(customers: &str, orders: &str, items: &str) -> InMemoryLoader {
        let mut files = HashMap::new();
        files.insert("customers.csv".to_string(), customers.to_string());
        files.insert("orders.csv".to_string(), orders.to_string());
        files.insert("items.csv".to_string(), items.to_string());
        InMemoryLoader { files }
    }

    #[tokio::test]
    async fn test_load_snapshot_builds_entities_in_order() {
        let loader = loader(
            "customer_reference,first_name\nC1,Ada\nC2,Grace\n",
            "order_reference,customer_reference\nO1,C1\nO2,C9\n",
            "item_reference,order_reference,total_price\nI1,O1,10.00\nI2,O1,5.00\n",
        );

        let snapshot = load_snapshot(&loader, &names()).await.unwrap();

        assert_eq!(snapshot.customers.len(), 2);
        assert_eq!(snapshot.customers[1].reference.as_str(), "C2");
        assert_eq!(snapshot.orders[1].customer_reference.as_str(), "C9");
        assert_eq!(snapshot.items[1].total_price, "5.00");
        assert_eq!(
            snapshot.items[0].attributes.get("item_reference").map(String::as_str),
            Some("I1")
        );
    }

    #[tokio::test]
    async fn test_missing_source_is_unavailable() {
        let mut loader = loader("customer_reference\n", "order_reference,customer_reference\n", "");
        loader.files.remove("items.csv");

        let err = load_snapshot(&loader, &names()).await.unwrap_err();
        assert!(matches!(err, LoadError::SourceUnavailable { ref source_id, .. } if source_id == "items.csv"));
    }

    #[tokio::test]
    async fn test_blank_customer_reference_is_malformed() {
        let loader = loader(
            "customer_reference\nC1\n\"\"\n",
            "order_reference,customer_reference\n",
            "order_reference,total_price\n",
        );

        let err = load_snapshot(&loader, &names()).await.unwrap_err();
        match err {
            LoadError::MalformedSource { source_id, reason } => {
                assert_eq!(source_id, "customers.csv");
                assert!(reason.contains("line 3"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
