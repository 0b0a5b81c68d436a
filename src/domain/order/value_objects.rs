use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::errors::PriceError;
use crate::domain::customer::{CustomerReference, CUSTOMER_REFERENCE};
use crate::domain::{FlatRecord, Money, RecordError};

// ============================================================================
// Order Value Objects
// ============================================================================

pub const ORDER_REFERENCE: &str = "order_reference";
pub const TOTAL_PRICE: &str = "total_price";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(pub String);

impl OrderReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row of the orders extract. `customer_reference` may point at a customer
/// that does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub reference: OrderReference,
    pub customer_reference: CustomerReference,
    pub attributes: BTreeMap<String, String>,
}

impl Order {
    pub fn new(reference: impl Into<String>, customer_reference: impl Into<String>) -> Self {
        Self {
            reference: OrderReference::new(reference),
            customer_reference: CustomerReference::new(customer_reference),
            attributes: BTreeMap::new(),
        }
    }

    pub fn from_record(record: &FlatRecord) -> Result<Self, RecordError> {
        let reference = record.require(ORDER_REFERENCE)?.trim();
        let customer_reference = record.require(CUSTOMER_REFERENCE)?.trim();
        Ok(Self {
            attributes: record.attributes_without(&[ORDER_REFERENCE, CUSTOMER_REFERENCE]),
            ..Self::new(reference, customer_reference)
        })
    }
}

/// A row of the items extract.
///
/// The price stays in its source form until aggregation needs it, so a bad
/// price on an item nobody sums never fails the run.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub order_reference: OrderReference,
    pub total_price: String,
    pub attributes: BTreeMap<String, String>,
}

impl OrderItem {
    pub fn new(order_reference: impl Into<String>, total_price: impl Into<String>) -> Self {
        Self {
            order_reference: OrderReference::new(order_reference),
            total_price: total_price.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn from_record(record: &FlatRecord) -> Result<Self, RecordError> {
        let order_reference = record.require(ORDER_REFERENCE)?.trim();
        let total_price = record.require(TOTAL_PRICE)?;
        Ok(Self {
            attributes: record.attributes_without(&[ORDER_REFERENCE, TOTAL_PRICE]),
            ..Self::new(order_reference, total_price)
        })
    }

    pub fn price(&self) -> Result<Money, PriceError> {
        Money::parse(&self.total_price)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_record() {
        let record = FlatRecord::from_iter([
            ("order_reference", "O1"),
            ("customer_reference", " C1 "),
            ("order_timestamp", "2023-03-01T10:00:00"),
        ]);

        let order = Order::from_record(&record).unwrap();
        assert_eq!(order.reference, OrderReference::new("O1"));
        assert_eq!(order.customer_reference, CustomerReference::new("C1"));
        assert_eq!(order.attributes.len(), 1);
    }

    #[test]
    fn test_order_requires_both_keys() {
        let record = FlatRecord::from_iter([("order_reference", "O1")]);
        assert_eq!(
            Order::from_record(&record),
            Err(RecordError::MissingField("customer_reference"))
        );
    }

    #[test]
    fn test_item_keeps_raw_price() {
        let record = FlatRecord::from_iter([
            ("item_reference", "I1"),
            ("order_reference", "O1"),
            ("total_price", "not-a-number"),
        ]);

        let item = OrderItem::from_record(&record).unwrap();
        assert_eq!(item.total_price, "not-a-number");
        assert!(matches!(item.price(), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_item_price() {
        let item = OrderItem::new("O1", "10.00");
        assert_eq!(item.price().unwrap(), Money::parse("10").unwrap());
    }

    #[test]
    fn test_item_requires_price_column() {
        let record = FlatRecord::from_iter([("order_reference", "O1")]);
        assert_eq!(
            OrderItem::from_record(&record),
            Err(RecordError::MissingField("total_price"))
        );
    }
}
