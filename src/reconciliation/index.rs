use std::collections::HashMap;

use crate::domain::OrderItem;

use super::Snapshot;

/// Lookup of customer and order references to the position of their first
/// occurrence in the snapshot. Later duplicates are ignored.
pub(super) struct ReferenceIndex<'a> {
    customers: HashMap<&'a str, usize>,
    orders: HashMap<&'a str, usize>,
}

impl<'a> ReferenceIndex<'a> {
    pub fn build(snapshot: &'a Snapshot) -> Self {
        let mut customers = HashMap::with_capacity(snapshot.customers.len());
        for (position, customer) in snapshot.customers.iter().enumerate() {
            let existing = *customers.entry(customer.reference.as_str()).or_insert(position);
            if existing != position {
                tracing::warn!(
                    customer_reference = %customer.reference,
                    "Duplicate customer reference, keeping first occurrence"
                );
            }
        }

        let mut orders = HashMap::with_capacity(snapshot.orders.len());
        for (position, order) in snapshot.orders.iter().enumerate() {
            let existing = *orders.entry(order.reference.as_str()).or_insert(position);
            if existing != position {
                tracing::warn!(
                    order_reference = %order.reference,
                    "Duplicate order reference, keeping first occurrence"
                );
            }
        }

        Self { customers, orders }
    }

    pub fn has_customer(&self, reference: &str) -> bool {
        self.customers.contains_key(reference)
    }

    pub fn has_order(&self, reference: &str) -> bool {
        self.orders.contains_key(reference)
    }

    /// True when `position` is the row that owns `reference`
    pub fn is_first_order(&self, reference: &str, position: usize) -> bool {
        self.orders.get(reference) == Some(&position)
    }
}

/// Items grouped by the order they point at, in item load order.
/// Covers every item, valid or not.
pub(super) struct ItemsByOrder<'a> {
    items: HashMap<&'a str, Vec<&'a OrderItem>>,
}

impl<'a> ItemsByOrder<'a> {
    pub fn build(items: &'a [OrderItem]) -> Self {
        let mut grouped: HashMap<&'a str, Vec<&'a OrderItem>> = HashMap::new();
        for item in items {
            grouped
                .entry(item.order_reference.as_str())
                .or_default()
                .push(item);
        }
        Self { items: grouped }
    }

    pub fn for_order(&self, reference: &str) -> &[&'a OrderItem] {
        self.items.get(reference).map(Vec::as_slice).unwrap_or(&[])
    }
}
