use std::collections::HashMap;

use crate::domain::{CustomerReference, Money, OrderReference, PriceError};
use crate::models::SummaryRecord;

use super::index::{ItemsByOrder, ReferenceIndex};
use super::Snapshot;

// ============================================================================
// Aggregation Errors
// ============================================================================
//
// Any of these aborts the run: a summary built from a partially parsed
// snapshot must never be published.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("order '{order_reference}': invalid item price: {source}")]
    Price {
        order_reference: OrderReference,
        #[source]
        source: PriceError,
    },

    #[error("total spend for customer '{0}' overflowed")]
    Overflow(CustomerReference),
}

struct CustomerTotals {
    customer_reference: CustomerReference,
    orders: u64,
    total_price: Money,
}

/// Per-customer order count and spend over valid orders.
///
/// Orders are scanned in load order. An order counts once if its customer
/// exists; its items' prices are summed in item load order. Customers appear
/// in the order their first valid order was seen; customers without a valid
/// order do not appear at all.
pub fn summarize(snapshot: &Snapshot) -> Result<Vec<SummaryRecord>, AggregationError> {
    let index = ReferenceIndex::build(snapshot);
    let items = ItemsByOrder::build(&snapshot.items);

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CustomerTotals> = Vec::new();

    for (position, order) in snapshot.orders.iter().enumerate() {
        let customer_reference = order.customer_reference.as_str();

        if !index.has_customer(customer_reference) {
            continue;
        }
        if !index.is_first_order(order.reference.as_str(), position) {
            continue;
        }

        let mut order_total = Money::ZERO;
        for item in items.for_order(order.reference.as_str()) {
            let price = item.price().map_err(|source| AggregationError::Price {
                order_reference: order.reference.clone(),
                source,
            })?;
            order_total = order_total
                .checked_add(price)
                .ok_or_else(|| AggregationError::Overflow(order.customer_reference.clone()))?;
        }

        let slot = *positions.entry(customer_reference).or_insert_with(|| {
            totals.push(CustomerTotals {
                customer_reference: order.customer_reference.clone(),
                orders: 0,
                total_price: Money::ZERO,
            });
            totals.len() - 1
        });

        let entry = &mut totals[slot];
        entry.orders += 1;
        entry.total_price = entry
            .total_price
            .checked_add(order_total)
            .ok_or_else(|| AggregationError::Overflow(order.customer_reference.clone()))?;
    }

    Ok(totals
        .into_iter()
        .map(|t| SummaryRecord::new(t.customer_reference, t.orders, t.total_price))
        .collect())
}
