use crate::models::ErrorRecord;

use super::index::ReferenceIndex;
use super::Snapshot;

/// Cross-check orders against customers and items against orders.
///
/// Every order whose customer is unknown yields one missing-customer error,
/// in order load order. These are followed by one missing-order error per
/// item whose order is unknown, in item load order. The two checks are
/// independent of each other.
pub fn reconcile(snapshot: &Snapshot) -> Vec<ErrorRecord> {
    let index = ReferenceIndex::build(snapshot);

    let missing_customers = snapshot
        .orders
        .iter()
        .filter(|order| !index.has_customer(order.customer_reference.as_str()))
        .map(|order| {
            tracing::debug!(
                order_reference = %order.reference,
                customer_reference = %order.customer_reference,
                "Order references unknown customer"
            );
            ErrorRecord::missing_customer(order.customer_reference.clone(), order.reference.clone())
        });

    let missing_orders = snapshot
        .items
        .iter()
        .filter(|item| !index.has_order(item.order_reference.as_str()))
        .map(|item| {
            tracing::debug!(
                order_reference = %item.order_reference,
                "Item references unknown order"
            );
            ErrorRecord::missing_order(item.order_reference.clone())
        });

    missing_customers.chain(missing_orders).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Customer, Order, OrderItem, OrderReference};
    use crate::models::ErrorKind;

    fn scenario_a() -> Snapshot {
        Snapshot::new(
            vec![Customer::new("C1"), Customer::new("C2")],
            vec![Order::new("O1", "C1"), Order::new("O2", "C9")],
            vec![
                OrderItem::new("O1", "10.00"),
                OrderItem::new("O1", "5.00"),
                OrderItem::new("O5", "3.00"),
            ],
        )
    }

    #[test]
    fn test_scenario_a_errors() {
        let errors = reconcile(&scenario_a());

        assert_eq!(errors.len(), 2);

        assert_eq!(errors[0].message, ErrorKind::MissingCustomer);
        assert_eq!(errors[0].customer_reference.as_ref().map(|c| c.as_str()), Some("C9"));
        assert_eq!(errors[0].order_reference, OrderReference::new("O2"));

        assert_eq!(errors[1].message, ErrorKind::MissingOrder);
        assert_eq!(errors[1].customer_reference, None);
        assert_eq!(errors[1].order_reference, OrderReference::new("O5"));
    }

    #[test]
    fn test_empty_orders_and_items() {
        let snapshot = Snapshot::new(vec![Customer::new("C1")], vec![], vec![]);
        assert!(reconcile(&snapshot).is_empty());
    }

    #[test]
    fn test_missing_customer_errors_come_first() {
        // Item errors are interleaved with order errors in the input;
        // output groups them by kind, keeping load order inside each group
        let snapshot = Snapshot::new(
            vec![Customer::new("C1")],
            vec![
                Order::new("O1", "X1"),
                Order::new("O2", "C1"),
                Order::new("O3", "X2"),
            ],
            vec![
                OrderItem::new("Z1", "1.00"),
                OrderItem::new("O2", "1.00"),
                OrderItem::new("Z2", "1.00"),
            ],
        );

        let errors = reconcile(&snapshot);
        let refs: Vec<(ErrorKind, &str)> = errors
            .iter()
            .map(|e| (e.message, e.order_reference.as_str()))
            .collect();

        assert_eq!(
            refs,
            vec![
                (ErrorKind::MissingCustomer, "O1"),
                (ErrorKind::MissingCustomer, "O3"),
                (ErrorKind::MissingOrder, "Z1"),
                (ErrorKind::MissingOrder, "Z2"),
            ]
        );
    }

    #[test]
    fn test_dangling_order_items_are_not_reported() {
        // O2 has an unknown customer, but its item does point at an existing order
        let snapshot = Snapshot::new(
            vec![Customer::new("C1")],
            vec![Order::new("O2", "C9")],
            vec![OrderItem::new("O2", "4.00")],
        );

        let errors = reconcile(&snapshot);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, ErrorKind::MissingCustomer);
    }

    #[test]
    fn test_each_dangling_row_reported_once() {
        let snapshot = Snapshot::new(
            vec![],
            vec![Order::new("O1", "C1")],
            vec![OrderItem::new("O7", "1.00"), OrderItem::new("O7", "2.00")],
        );

        let errors = reconcile(&snapshot);
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.iter().filter(|e| e.message == ErrorKind::MissingOrder).count(),
            2
        );
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let snapshot = scenario_a();
        let first = serde_json::to_string(&reconcile(&snapshot)).unwrap();
        let second = serde_json::to_string(&reconcile(&snapshot)).unwrap();
        assert_eq!(first, second);
    }
}
