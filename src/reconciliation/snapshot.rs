use crate::domain::{Customer, Order, OrderItem};

/// The three record sets of one run, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub items: Vec<OrderItem>,
}

impl Snapshot {
    pub fn new(customers: Vec<Customer>, orders: Vec<Order>, items: Vec<OrderItem>) -> Self {
        Self {
            customers,
            orders,
            items,
        }
    }
}
