use serde::{Deserialize, Serialize};

use crate::domain::{CustomerReference, Money, OrderReference};

// ============================================================================
// Outbound Messages
// These are the records handed to the transport at the end of a run
// ============================================================================

/// Value of the `type` field carried by every outbound record
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    CustomerMessage,
    ErrorMessage,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::CustomerMessage => "customer_message",
            MessageType::ErrorMessage => "error_message",
        }
    }
}

/// The two referential-integrity failures the reconciler can report.
/// Serialized as the fixed human-readable message.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    #[serde(rename = "Customer reference not found in customers.")]
    MissingCustomer,
    #[serde(rename = "Order reference not found in orders.")]
    MissingOrder,
}

impl ErrorKind {
    /// Short label used for metrics
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::MissingCustomer => "missing_customer",
            ErrorKind::MissingOrder => "missing_order",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorRecord {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub customer_reference: Option<CustomerReference>,
    pub order_reference: OrderReference,
    pub message: ErrorKind,
}

impl ErrorRecord {
    /// An order pointing at a customer that is not in the customer set
    pub fn missing_customer(customer_reference: CustomerReference, order_reference: OrderReference) -> Self {
        Self {
            message_type: MessageType::ErrorMessage,
            customer_reference: Some(customer_reference),
            order_reference,
            message: ErrorKind::MissingCustomer,
        }
    }

    /// An item pointing at an order that is not in the order set
    pub fn missing_order(order_reference: OrderReference) -> Self {
        Self {
            message_type: MessageType::ErrorMessage,
            customer_reference: None,
            order_reference,
            message: ErrorKind::MissingOrder,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SummaryRecord {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub customer_reference: CustomerReference,
    pub orders: u64,
    pub total_price: Money,
}

impl SummaryRecord {
    pub fn new(customer_reference: CustomerReference, orders: u64, total_price: Money) -> Self {
        Self {
            message_type: MessageType::CustomerMessage,
            customer_reference,
            orders,
            total_price,
        }
    }
}

/// Either record class, as seen by a publisher.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum OutboundMessage {
    Summary(SummaryRecord),
    Error(ErrorRecord),
}

impl OutboundMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            OutboundMessage::Summary(s) => s.message_type,
            OutboundMessage::Error(e) => e.message_type,
        }
    }

    /// Key used for partitioning / message ids downstream
    pub fn routing_key(&self) -> &str {
        match self {
            OutboundMessage::Summary(s) => s.customer_reference.as_str(),
            OutboundMessage::Error(e) => e.order_reference.as_str(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<SummaryRecord> for OutboundMessage {
    fn from(record: SummaryRecord) -> Self {
        OutboundMessage::Summary(record)
    }
}

impl From<ErrorRecord> for OutboundMessage {
    fn from(record: ErrorRecord) -> Self {
        OutboundMessage::Error(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_record_wire_shape() {
        let record = ErrorRecord::missing_customer(
            CustomerReference::new("C9"),
            OrderReference::new("O2"),
        );

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"type":"error_message","customer_reference":"C9","order_reference":"O2","message":"Customer reference not found in customers."}"#
        );
    }

    #[test]
    fn test_missing_order_has_null_customer() {
        let record = ErrorRecord::missing_order(OrderReference::new("O5"));

        let value = serde_json::to_value(&record).unwrap();
        assert!(value["customer_reference"].is_null());
        assert_eq!(value["message"], "Order reference not found in orders.");
        assert_eq!(value["type"], "error_message");
    }

    #[test]
    fn test_summary_record_wire_shape() {
        let record = SummaryRecord::new(
            CustomerReference::new("C1"),
            1,
            Money::parse("15.00").unwrap(),
        );

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"type":"customer_message","customer_reference":"C1","orders":1,"total_price":15.0}"#
        );
    }

    #[test]
    fn test_outbound_message_is_untagged() {
        let summary: OutboundMessage =
            SummaryRecord::new(CustomerReference::new("C1"), 2, Money::ZERO).into();
        let error: OutboundMessage = ErrorRecord::missing_order(OrderReference::new("O5")).into();

        assert_eq!(summary.message_type(), MessageType::CustomerMessage);
        assert_eq!(summary.routing_key(), "C1");
        assert_eq!(error.message_type(), MessageType::ErrorMessage);
        assert_eq!(error.routing_key(), "O5");

        let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "customer_message");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_error_kind_serializes_as_fixed_message() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::MissingCustomer).unwrap(),
            r#""Customer reference not found in customers.""#
        );
        assert_eq!(
            serde_json::to_string(&ErrorKind::MissingOrder).unwrap(),
            r#""Order reference not found in orders.""#
        );
    }
}
