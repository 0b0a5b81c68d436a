use csv::{ReaderBuilder, Trim};

use super::{EntityKind, LoadError};
use crate::domain::FlatRecord;

/// Parse a CSV extract with a header row into flat records.
///
/// The header must name every required column for `kind`. Rows must have
/// as many fields as the header. Blank lines are skipped.
pub fn parse_records(kind: EntityKind, source_id: &str, bytes: &[u8]) -> Result<Vec<FlatRecord>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::malformed(source_id, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::malformed(source_id, "missing header row"));
    }

    for column in kind.required_columns() {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::malformed(
                source_id,
                format!("{} extract has no '{}' column", kind, column),
            ));
        }
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| LoadError::malformed(source_id, e))?;
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.as_str(), v))
                .collect(),
        );
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_extract() {
        let data = b"customer_reference,first_name,last_name\nC1,Ada,Lovelace\nC2,Grace,Hopper\n";

        let records = parse_records(EntityKind::Customers, "customers.csv", data).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("customer_reference"), Some("C1"));
        assert_eq!(records[1].get("last_name"), Some("Hopper"));
    }

    #[test]
    fn test_header_whitespace_is_trimmed() {
        let data = b"order_reference , total_price\nO1,10.00\n";

        let records = parse_records(EntityKind::Items, "items.csv", data).unwrap();
        assert_eq!(records[0].get("total_price"), Some("10.00"));
    }

    #[test]
    fn test_quoted_fields() {
        let data = b"customer_reference,address\nC1,\"1 Main St, Springfield\"\n";

        let records = parse_records(EntityKind::Customers, "customers.csv", data).unwrap();
        assert_eq!(records[0].get("address"), Some("1 Main St, Springfield"));
    }

    #[test]
    fn test_header_only_is_empty_set() {
        let data = b"order_reference,customer_reference\n";
        let records = parse_records(EntityKind::Orders, "orders.csv", data).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_required_column() {
        let data = b"order_reference,price\nO1,1.00\n";

        let err = parse_records(EntityKind::Items, "items.csv", data).unwrap_err();
        match err {
            LoadError::MalformedSource { source_id, reason } => {
                assert_eq!(source_id, "items.csv");
                assert!(reason.contains("total_price"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file_is_malformed() {
        let err = parse_records(EntityKind::Customers, "customers.csv", b"").unwrap_err();
        assert!(matches!(err, LoadError::MalformedSource { .. }));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let data = b"order_reference,customer_reference\nO1,C1\nO2\n";

        let err = parse_records(EntityKind::Orders, "orders.csv", data).unwrap_err();
        assert!(matches!(err, LoadError::MalformedSource { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let data = b"customer_reference\n\xff\xfe\n";

        let err = parse_records(EntityKind::Customers, "customers.csv", data).unwrap_err();
        assert!(matches!(err, LoadError::MalformedSource { .. }));
    }
}
