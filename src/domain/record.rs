use std::collections::BTreeMap;

// ============================================================================
// Flat Records
// ============================================================================
//
// One row of a source extract: column name → raw string value.
// No coercion happens here; typed entities are built on top.
//
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' is empty")]
    EmptyField(&'static str),
}

impl FlatRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Field that must be present (it may still be empty)
    pub fn require(&self, key: &'static str) -> Result<&str, RecordError> {
        self.get(key).ok_or(RecordError::MissingField(key))
    }

    /// Field that must be present and non-blank
    pub fn require_non_empty(&self, key: &'static str) -> Result<&str, RecordError> {
        let value = self.require(key)?;
        if value.trim().is_empty() {
            return Err(RecordError::EmptyField(key));
        }
        Ok(value)
    }

    /// Everything except the named columns, for opaque pass-through
    pub fn attributes_without(&self, keys: &[&str]) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter(|(k, _)| !keys.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for FlatRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_missing_field() {
        let record = FlatRecord::from_iter([("order_reference", "O1")]);

        assert_eq!(record.require("order_reference"), Ok("O1"));
        assert_eq!(
            record.require("customer_reference"),
            Err(RecordError::MissingField("customer_reference"))
        );
    }

    #[test]
    fn test_require_non_empty_rejects_blank() {
        let record = FlatRecord::from_iter([("customer_reference", "  ")]);

        assert_eq!(
            record.require_non_empty("customer_reference"),
            Err(RecordError::EmptyField("customer_reference"))
        );
    }

    #[test]
    fn test_attributes_without_drops_keys() {
        let record: FlatRecord = [
            ("customer_reference", "C1"),
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
        ]
        .into_iter()
        .collect();

        let attributes = record.attributes_without(&["customer_reference"]);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes.get("first_name").map(String::as_str), Some("Ada"));
    }
}
