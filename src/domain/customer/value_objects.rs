use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{FlatRecord, RecordError};

// ============================================================================
// Customer Value Objects
// ============================================================================

pub const CUSTOMER_REFERENCE: &str = "customer_reference";

/// Business key of a customer, as it appears in every extract
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerReference(pub String);

impl CustomerReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row of the customers extract. Columns other than the reference are
/// carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub reference: CustomerReference,
    pub attributes: BTreeMap<String, String>,
}

impl Customer {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: CustomerReference::new(reference),
            attributes: BTreeMap::new(),
        }
    }

    pub fn from_record(record: &FlatRecord) -> Result<Self, RecordError> {
        let reference = record.require_non_empty(CUSTOMER_REFERENCE)?;
        Ok(Self {
            attributes: record.attributes_without(&[CUSTOMER_REFERENCE]),
            ..Self::new(reference.trim())
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
