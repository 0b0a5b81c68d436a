// ============================================================================
// Order Line Price Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,

    #[error("price '{0}' is not a decimal number")]
    Invalid(String),

    #[error("price '{0}' is negative")]
    Negative(String),

    #[error("price '{0}' is out of range")]
    OutOfRange(String),
}
