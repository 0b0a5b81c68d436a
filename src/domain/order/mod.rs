// ============================================================================
// Order Domain - Orders and their line items
// ============================================================================
//
// - Value objects (OrderReference, Order, OrderItem)
// - Errors (PriceError)
//
// ============================================================================

pub mod value_objects;
pub mod errors;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
