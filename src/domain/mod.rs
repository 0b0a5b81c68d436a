// ============================================================================
// Domain Layer - Snapshot Entities
// ============================================================================
//
// The three entities of a daily extract and the value objects they carry.
// Each entity has its own subdirectory with:
// - Value objects (references, the entity itself)
// - Errors
//
// Nothing here knows where records come from or where results go.
//
// ============================================================================

pub mod customer;
pub mod order;
mod money;
mod record;

pub use customer::{Customer, CustomerReference};
pub use money::Money;
pub use order::{Order, OrderItem, OrderReference, PriceError};
pub use record::{FlatRecord, RecordError};
