// crates/utilmat-core/src/lib.rs
//
// utilmat-core: Core types, errors, and the utility matrix for utilmat.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines rating events, the item catalog, the column universe every
// matrix row is aligned to, the final utility matrix, and the event source
// trait implemented by batch producers.

pub mod catalog;
pub mod error;
pub mod event;
pub mod matrix;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use utilmat_core::UtilityMatrix;`

// Event types
pub use event::{user_key, RatingEvent, ResolvedEvent, USER_KEY_PREFIX};

// Catalog types
pub use catalog::{Catalog, CatalogEntry};

// Matrix types
pub use matrix::{ColumnUniverse, UtilityMatrix};

// Error type
pub use error::UtilmatError;

// Traits
pub use traits::{EventBatches, EventSource};
