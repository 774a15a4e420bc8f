// crates/utilmat-build/src/lib.rs
//
// utilmat-build: The utility matrix pipeline.
//
// Events flow leaf to root: the resolver attaches catalog item names, the
// reshaper turns each batch into a fragment aligned to the scaffold's column
// universe, the accumulator appends fragments, and the reconciler merges the
// per-chunk rows of each user into one. The orchestrator picks the in-memory
// or streaming path and always finishes with reconciliation.

pub mod accumulator;
pub mod orchestrator;
pub mod reconcile;
pub mod reshape;
pub mod resolver;
pub mod scaffold;
pub mod source;

// Re-export key types for ergonomic access from downstream crates.
pub use accumulator::Accumulator;
pub use orchestrator::{
    build_utility_matrix, BuildId, BuildPath, BuildReport, BuildRequest, BuiltMatrix,
    MatrixBuilder,
};
pub use reconcile::{ConflictPolicy, ReconcileReport};
pub use reshape::{reshape_chunk, MatrixFragment};
pub use resolver::{resolve_events, Resolution};
pub use scaffold::Scaffold;
pub use source::MemoryEventSource;
