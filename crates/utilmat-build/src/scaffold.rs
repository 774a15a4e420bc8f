// crates/utilmat-build/src/scaffold.rs
//
// Matrix scaffold: the column universe for one build.
//
// Computed once from the catalog at the start of a build. Chunks never
// extend it; every fragment and every accumulated row is aligned to it.

use std::sync::Arc;

use utilmat_core::{Catalog, ColumnUniverse};

use crate::accumulator::Accumulator;

/// Column universe derived from a catalog: distinct item names in catalog
/// order.
#[derive(Debug, Clone)]
pub struct Scaffold {
    columns: Arc<ColumnUniverse>,
}

impl Scaffold {
    /// Derive the scaffold from a catalog.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let columns = ColumnUniverse::from_names(catalog.item_names());
        tracing::debug!(
            "Scaffold: {} columns from {} catalog entries",
            columns.len(),
            catalog.len()
        );
        Self {
            columns: Arc::new(columns),
        }
    }

    /// Shared handle to the column universe, passed to every reshape.
    pub fn columns(&self) -> &Arc<ColumnUniverse> {
        &self.columns
    }

    /// Start an empty accumulation aligned to this scaffold.
    pub fn accumulator(&self) -> Accumulator {
        Accumulator::new(Arc::clone(&self.columns))
    }
}
