// crates/utilmat-build/src/reshape.rs
//
// Chunk reshaper: long (user, item name, rating) events -> wide fragment.
//
// One row per distinct user of the batch (first-appearance order), one cell
// per column of the universe. A repeated (user, item) pair keeps the first
// rating seen in batch order; later ones are discarded, never averaged.
// A NaN rating is a missing value: its user still gets a row, its cell stays
// empty.

use std::collections::HashMap;
use std::sync::Arc;

use utilmat_core::{user_key, ColumnUniverse, ResolvedEvent, UtilmatError};

/// Wide matrix slice produced from one batch.
#[derive(Debug, Clone)]
pub struct MatrixFragment {
    pub(crate) columns: Arc<ColumnUniverse>,
    pub(crate) users: Vec<String>,
    pub(crate) cells: Vec<Option<f64>>,
    pub(crate) duplicates_dropped: usize,
}

impl MatrixFragment {
    /// Row keys (`User_<id>`) in row order.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Cells of row `index`, aligned to the universe.
    pub fn row(&self, index: usize) -> Option<&[Option<f64>]> {
        let width = self.columns.len();
        if index >= self.users.len() {
            return None;
        }
        Some(&self.cells[index * width..(index + 1) * width])
    }

    pub fn columns(&self) -> &Arc<ColumnUniverse> {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Intra-batch duplicate (user, item) events that were discarded.
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }
}

/// Pivot a resolved batch into a fragment aligned to `columns`.
///
/// Fails with `Inconsistent` if an event names an item outside the
/// universe, which means the batch was resolved against a different catalog.
pub fn reshape_chunk(
    events: Vec<ResolvedEvent>,
    columns: &Arc<ColumnUniverse>,
) -> Result<MatrixFragment, UtilmatError> {
    let width = columns.len();
    let mut rows: HashMap<String, usize> = HashMap::new();
    let mut users: Vec<String> = Vec::new();
    let mut cells: Vec<Option<f64>> = Vec::new();
    let mut duplicates_dropped = 0;

    for event in events {
        let col = columns.index_of(&event.item_name).ok_or_else(|| {
            UtilmatError::Inconsistent(format!(
                "item {:?} is not part of the column universe",
                event.item_name
            ))
        })?;

        let row = match rows.get(&event.user_id) {
            Some(&row) => row,
            None => {
                let row = users.len();
                users.push(user_key(&event.user_id));
                cells.resize(cells.len() + width, None);
                rows.insert(event.user_id, row);
                row
            }
        };

        if event.rating.is_nan() {
            continue;
        }
        let cell = &mut cells[row * width + col];
        if cell.is_some() {
            duplicates_dropped += 1;
        } else {
            *cell = Some(event.rating);
        }
    }

    Ok(MatrixFragment {
        columns: Arc::clone(columns),
        users,
        cells,
        duplicates_dropped,
    })
}
