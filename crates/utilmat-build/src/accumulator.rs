// crates/utilmat-build/src/accumulator.rs
//
// Accumulator: row-wise append of chunk fragments.
//
// Appending never merges rows. A user touched by several chunks owns one
// physical row per chunk until the reconciler runs. Rows live in a flat
// arena of fixed width; a user-key -> physical-rows table records where each
// user's rows are, in append order.

use std::collections::HashMap;
use std::sync::Arc;

use utilmat_core::{ColumnUniverse, UtilityMatrix, UtilmatError};

use crate::reconcile::{self, ConflictPolicy, ReconcileReport};
use crate::reshape::MatrixFragment;

/// Growing, not yet reconciled utility matrix.
///
/// Created from a [`crate::Scaffold`]; consumed by [`Accumulator::reconcile`].
#[derive(Debug, Clone)]
pub struct Accumulator {
    pub(crate) columns: Arc<ColumnUniverse>,
    pub(crate) row_keys: Vec<String>,
    pub(crate) cells: Vec<Option<f64>>,
    /// Physical row indices per user key, in append order.
    pub(crate) rows_by_user: HashMap<String, Vec<usize>>,
    /// Distinct user keys in first-appearance order.
    pub(crate) user_order: Vec<String>,
}

impl Accumulator {
    pub(crate) fn new(columns: Arc<ColumnUniverse>) -> Self {
        Self {
            columns,
            row_keys: Vec::new(),
            cells: Vec::new(),
            rows_by_user: HashMap::new(),
            user_order: Vec::new(),
        }
    }

    /// Append a fragment's rows after the existing rows.
    ///
    /// The fragment must be aligned to this accumulator's universe;
    /// otherwise the build is inconsistent and nothing is appended.
    pub fn append(&mut self, fragment: MatrixFragment) -> Result<(), UtilmatError> {
        if !Arc::ptr_eq(&self.columns, &fragment.columns) && *self.columns != *fragment.columns {
            return Err(UtilmatError::Inconsistent(format!(
                "fragment has {} columns aligned to a different universe \
                 than the matrix ({} columns)",
                fragment.columns.len(),
                self.columns.len()
            )));
        }

        let width = self.columns.len();
        if fragment.cells.len() != fragment.users.len() * width {
            return Err(UtilmatError::Inconsistent(format!(
                "fragment holds {} cells for {} rows of width {}",
                fragment.cells.len(),
                fragment.users.len(),
                width
            )));
        }

        for key in fragment.users {
            let row = self.row_keys.len();
            match self.rows_by_user.get_mut(&key) {
                Some(rows) => rows.push(row),
                None => {
                    self.rows_by_user.insert(key.clone(), vec![row]);
                    self.user_order.push(key.clone());
                }
            }
            self.row_keys.push(key);
        }
        self.cells.extend(fragment.cells);

        Ok(())
    }

    pub fn columns(&self) -> &Arc<ColumnUniverse> {
        &self.columns
    }

    /// Rows appended so far, duplicates included.
    pub fn physical_rows(&self) -> usize {
        self.row_keys.len()
    }

    /// Distinct user keys appended so far.
    pub fn distinct_users(&self) -> usize {
        self.user_order.len()
    }

    /// User keys that own more than one physical row.
    pub fn duplicated_users(&self) -> usize {
        self.rows_by_user.values().filter(|rows| rows.len() > 1).count()
    }

    /// Key and cells of physical row `index`.
    pub fn physical_row(&self, index: usize) -> Option<(&str, &[Option<f64>])> {
        let key = self.row_keys.get(index)?;
        let width = self.columns.len();
        Some((key.as_str(), &self.cells[index * width..(index + 1) * width]))
    }

    /// Merge duplicated user rows and produce the final matrix.
    pub fn reconcile(
        self,
        policy: ConflictPolicy,
    ) -> Result<(UtilityMatrix, ReconcileReport), UtilmatError> {
        reconcile::reconcile(self, policy)
    }
}
