// crates/utilmat-core/src/matrix.rs
//
// Column universe and the final, reconciled utility matrix.
//
// Every row in the workspace is a fixed-width slice of `Option<f64>` aligned
// to one `ColumnUniverse`. Nothing reindexes rows implicitly: producers are
// handed the universe and write cells at the universe's column indices.

use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::UtilmatError;

/// The immutable, ordered set of item-name columns for one matrix build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnUniverse {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColumnUniverse {
    /// Build a universe from names in order, keeping the first occurrence
    /// of each distinct name.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut universe = Self::default();
        for name in names {
            let name = name.as_ref();
            if !universe.index.contains_key(name) {
                universe.index.insert(name.to_string(), universe.names.len());
                universe.names.push(name.to_string());
            }
        }
        universe
    }

    /// Column index of an item name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Item name at a column index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// User-by-item rating table with exactly one row per user key.
///
/// Rows are stored in a flat arena of `width() * len()` cells; `None` is a
/// missing rating. The matrix is immutable once built.
#[derive(Debug, Clone)]
pub struct UtilityMatrix {
    columns: Arc<ColumnUniverse>,
    users: Vec<String>,
    user_index: HashMap<String, usize>,
    cells: Vec<Option<f64>>,
}

impl UtilityMatrix {
    /// Assemble a matrix from its parts.
    ///
    /// Fails with `Inconsistent` if the cell arena does not match
    /// `users.len() * columns.len()` or a user key repeats.
    pub fn from_parts(
        columns: Arc<ColumnUniverse>,
        users: Vec<String>,
        cells: Vec<Option<f64>>,
    ) -> Result<Self, UtilmatError> {
        let width = columns.len();
        if cells.len() != users.len() * width {
            return Err(UtilmatError::Inconsistent(format!(
                "{} cells cannot form {} rows of width {}",
                cells.len(),
                users.len(),
                width
            )));
        }

        let mut user_index = HashMap::with_capacity(users.len());
        for (row, user) in users.iter().enumerate() {
            if user_index.insert(user.clone(), row).is_some() {
                return Err(UtilmatError::Inconsistent(format!(
                    "row key {} appears more than once",
                    user
                )));
            }
        }

        Ok(Self {
            columns,
            users,
            user_index,
            cells,
        })
    }

    /// The column universe this matrix is aligned to.
    pub fn columns(&self) -> &ColumnUniverse {
        &self.columns
    }

    /// Row keys (`User_<id>`) in row order.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Cells of the row for `user`, in column order.
    pub fn row(&self, user: &str) -> Option<&[Option<f64>]> {
        self.user_index.get(user).map(|&row| self.row_at(row))
    }

    /// Rating of `user` for the item named `column`.
    ///
    /// Returns `None` if the user or column is unknown, or the cell is missing.
    pub fn get(&self, user: &str, column: &str) -> Option<f64> {
        let col = self.columns.index_of(column)?;
        self.row(user).and_then(|cells| cells[col])
    }

    /// Iterate `(row key, cells)` in row order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.users
            .iter()
            .enumerate()
            .map(move |(row, user)| (user.as_str(), self.row_at(row)))
    }

    /// Number of non-missing cells.
    pub fn rated_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Fraction of cells holding a rating; 0.0 for an empty matrix.
    pub fn density(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.rated_cells() as f64 / self.cells.len() as f64
    }

    /// Equality up to row order: same columns in the same order and the same
    /// cells for every user key.
    pub fn equivalent_to(&self, other: &UtilityMatrix) -> bool {
        if self.columns.names() != other.columns.names() || self.len() != other.len() {
            return false;
        }
        self.rows()
            .all(|(user, cells)| other.row(user).map_or(false, |theirs| theirs == cells))
    }

    fn row_at(&self, row: usize) -> &[Option<f64>] {
        let width = self.width();
        &self.cells[row * width..(row + 1) * width]
    }
}

#[derive(Serialize)]
struct RowView<'a> {
    user: &'a str,
    ratings: &'a [Option<f64>],
}

impl Serialize for UtilityMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowView<'_>> = self
            .rows()
            .map(|(user, ratings)| RowView { user, ratings })
            .collect();
        let mut state = serializer.serialize_struct("UtilityMatrix", 2)?;
        state.serialize_field("columns", self.columns.names())?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Arc<ColumnUniverse> {
        Arc::new(ColumnUniverse::from_names(["Alpha", "Beta"]))
    }

    #[test]
    fn universe_keeps_first_occurrence_order() {
        let u = ColumnUniverse::from_names(["Gamma", "Alpha", "Gamma", "Beta"]);
        assert_eq!(u.names(), &["Gamma", "Alpha", "Beta"]);
        assert_eq!(u.index_of("Alpha"), Some(1));
        assert_eq!(u.index_of("Delta"), None);
        assert_eq!(u.name(2), Some("Beta"));
    }

    #[test]
    fn from_parts_rejects_wrong_arena_size() {
        let result = UtilityMatrix::from_parts(universe(), vec!["User_1".into()], vec![None]);
        assert!(matches!(result, Err(UtilmatError::Inconsistent(_))));
    }

    #[test]
    fn from_parts_rejects_repeated_keys() {
        let result = UtilityMatrix::from_parts(
            universe(),
            vec!["User_1".into(), "User_1".into()],
            vec![None; 4],
        );
        assert!(matches!(result, Err(UtilmatError::Inconsistent(_))));
    }

    #[test]
    fn accessors_read_cells_by_name() {
        let m = UtilityMatrix::from_parts(
            universe(),
            vec!["User_1".into(), "User_2".into()],
            vec![Some(5.0), None, None, Some(3.0)],
        )
        .expect("valid parts");

        assert_eq!(m.len(), 2);
        assert_eq!(m.width(), 2);
        assert_eq!(m.get("User_1", "Alpha"), Some(5.0));
        assert_eq!(m.get("User_1", "Beta"), None);
        assert_eq!(m.get("User_2", "Beta"), Some(3.0));
        assert_eq!(m.get("User_3", "Beta"), None);
        assert_eq!(m.rated_cells(), 2);
        assert!((m.density() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn equivalence_ignores_row_order() {
        let a = UtilityMatrix::from_parts(
            universe(),
            vec!["User_1".into(), "User_2".into()],
            vec![Some(5.0), None, None, Some(3.0)],
        )
        .expect("valid parts");
        let b = UtilityMatrix::from_parts(
            universe(),
            vec!["User_2".into(), "User_1".into()],
            vec![None, Some(3.0), Some(5.0), None],
        )
        .expect("valid parts");
        assert!(a.equivalent_to(&b));

        let c = UtilityMatrix::from_parts(
            universe(),
            vec!["User_2".into(), "User_1".into()],
            vec![None, Some(4.0), Some(5.0), None],
        )
        .expect("valid parts");
        assert!(!a.equivalent_to(&c));
    }

    #[test]
    fn serializes_columns_and_rows() {
        let m = UtilityMatrix::from_parts(
            universe(),
            vec!["User_1".into()],
            vec![Some(5.0), None],
        )
        .expect("valid parts");
        let json = serde_json::to_value(&m).expect("serializes");
        assert_eq!(json["columns"], serde_json::json!(["Alpha", "Beta"]));
        assert_eq!(json["rows"][0]["user"], "User_1");
        assert_eq!(json["rows"][0]["ratings"], serde_json::json!([5.0, null]));
    }
}
