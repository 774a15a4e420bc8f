// crates/utilmat-build/src/reconcile.rs
//
// Duplicate reconciliation: one row per user key.
//
// A user touched by several chunks owns several physical rows after
// accumulation. For each column the merged cell takes the value of the most
// recently appended row that has one; older rows only fill gaps. Users with
// a single physical row pass through unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utilmat_core::{UtilityMatrix, UtilmatError};

use crate::accumulator::Accumulator;

/// How to treat two chunks rating the same item for the same user with
/// different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// The newer chunk's value is kept; the older one is lost.
    #[default]
    NewestWins,
    /// Abort the build with `UtilmatError::Conflict`.
    Reject,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::NewestWins => write!(f, "newest-wins"),
            ConflictPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = UtilmatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest-wins" | "newest_wins" | "newest" => Ok(ConflictPolicy::NewestWins),
            "reject" => Ok(ConflictPolicy::Reject),
            other => Err(UtilmatError::Usage(format!(
                "unknown conflict policy {:?} (expected \"newest-wins\" or \"reject\")",
                other
            ))),
        }
    }
}

/// Counts gathered while reconciling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// User keys that owned more than one physical row.
    pub duplicated_users: usize,
    /// Physical rows folded into another row.
    pub merged_rows: usize,
    /// Cells where an older non-missing value differed from the kept one.
    pub conflicting_cells: usize,
}

/// Collapse every user's physical rows into one row.
pub(crate) fn reconcile(
    acc: Accumulator,
    policy: ConflictPolicy,
) -> Result<(UtilityMatrix, ReconcileReport), UtilmatError> {
    let width = acc.columns.len();
    let mut report = ReconcileReport::default();
    let mut cells: Vec<Option<f64>> = Vec::with_capacity(acc.user_order.len() * width);

    for user in &acc.user_order {
        let rows = acc.rows_by_user.get(user).ok_or_else(|| {
            UtilmatError::Inconsistent(format!("user {} has no physical rows", user))
        })?;

        if let [row] = rows.as_slice() {
            let single = &acc.cells[row * width..(row + 1) * width];
            cells.extend(single.iter().map(|v| v.filter(|v| !v.is_nan())));
            continue;
        }

        report.duplicated_users += 1;
        report.merged_rows += rows.len() - 1;

        let start = cells.len();
        cells.resize(start + width, None);
        let merged = &mut cells[start..];

        // Newest first: the first non-missing value found is kept.
        for &row in rows.iter().rev() {
            let candidate = &acc.cells[row * width..(row + 1) * width];
            for (col, value) in candidate.iter().enumerate() {
                // NaN counts as missing, so it never hides or contests a value.
                let Some(value) = value.filter(|v| !v.is_nan()) else {
                    continue;
                };
                match merged[col] {
                    None => merged[col] = Some(value),
                    Some(kept) if kept != value => {
                        if policy == ConflictPolicy::Reject {
                            return Err(UtilmatError::Conflict {
                                user: user.clone(),
                                column: acc.columns.name(col).unwrap_or_default().to_string(),
                                previous: value,
                                newer: kept,
                            });
                        }
                        report.conflicting_cells += 1;
                    }
                    Some(_) => {}
                }
            }
        }
    }

    tracing::info!(
        "No. of duplicated entries: {} ({} rows merged)",
        report.duplicated_users,
        report.merged_rows
    );
    if report.conflicting_cells > 0 {
        tracing::warn!(
            "{} conflicting cross-chunk ratings resolved in favour of the newer chunk",
            report.conflicting_cells
        );
    }

    let matrix = UtilityMatrix::from_parts(acc.columns, acc.user_order, cells)?;
    Ok((matrix, report))
}
