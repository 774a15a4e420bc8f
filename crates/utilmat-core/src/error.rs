// crates/utilmat-core/src/error.rs

use thiserror::Error;

/// Workspace-wide error type for utilmat.
///
/// Per-record anomalies (unknown item ids, duplicate ratings) are never
/// surfaced through this type; they are absorbed and counted by the
/// pipeline. Only structural misuse and I/O failures are fatal.
#[derive(Debug, Error)]
pub enum UtilmatError {
    /// The build was invoked without usable input (no events, no source,
    /// zero chunk size, empty source location).
    #[error("Usage error: {0}")]
    Usage(String),

    /// Internal-consistency failure, e.g. a fragment aligned to a different
    /// column universe than the matrix it is appended to.
    #[error("Inconsistent matrix state: {0}")]
    Inconsistent(String),

    /// Two chunks rated the same item for the same user with different
    /// values and the build was configured to reject conflicts.
    #[error("Conflicting ratings for {user} on {column:?}: {previous} (older) vs {newer} (newer)")]
    Conflict {
        user: String,
        column: String,
        previous: f64,
        newer: f64,
    },

    /// The event source could not be opened or yielded a malformed batch.
    #[error("Event source error: {0}")]
    Source(String),

    /// The item catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for UtilmatError {
    fn from(e: std::io::Error) -> Self {
        UtilmatError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for UtilmatError {
    fn from(e: serde_json::Error) -> Self {
        UtilmatError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_user_and_column() {
        let err = UtilmatError::Conflict {
            user: "User_7".to_string(),
            column: "Alpha".to_string(),
            previous: 2.0,
            newer: 4.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("User_7"));
        assert!(msg.contains("\"Alpha\""));
        assert!(msg.contains("4.5"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "ratings.csv");
        let err: UtilmatError = io.into();
        assert!(matches!(err, UtilmatError::Io(ref m) if m.contains("ratings.csv")));
    }
}
