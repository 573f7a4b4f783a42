//! Error types for storage access and route resolution.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for resolver runs.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying SQLite call failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A coded column held a value outside its known code set.
    #[error("invalid value {value:?} in column {column}")]
    InvalidCode { column: &'static str, value: String },
}

impl StoreError {
    /// Create an invalid-code error for the given column.
    pub fn invalid_code(column: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidCode {
            column,
            value: value.into(),
        }
    }
}

/// Errors that abort a resolver run.
///
/// Data problems (unresolved navaids, over-long segments) are never errors;
/// only storage failures end a run early.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Storage failure while reading candidates, looking up navaids or writing rows.
    #[error("storage failure during {stage}: {source}")]
    Store {
        stage: &'static str,
        #[source]
        source: StoreError,
    },

    /// The candidate stream came back to a route name after leaving it.
    #[error("route {name} appears again after other routes, candidates must be grouped by name")]
    UngroupedInput { name: String },
}

impl ResolveError {
    /// Wrap a storage error with the stage it occurred in.
    pub fn store(stage: &'static str, source: StoreError) -> Self {
        Self::Store { stage, source }
    }
}
