//! Error types for collocation input validation.

use crate::timestamp::Timestamp;

/// Errors from malformed collocation inputs.
///
/// Every variant describes a caller mistake detected before matching starts;
/// the engine itself has no failure modes once its inputs validate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// Returned when a timestamp sequence is empty.
    #[error("timestamp index must be non-empty")]
    EmptyIndex,

    /// Returned when naive and zone-aware timestamps are mixed within one sequence.
    #[error("mixed naive and zone-aware timestamps in one index (first mismatch at row {position})")]
    MixedTimezoneKinds {
        /// Row of the first timestamp whose kind differs from the first row's.
        position: usize,
    },

    /// Returned when a timestamp cannot be represented as nanoseconds since the
    /// Unix epoch in a signed 64-bit integer (outside roughly 1677-2262).
    #[error("timestamp {stamp} is outside the representable nanosecond range")]
    TimestampOutOfRange {
        /// The offending timestamp.
        stamp: Timestamp,
    },

    /// Returned when a match window is negative.
    #[error("match window must be non-negative, got {days} days")]
    NegativeWindow {
        /// The requested window length in days.
        days: f64,
    },

    /// Returned when a match window is non-finite or too long to be
    /// represented in nanoseconds.
    #[error("match window of {days} days cannot be represented in nanoseconds")]
    WindowOutOfRange {
        /// The requested window length in days.
        days: f64,
    },

    /// Returned when a table is built with differing numbers of column names
    /// and column vectors.
    #[error("table has {names} column names but {columns} columns")]
    ColumnCountMismatch {
        /// Number of column names supplied.
        names: usize,
        /// Number of column vectors supplied.
        columns: usize,
    },

    /// Returned when a table would contain two columns with the same name,
    /// including name collisions produced by a join.
    #[error("duplicate column name {name:?}")]
    DuplicateColumn {
        /// The colliding column name.
        name: String,
    },

    /// Returned when a column's length differs from the table's index length.
    #[error("column {name:?} has {got} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// Name of the offending column.
        name: String,
        /// Index length of the table.
        expected: usize,
        /// Actual length of the column.
        got: usize,
    },

    /// Returned when a validity flag names a column the candidate table does
    /// not have.
    #[error("validity flag names unknown column {name:?}")]
    UnknownFlagColumn {
        /// The missing column name.
        name: String,
    },

    /// Returned when an explicit validity mask does not cover every candidate row.
    #[error("validity mask has {got} entries, expected {expected}")]
    FlagLengthMismatch {
        /// Candidate row count.
        expected: usize,
        /// Mask length supplied.
        got: usize,
    },
}
