//! Time-indexed tables of named numeric columns.

use crate::error::InputError;
use crate::timestamp::{AsTimeIndex, TimeIndex};

/// A table keyed by a [`TimeIndex`]: one timestamp per row, named `f64`
/// columns stored column-major. NaN cells are ordinary payload; the engine
/// never interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTable {
    index: TimeIndex,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl TimeTable {
    /// Build a table from an index, column names, and column vectors.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InputError::ColumnCountMismatch`] | `names.len() != columns.len()` |
    /// | [`InputError::DuplicateColumn`] | two names are equal |
    /// | [`InputError::ColumnLengthMismatch`] | a column's length differs from the index length |
    pub fn new(
        index: TimeIndex,
        names: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, InputError> {
        if names.len() != columns.len() {
            return Err(InputError::ColumnCountMismatch {
                names: names.len(),
                columns: columns.len(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(InputError::DuplicateColumn { name: name.clone() });
            }
        }
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != index.len() {
                return Err(InputError::ColumnLengthMismatch {
                    name: name.clone(),
                    expected: index.len(),
                    got: column.len(),
                });
            }
        }
        Ok(Self { index, names, columns })
    }

    /// Build a single-column table, the labeled-series case.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ColumnLengthMismatch`] when `values` and the
    /// index disagree in length.
    pub fn series(
        name: impl Into<String>,
        index: TimeIndex,
        values: Vec<f64>,
    ) -> Result<Self, InputError> {
        Self::new(index, vec![name.into()], vec![values])
    }

    /// Return the time index.
    #[must_use]
    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Return the column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Borrow a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.column_position(name).map(|c| self.columns[c].as_slice())
    }

    /// Borrow all columns in name order.
    #[must_use]
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub(crate) fn column_position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl AsTimeIndex for TimeTable {
    fn as_time_index(&self) -> &TimeIndex {
        &self.index
    }
}
