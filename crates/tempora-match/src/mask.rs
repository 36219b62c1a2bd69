//! Validity flags: excluding known-bad candidate rows from matching.

use crate::error::InputError;
use crate::table::TimeTable;

/// Where the per-row validity indicator comes from.
///
/// Either way, `true` (or a nonzero cell) marks a row **invalid**. Invalid
/// rows are removed from the matcher's view; they are never substituted by a
/// farther valid candidate unless that candidate is itself in window.
#[derive(Debug, Clone, PartialEq)]
pub enum Flag {
    /// Explicit mask aligned with the candidate rows.
    Mask(Vec<bool>),
    /// Name of a candidate column. A row is invalid when its cell is nonzero;
    /// NaN compares nonzero and therefore marks the row invalid.
    Column(String),
}

impl Flag {
    /// Resolve against a candidate table into a per-row invalid mask.
    ///
    /// Resolution always validates shape, even when the caller will go on to
    /// ignore the mask via `use_invalid`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InputError::FlagLengthMismatch`] | explicit mask length differs from the row count |
    /// | [`InputError::UnknownFlagColumn`] | named column does not exist |
    pub(crate) fn resolve(&self, candidates: &TimeTable) -> Result<Vec<bool>, InputError> {
        match self {
            Self::Mask(mask) => {
                if mask.len() != candidates.n_rows() {
                    return Err(InputError::FlagLengthMismatch {
                        expected: candidates.n_rows(),
                        got: mask.len(),
                    });
                }
                Ok(mask.clone())
            }
            Self::Column(name) => {
                let column = candidates
                    .column(name)
                    .ok_or_else(|| InputError::UnknownFlagColumn { name: name.clone() })?;
                Ok(column.iter().map(|&v| v != 0.0).collect())
            }
        }
    }
}

impl From<Vec<bool>> for Flag {
    fn from(mask: Vec<bool>) -> Self {
        Self::Mask(mask)
    }
}

impl From<&str> for Flag {
    fn from(name: &str) -> Self {
        Self::Column(name.to_owned())
    }
}

impl From<String> for Flag {
    fn from(name: String) -> Self {
        Self::Column(name)
    }
}
