//! Collocation output aligned to the normalized reference axis.

use chrono::TimeDelta;

use crate::config::CollocationConfig;
use crate::matcher::RawMatch;
use crate::table::TimeTable;
use crate::timestamp::{NormalizedReference, Timestamp};

/// Result of a collocation call.
///
/// Rows follow the sorted, deduplicated reference axis (minus unmatched rows
/// when `dropna` was set). Payload cells hold the matched candidate's value
/// or NaN; match provenance is tracked separately, so an unmatched row is
/// distinguishable from a matched row whose payload happens to be NaN.
#[derive(Debug, Clone)]
pub struct Collocated {
    index: Vec<Timestamp>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    matched: Vec<bool>,
    index_other: Option<Vec<Option<Timestamp>>>,
    distance_other: Option<Vec<Option<TimeDelta>>>,
}

impl Collocated {
    pub(crate) fn assemble(
        reference: NormalizedReference,
        candidates: &TimeTable,
        matches: &[Option<RawMatch>],
        config: &CollocationConfig,
    ) -> Self {
        let rows: Vec<usize> = if config.dropna() {
            (0..matches.len()).filter(|&i| matches[i].is_some()).collect()
        } else {
            (0..matches.len()).collect()
        };

        let index: Vec<Timestamp> = rows.iter().map(|&i| reference.stamps[i]).collect();
        let matched: Vec<bool> = rows.iter().map(|&i| matches[i].is_some()).collect();
        let columns: Vec<Vec<f64>> = candidates
            .columns()
            .iter()
            .map(|column| {
                rows.iter()
                    .map(|&i| matches[i].map_or(f64::NAN, |m| column[m.position]))
                    .collect()
            })
            .collect();

        let index_other = config.return_index().then(|| {
            rows.iter()
                .map(|&i| matches[i].map(|m| candidates.index().stamps()[m.position]))
                .collect()
        });
        let distance_other = config.return_distance().then(|| {
            rows.iter()
                .map(|&i| {
                    // In-window distances fit i64: the window itself is stored
                    // as i64 nanoseconds.
                    matches[i].map(|m| TimeDelta::nanoseconds(m.distance_ns as i64))
                })
                .collect()
        });

        Self {
            index,
            names: candidates.names().to_vec(),
            columns,
            matched,
            index_other,
            distance_other,
        }
    }

    /// Return the output timestamps, sorted ascending.
    #[must_use]
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    /// Return the column names, mirroring the candidate table.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Return all payload columns in name order.
    #[must_use]
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Borrow a payload column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|c| self.columns[c].as_slice())
    }

    /// Return the number of output rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Whether the row at `row` found an in-window match.
    #[must_use]
    pub fn is_matched(&self, row: usize) -> bool {
        self.matched[row]
    }

    /// Return the per-row match provenance.
    #[must_use]
    pub fn matched(&self) -> &[bool] {
        &self.matched
    }

    /// Return the number of rows that found a match.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matched.iter().filter(|&&m| m).count()
    }

    /// Matched candidate timestamps per row, when requested via
    /// `with_return_index`.
    #[must_use]
    pub fn index_other(&self) -> Option<&[Option<Timestamp>]> {
        self.index_other.as_deref()
    }

    /// Signed match distances (`candidate - reference`) per row, when
    /// requested via `with_return_distance`.
    #[must_use]
    pub fn distance_other(&self) -> Option<&[Option<TimeDelta>]> {
        self.distance_other.as_deref()
    }
}
