//! Deprecated windowed-matching surface.
//!
//! Kept for callers of the pre-0.2 interface. Distances here are fractional
//! **days** (`f64`, sign `candidate - reference`), duplicates are neither
//! flagged nor collapsed, and there is no validity masking. Both entry
//! points are thin adapters over the same search primitive the modern engine
//! uses; only selection options and output shape differ.

use std::collections::HashMap;

use tracing::instrument;

use crate::duplicates::DuplicateHandling;
use crate::error::InputError;
use crate::matcher::{CandidateAxis, nearest_matches};
use crate::table::TimeTable;
use crate::timestamp::{AsTimeIndex, TimeIndex, Timestamp, normalize_reference, resolve_time_basis};
use crate::window::{NANOS_PER_DAY, Window};

/// Which side of the search window keeps its closed border.
///
/// Only meaningful together with a window; without one the border setting is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsymWindow {
    /// Late candidates keep the closed border: accept `-w < d <= +w`.
    Leq,
    /// Early candidates keep the closed border: accept `-w <= d < +w`.
    Geq,
}

/// Options for [`windowed_match`].
///
/// # Defaults
///
/// | Parameter        | Default |
/// |------------------|---------|
/// | `window_days`    | none (unbounded nearest) |
/// | `dropna`         | false   |
/// | `dropduplicates` | false   |
/// | `asym_window`    | none    |
#[derive(Debug, Clone, Default)]
pub struct WindowedMatchConfig {
    window_days: Option<f64>,
    dropna: bool,
    dropduplicates: bool,
    asym_window: Option<AsymWindow>,
}

impl WindowedMatchConfig {
    /// Create a configuration with every option at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept matches only within `days` of the reference timestamp.
    #[must_use]
    pub fn with_window_days(mut self, days: f64) -> Self {
        self.window_days = Some(days);
        self
    }

    /// Remove unmatched rows from the output.
    #[must_use]
    pub fn with_dropna(mut self, dropna: bool) -> Self {
        self.dropna = dropna;
        self
    }

    /// Let each candidate row be claimed by at most one reference timestamp.
    /// The claim with the smallest absolute distance survives; losing rows
    /// are removed from the output.
    #[must_use]
    pub fn with_dropduplicates(mut self, dropduplicates: bool) -> Self {
        self.dropduplicates = dropduplicates;
        self
    }

    /// Make one window border exclusive, see [`AsymWindow`].
    #[must_use]
    pub fn with_asym_window(mut self, asym_window: AsymWindow) -> Self {
        self.asym_window = Some(asym_window);
        self
    }

    /// Return the window length in days, if bounded.
    #[must_use]
    pub fn window_days(&self) -> Option<f64> {
        self.window_days
    }

    /// Return whether unmatched rows are removed.
    #[must_use]
    pub fn dropna(&self) -> bool {
        self.dropna
    }

    /// Return whether duplicate claims are removed.
    #[must_use]
    pub fn dropduplicates(&self) -> bool {
        self.dropduplicates
    }

    /// Return the asymmetric border setting, if any.
    #[must_use]
    pub fn asym_window(&self) -> Option<AsymWindow> {
        self.asym_window
    }

    /// Accept or reject a signed nanosecond distance.
    fn accepts(&self, d: i128, window_ns: Option<i128>) -> bool {
        let Some(w) = window_ns else {
            return true;
        };
        match self.asym_window {
            None => -w <= d && d <= w,
            Some(AsymWindow::Leq) => -w < d && d <= w,
            Some(AsymWindow::Geq) => -w <= d && d < w,
        }
    }
}

/// Output of [`windowed_match`]: candidate payload aligned to the reference
/// axis, with distances in fractional days.
#[derive(Debug, Clone)]
pub struct WindowedMatch {
    index: Vec<Timestamp>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    distance_days: Vec<f64>,
    matched_index: Vec<Option<Timestamp>>,
    matched_rows: Vec<Option<usize>>,
}

impl WindowedMatch {
    /// Return the retained reference timestamps, sorted ascending.
    #[must_use]
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    /// Return the payload column names, mirroring the candidate table.
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

    /// Signed match distance per row in fractional days, NaN where unmatched.
    #[must_use]
    pub fn distance_days(&self) -> &[f64] {
        &self.distance_days
    }

    /// Matched candidate timestamp per row.
    #[must_use]
    pub fn matched_index(&self) -> &[Option<Timestamp>] {
        &self.matched_index
    }

    /// Matched candidate original row per output row.
    #[must_use]
    pub fn matched_rows(&self) -> &[Option<usize>] {
        &self.matched_rows
    }

    /// Return the number of output rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }
}

/// Match `other` onto the reference axis, old-style.
///
/// Differences from [`crate::temporal_collocation`]: the window is optional
/// (unbounded nearest-neighbor when absent) and may have one exclusive
/// border, duplicate candidate timestamps stay in play (the lowest original
/// row of an equal run is selected), and distances come back as fractional
/// days.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`InputError::NegativeWindow`] | `window_days` is negative |
/// | [`InputError::WindowOutOfRange`] | `window_days` is non-finite or too long |
/// | [`InputError::TimestampOutOfRange`] | a timestamp exceeds the i64 nanosecond range |
#[deprecated(
    since = "0.2.0",
    note = "use temporal_collocation; this surface predates validity flags and duplicate resolution"
)]
#[instrument(skip_all, fields(n_reference = reference.as_time_index().len(), n_other = other.n_rows()))]
pub fn windowed_match<R: AsTimeIndex>(
    reference: &R,
    other: &TimeTable,
    config: &WindowedMatchConfig,
) -> Result<WindowedMatch, InputError> {
    let window_ns = match config.window_days() {
        Some(days) => Some(i128::from(Window::from_days(days)?.nanos())),
        None => None,
    };

    let ref_index = reference.as_time_index();
    let basis = resolve_time_basis(ref_index.kind(), other.index().kind());
    let reference = normalize_reference(ref_index, basis)?;
    let other_nanos = other.index().nanos_in(basis)?;
    let axis = CandidateAxis::build(&other_nanos, None, DuplicateHandling::Keep);

    let matches: Vec<Option<_>> = nearest_matches(&reference.nanos, &axis, None)
        .into_iter()
        .map(|m| m.filter(|m| config.accepts(m.distance_ns, window_ns)))
        .collect();

    // Resolve competing claims on the same candidate row: smallest absolute
    // distance wins, earlier reference on ties.
    let mut losers = vec![false; matches.len()];
    if config.dropduplicates() {
        let mut best: HashMap<usize, (u128, usize)> = HashMap::new();
        for (row, m) in matches.iter().enumerate() {
            if let Some(m) = m {
                let abs = m.distance_ns.unsigned_abs();
                best.entry(m.position)
                    .and_modify(|b| {
                        if abs < b.0 {
                            *b = (abs, row);
                        }
                    })
                    .or_insert((abs, row));
            }
        }
        for (row, m) in matches.iter().enumerate() {
            if let Some(m) = m {
                losers[row] = best[&m.position].1 != row;
            }
        }
    }

    let retained: Vec<usize> = (0..matches.len())
        .filter(|&row| !losers[row] && !(config.dropna() && matches[row].is_none()))
        .collect();

    let index: Vec<Timestamp> = retained.iter().map(|&r| reference.stamps[r]).collect();
    let columns: Vec<Vec<f64>> = other
        .columns()
        .iter()
        .map(|column| {
            retained
                .iter()
                .map(|&r| matches[r].map_or(f64::NAN, |m| column[m.position]))
                .collect()
        })
        .collect();
    let distance_days: Vec<f64> = retained
        .iter()
        .map(|&r| {
            matches[r].map_or(f64::NAN, |m| m.distance_ns as f64 / NANOS_PER_DAY as f64)
        })
        .collect();
    let matched_index: Vec<Option<Timestamp>> = retained
        .iter()
        .map(|&r| matches[r].map(|m| other.index().stamps()[m.position]))
        .collect();
    let matched_rows: Vec<Option<usize>> = retained
        .iter()
        .map(|&r| matches[r].map(|m| m.position))
        .collect();

    Ok(WindowedMatch {
        index,
        names: other.names().to_vec(),
        columns,
        distance_days,
        matched_index,
        matched_rows,
    })
}

/// Match every table in `others` onto `reference` and join the matched
/// payload onto the reference payload, old-style.
///
/// Each candidate table is matched with `dropna` and `dropduplicates` set;
/// the joined table then drops every row containing any NaN, including NaN
/// already present in the reference payload.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`InputError::DuplicateColumn`] | a column name collides across the join |
/// | [`InputError::EmptyIndex`] | the NaN filter removes every row |
///
/// plus everything [`windowed_match`] returns.
#[deprecated(
    since = "0.2.0",
    note = "use temporal_collocation per candidate table and keep match provenance instead of NaN filtering"
)]
pub fn match_join(
    reference: &TimeTable,
    others: &[&TimeTable],
    window_days: Option<f64>,
) -> Result<TimeTable, InputError> {
    let ref_kind = reference.index().kind();
    let self_basis = resolve_time_basis(ref_kind, ref_kind);
    let canonical = normalize_reference(reference.index(), self_basis)?;
    let slot_of: HashMap<i64, usize> = canonical
        .nanos
        .iter()
        .enumerate()
        .map(|(slot, &n)| (n, slot))
        .collect();

    let mut names: Vec<String> = reference.names().to_vec();
    let mut columns: Vec<Vec<f64>> = reference
        .columns()
        .iter()
        .map(|column| canonical.rows.iter().map(|&r| column[r]).collect())
        .collect();

    let mut config = WindowedMatchConfig::new().with_dropna(true).with_dropduplicates(true);
    if let Some(days) = window_days {
        config = config.with_window_days(days);
    }
    for other in others {
        #[allow(deprecated)]
        let matched = windowed_match(reference.index(), other, &config)?;
        let mut aligned: Vec<Vec<f64>> =
            vec![vec![f64::NAN; canonical.stamps.len()]; matched.names().len()];
        for (row, stamp) in matched.index().iter().enumerate() {
            // Rows of the windowed output are a subset of the canonical axis,
            // so the lookup cannot miss unless the two bases disagree on
            // dedup; skipping then leaves the row NaN and the filter below
            // removes it.
            if let Some(&slot) = slot_of.get(&stamp.nanos_in(self_basis)?) {
                for (c, column) in matched.columns().iter().enumerate() {
                    aligned[c][slot] = column[row];
                }
            }
        }
        names.extend(matched.names().iter().cloned());
        columns.extend(aligned);
    }

    let keep: Vec<usize> = (0..canonical.stamps.len())
        .filter(|&slot| columns.iter().all(|column| !column[slot].is_nan()))
        .collect();
    let stamps: Vec<Timestamp> = keep.iter().map(|&s| canonical.stamps[s]).collect();
    let kept_columns: Vec<Vec<f64>> = columns
        .iter()
        .map(|column| keep.iter().map(|&s| column[s]).collect())
        .collect();
    TimeTable::new(TimeIndex::new(stamps)?, names, kept_columns)
}
