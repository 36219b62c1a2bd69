//! Configuration and entry points for temporal collocation.

use tracing::{debug, instrument, warn};

use crate::duplicates::DuplicateHandling;
use crate::error::InputError;
use crate::mask::Flag;
use crate::matcher::{CandidateAxis, nearest_matches};
use crate::result::Collocated;
use crate::table::TimeTable;
use crate::timestamp::{AsTimeIndex, normalize_reference, resolve_time_basis};
use crate::window::Window;

/// Configuration for temporal collocation.
///
/// Construct via [`CollocationConfig::new`], then chain `with_*` methods to
/// override defaults.
///
/// # Defaults
///
/// | Parameter        | Default |
/// |------------------|---------|
/// | `dropna`         | false   |
/// | `dropduplicates` | false   |
/// | `flag`           | none    |
/// | `use_invalid`    | false   |
/// | `return_index`   | false   |
/// | `return_distance`| false   |
/// | `checkna`        | false   |
#[derive(Debug, Clone)]
pub struct CollocationConfig {
    window: Window,
    dropna: bool,
    dropduplicates: bool,
    flag: Option<Flag>,
    use_invalid: bool,
    return_index: bool,
    return_distance: bool,
    checkna: bool,
}

impl CollocationConfig {
    /// Create a configuration with the given match window and all options at
    /// their defaults.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            dropna: false,
            dropduplicates: false,
            flag: None,
            use_invalid: false,
            return_index: false,
            return_distance: false,
            checkna: false,
        }
    }

    /// Remove unmatched rows from the output instead of filling NaN.
    /// Removal is by match provenance, not by payload value.
    #[must_use]
    pub fn with_dropna(mut self, dropna: bool) -> Self {
        self.dropna = dropna;
        self
    }

    /// Collapse duplicate candidate timestamps to their first row. When off,
    /// duplicates make their group ambiguous and ambiguous winners yield no
    /// match.
    #[must_use]
    pub fn with_dropduplicates(mut self, dropduplicates: bool) -> Self {
        self.dropduplicates = dropduplicates;
        self
    }

    /// Supply a validity flag; flagged candidate rows are excluded from
    /// matching. Accepts an explicit mask or a column name, see [`Flag`].
    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<Flag>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    /// Let flagged rows participate after all. The flag is still resolved and
    /// shape-checked.
    #[must_use]
    pub fn with_use_invalid(mut self, use_invalid: bool) -> Self {
        self.use_invalid = use_invalid;
        self
    }

    /// Record the matched candidate's original timestamp per output row.
    #[must_use]
    pub fn with_return_index(mut self, return_index: bool) -> Self {
        self.return_index = return_index;
        self
    }

    /// Record the signed match distance (`candidate - reference`) per output
    /// row.
    #[must_use]
    pub fn with_return_distance(mut self, return_distance: bool) -> Self {
        self.return_distance = return_distance;
        self
    }

    /// Warn (once per call, via `tracing`) when zero reference timestamps
    /// matched, the usual symptom of a window-unit or timezone mistake.
    #[must_use]
    pub fn with_checkna(mut self, checkna: bool) -> Self {
        self.checkna = checkna;
        self
    }

    /// Return the match window.
    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Return whether unmatched rows are removed from the output.
    #[must_use]
    pub fn dropna(&self) -> bool {
        self.dropna
    }

    /// Return whether duplicate candidate timestamps are collapsed.
    #[must_use]
    pub fn dropduplicates(&self) -> bool {
        self.dropduplicates
    }

    /// Return the validity flag, if any.
    #[must_use]
    pub fn flag(&self) -> Option<&Flag> {
        self.flag.as_ref()
    }

    /// Return whether flagged rows participate in matching.
    #[must_use]
    pub fn use_invalid(&self) -> bool {
        self.use_invalid
    }

    /// Return whether matched candidate timestamps are recorded.
    #[must_use]
    pub fn return_index(&self) -> bool {
        self.return_index
    }

    /// Return whether match distances are recorded.
    #[must_use]
    pub fn return_distance(&self) -> bool {
        self.return_distance
    }

    /// Return whether the zero-match warning is enabled.
    #[must_use]
    pub fn checkna(&self) -> bool {
        self.checkna
    }

    /// Collocate `candidates` onto the reference axis.
    ///
    /// The reference may be a bare [`crate::TimeIndex`] or a [`TimeTable`]
    /// (only its index is consulted). Pipeline order: basis resolution,
    /// nanosecond conversion, reference normalization (sort, dedup),
    /// validity filtering, duplicate resolution, nearest-neighbor matching,
    /// assembly.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InputError::TimestampOutOfRange`] | a timestamp exceeds the i64 nanosecond range |
    /// | [`InputError::UnknownFlagColumn`] | flag names a column `candidates` lacks |
    /// | [`InputError::FlagLengthMismatch`] | explicit mask length differs from the row count |
    #[instrument(
        skip_all,
        fields(
            n_reference = reference.as_time_index().len(),
            n_candidates = candidates.n_rows(),
            window_ns = self.window.nanos(),
        )
    )]
    pub fn collocate<R: AsTimeIndex>(
        &self,
        reference: &R,
        candidates: &TimeTable,
    ) -> Result<Collocated, InputError> {
        let ref_index = reference.as_time_index();
        let basis = resolve_time_basis(ref_index.kind(), candidates.index().kind());
        let reference = normalize_reference(ref_index, basis)?;
        let candidate_nanos = candidates.index().nanos_in(basis)?;

        let invalid = match &self.flag {
            Some(flag) => {
                let mask = flag.resolve(candidates)?;
                if self.use_invalid { None } else { Some(mask) }
            }
            None => None,
        };
        let duplicates = if self.dropduplicates {
            DuplicateHandling::Collapse
        } else {
            DuplicateHandling::Flag
        };
        let axis = CandidateAxis::build(&candidate_nanos, invalid.as_deref(), duplicates);
        debug!(
            ?basis,
            n_eligible = axis.len(),
            n_ambiguous = axis.n_ambiguous(),
            "candidate axis prepared"
        );

        let matches = nearest_matches(&reference.nanos, &axis, Some(self.window));
        let n_matched = matches.iter().flatten().count();
        debug!(n_matched, n_reference = matches.len(), "nearest-neighbor search done");
        if self.checkna && n_matched == 0 {
            warn!(
                window_ns = self.window.nanos(),
                "no reference timestamp found a match; check window units and timezone handling"
            );
        }

        Ok(Collocated::assemble(reference, candidates, &matches, self))
    }
}

/// Collocate `candidates` onto `reference` with default options.
///
/// Shorthand for `CollocationConfig::new(window).collocate(...)`.
///
/// # Errors
///
/// See [`CollocationConfig::collocate`].
pub fn temporal_collocation<R: AsTimeIndex>(
    reference: &R,
    candidates: &TimeTable,
    window: Window,
) -> Result<Collocated, InputError> {
    CollocationConfig::new(window).collocate(reference, candidates)
}
