//! Nearest-neighbor search over a prepared candidate axis.
//!
//! One primitive serves both the modern engine and the legacy compatibility
//! surface. The candidate axis is sorted once; each reference timestamp then
//! costs a single binary search plus a predecessor/successor comparison.

use crate::duplicates::{DuplicateHandling, collapse_duplicates, mark_duplicates};
use crate::window::Window;

/// Eligible candidate timestamps prepared for matching: sorted by
/// `(nanos, original position)`, with validity filtering and duplicate
/// resolution already applied.
#[derive(Debug)]
pub(crate) struct CandidateAxis {
    nanos: Vec<i64>,
    positions: Vec<usize>,
    ambiguous: Vec<bool>,
}

impl CandidateAxis {
    /// Build the axis from candidate nanoseconds in original row order.
    ///
    /// `invalid`, when present, removes rows before anything else; duplicate
    /// treatment then applies to what remains.
    pub(crate) fn build(
        nanos_by_row: &[i64],
        invalid: Option<&[bool]>,
        duplicates: DuplicateHandling,
    ) -> Self {
        let mut slots: Vec<(i64, usize)> = nanos_by_row
            .iter()
            .enumerate()
            .filter(|&(row, _)| invalid.is_none_or(|mask| !mask[row]))
            .map(|(row, &nanos)| (nanos, row))
            .collect();
        slots.sort_unstable();

        let mut nanos: Vec<i64> = slots.iter().map(|&(n, _)| n).collect();
        let mut positions: Vec<usize> = slots.iter().map(|&(_, p)| p).collect();
        let ambiguous = match duplicates {
            DuplicateHandling::Flag => mark_duplicates(&nanos),
            DuplicateHandling::Collapse => {
                collapse_duplicates(&mut nanos, &mut positions);
                vec![false; nanos.len()]
            }
            DuplicateHandling::Keep => vec![false; nanos.len()],
        };
        Self { nanos, positions, ambiguous }
    }

    pub(crate) fn len(&self) -> usize {
        self.nanos.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nanos.is_empty()
    }

    /// Count of slots marked ambiguous, for diagnostics.
    pub(crate) fn n_ambiguous(&self) -> usize {
        self.ambiguous.iter().filter(|&&a| a).count()
    }
}

/// A successful match for one reference timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawMatch {
    /// Original candidate row.
    pub(crate) position: usize,
    /// Signed distance `candidate - reference` in nanoseconds. Wide enough
    /// that unbounded searches across the whole representable range cannot
    /// overflow.
    pub(crate) distance_ns: i128,
}

/// Match every reference timestamp against the axis.
///
/// Selection picks the nearest slot (ties go to the predecessor, the earlier
/// candidate); the window test and ambiguity exclusion then run on the
/// selected slot only. A farther candidate is never substituted for a
/// rejected winner. `window = None` accepts any distance.
pub(crate) fn nearest_matches(
    reference: &[i64],
    axis: &CandidateAxis,
    window: Option<Window>,
) -> Vec<Option<RawMatch>> {
    if axis.is_empty() {
        return vec![None; reference.len()];
    }
    reference
        .iter()
        .map(|&r| {
            let i = axis.nanos.partition_point(|&c| c < r);
            let slot = match (i.checked_sub(1), (i < axis.len()).then_some(i)) {
                (Some(pred), Some(succ)) => {
                    let d_pred = i128::from(r) - i128::from(axis.nanos[pred]);
                    let d_succ = i128::from(axis.nanos[succ]) - i128::from(r);
                    if d_pred <= d_succ { pred } else { succ }
                }
                (Some(pred), None) => pred,
                (None, Some(succ)) => succ,
                (None, None) => unreachable!("axis checked non-empty above"),
            };
            let distance_ns = i128::from(axis.nanos[slot]) - i128::from(r);
            if let Some(w) = window
                && !w.contains(distance_ns)
            {
                return None;
            }
            if axis.ambiguous[slot] {
                return None;
            }
            Some(RawMatch { position: axis.positions[slot], distance_ns })
        })
        .collect()
}
