//! Duplicate-timestamp resolution on the sorted candidate view.
//!
//! Duplicates are decided by exact equality of normalized nanoseconds; there
//! is no epsilon. What happens to a group of equal stamps depends on the
//! surface: the modern engine either flags the whole group as ambiguous or
//! collapses it to its first row, while the legacy surface keeps every row.

/// Treatment of equal-timestamp runs when building the candidate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DuplicateHandling {
    /// Keep duplicates and mark every member ambiguous; a reference whose
    /// nearest candidate is ambiguous gets no match.
    Flag,
    /// Keep only the first row (by original position) of each run.
    Collapse,
    /// Keep every row unmarked; the search lands on the first slot of a run.
    Keep,
}

/// Mark members of equal-value runs in a sorted slice.
pub(crate) fn mark_duplicates(nanos: &[i64]) -> Vec<bool> {
    let mut ambiguous = vec![false; nanos.len()];
    let mut i = 0;
    while i < nanos.len() {
        let mut j = i + 1;
        while j < nanos.len() && nanos[j] == nanos[i] {
            j += 1;
        }
        if j - i > 1 {
            for slot in &mut ambiguous[i..j] {
                *slot = true;
            }
        }
        i = j;
    }
    ambiguous
}

/// Retain the first slot of each equal-value run. `positions` is kept
/// parallel; both slices must already be sorted by `(nanos, position)`.
pub(crate) fn collapse_duplicates(nanos: &mut Vec<i64>, positions: &mut Vec<usize>) {
    let mut keep = 0;
    for i in 0..nanos.len() {
        if i == 0 || nanos[i] != nanos[keep - 1] {
            nanos[keep] = nanos[i];
            positions[keep] = positions[i];
            keep += 1;
        }
    }
    nanos.truncate(keep);
    positions.truncate(keep);
}

#[cfg(test)]
mod tests {
    use super::{collapse_duplicates, mark_duplicates};

    #[test]
    fn marks_whole_runs() {
        let nanos = [1, 2, 2, 3, 4, 4, 4, 5];
        assert_eq!(
            mark_duplicates(&nanos),
            vec![false, true, true, false, true, true, true, false]
        );
    }

    #[test]
    fn no_duplicates_no_marks() {
        assert_eq!(mark_duplicates(&[1, 2, 3]), vec![false, false, false]);
    }

    #[test]
    fn collapse_keeps_first_of_run() {
        let mut nanos = vec![1, 2, 2, 2, 3, 3];
        let mut positions = vec![0, 1, 4, 5, 2, 3];
        collapse_duplicates(&mut nanos, &mut positions);
        assert_eq!(nanos, vec![1, 2, 3]);
        assert_eq!(
            positions,
            vec![0, 1, 2],
            "survivor should be the lowest original position in each run"
        );
    }

    #[test]
    fn collapse_on_unique_input_is_noop() {
        let mut nanos = vec![10, 20, 30];
        let mut positions = vec![2, 0, 1];
        collapse_duplicates(&mut nanos, &mut positions);
        assert_eq!(nanos, vec![10, 20, 30]);
        assert_eq!(positions, vec![2, 0, 1]);
    }
}
