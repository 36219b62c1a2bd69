//! Timestamps, timezone handling, and the normalized time axis.
//!
//! Inputs arrive either naive (wall-clock readings with no zone) or zone-aware
//! (fixed UTC offset). The engine never compares these representations
//! directly: each collocation call resolves a [`TimeBasis`] from the two
//! sides' kinds and converts every timestamp to integer nanoseconds since the
//! Unix epoch in that basis.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::error::InputError;

/// One point on the time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    /// Wall-clock reading with no timezone attached.
    Naive(NaiveDateTime),
    /// Instant with a fixed UTC offset.
    Zoned(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Return the timezone treatment of this timestamp.
    #[must_use]
    pub fn kind(&self) -> TzKind {
        match self {
            Self::Naive(_) => TzKind::Naive,
            Self::Zoned(_) => TzKind::Zoned,
        }
    }

    /// Nanoseconds since the Unix epoch under `basis`.
    ///
    /// A zoned timestamp under [`TimeBasis::WallClock`] contributes its local
    /// wall-clock reading; under [`TimeBasis::Utc`] it contributes the
    /// absolute instant. Naive timestamps read the same under either basis.
    pub(crate) fn nanos_in(&self, basis: TimeBasis) -> Result<i64, InputError> {
        let wall = match (self, basis) {
            (Self::Naive(dt), _) => *dt,
            (Self::Zoned(dt), TimeBasis::WallClock) => dt.naive_local(),
            (Self::Zoned(dt), TimeBasis::Utc) => dt.naive_utc(),
        };
        wall.and_utc()
            .timestamp_nanos_opt()
            .ok_or(InputError::TimestampOutOfRange { stamp: *self })
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Zoned(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Zoned(dt.fixed_offset())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// Timezone treatment of a timestamp or a whole index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TzKind {
    /// No timezone information.
    Naive,
    /// Fixed UTC offset attached.
    Zoned,
}

/// Comparison basis resolved for one collocation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBasis {
    /// Compare local wall-clock readings, discarding offsets.
    WallClock,
    /// Compare absolute instants.
    Utc,
}

/// Resolve the comparison basis from the two sides' timezone kinds.
///
/// The function is total; mixed calls are not an error. The full decision
/// table:
///
/// | reference | candidates | basis       |
/// |-----------|------------|-------------|
/// | Naive     | Naive      | `WallClock` |
/// | Naive     | Zoned      | `WallClock` |
/// | Zoned     | Naive      | `WallClock` |
/// | Zoned     | Zoned      | `Utc`       |
///
/// Under `WallClock` a zoned side contributes its local reading, so a naive
/// axis collocates against whatever clock the zoned data was recorded in.
/// Two zoned sides compare as instants: identical instants expressed in
/// different offsets collocate exactly.
#[must_use]
pub fn resolve_time_basis(reference: TzKind, candidates: TzKind) -> TimeBasis {
    match (reference, candidates) {
        (TzKind::Zoned, TzKind::Zoned) => TimeBasis::Utc,
        _ => TimeBasis::WallClock,
    }
}

/// A non-empty, timezone-homogeneous sequence of timestamps.
///
/// Order is arbitrary at construction; the engine sorts its own views. The
/// two invariants this type carries are non-emptiness and a single [`TzKind`]
/// across all entries.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeIndex {
    stamps: Vec<Timestamp>,
    kind: TzKind,
}

impl TimeIndex {
    /// Build an index from timestamps.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InputError::EmptyIndex`] | `stamps` is empty |
    /// | [`InputError::MixedTimezoneKinds`] | naive and zoned entries are mixed |
    pub fn new(stamps: Vec<Timestamp>) -> Result<Self, InputError> {
        let Some(first) = stamps.first() else {
            return Err(InputError::EmptyIndex);
        };
        let kind = first.kind();
        if let Some(position) = stamps.iter().position(|s| s.kind() != kind) {
            return Err(InputError::MixedTimezoneKinds { position });
        }
        Ok(Self { stamps, kind })
    }

    /// Build a naive index.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyIndex`] when `stamps` is empty.
    pub fn from_naive(stamps: Vec<NaiveDateTime>) -> Result<Self, InputError> {
        Self::new(stamps.into_iter().map(Timestamp::Naive).collect())
    }

    /// Build a zone-aware index from fixed-offset datetimes.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyIndex`] when `stamps` is empty.
    pub fn from_zoned(stamps: Vec<DateTime<FixedOffset>>) -> Result<Self, InputError> {
        Self::new(stamps.into_iter().map(Timestamp::Zoned).collect())
    }

    /// Build a zone-aware index from UTC datetimes.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyIndex`] when `stamps` is empty.
    pub fn from_utc(stamps: Vec<DateTime<Utc>>) -> Result<Self, InputError> {
        Self::new(stamps.into_iter().map(Timestamp::from).collect())
    }

    /// Return the timezone treatment shared by all entries.
    #[must_use]
    pub fn kind(&self) -> TzKind {
        self.kind
    }

    /// Return the number of timestamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Always `false`; construction rejects empty indexes. Present so the
    /// type reads like other containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Return the timestamps in construction order.
    #[must_use]
    pub fn stamps(&self) -> &[Timestamp] {
        &self.stamps
    }

    /// Convert every entry to nanoseconds under `basis`, preserving order.
    pub(crate) fn nanos_in(&self, basis: TimeBasis) -> Result<Vec<i64>, InputError> {
        self.stamps.iter().map(|s| s.nanos_in(basis)).collect()
    }
}

impl TryFrom<Vec<Timestamp>> for TimeIndex {
    type Error = InputError;

    fn try_from(stamps: Vec<Timestamp>) -> Result<Self, Self::Error> {
        Self::new(stamps)
    }
}

/// Sources that can supply the reference axis of a collocation call.
pub trait AsTimeIndex {
    /// Borrow the timestamps of this source.
    fn as_time_index(&self) -> &TimeIndex;
}

impl AsTimeIndex for TimeIndex {
    fn as_time_index(&self) -> &TimeIndex {
        self
    }
}

/// Reference axis after normalization: sorted ascending, exact duplicate
/// stamps collapsed to their first occurrence, nanoseconds precomputed.
#[derive(Debug)]
pub(crate) struct NormalizedReference {
    pub(crate) stamps: Vec<Timestamp>,
    pub(crate) nanos: Vec<i64>,
    /// Original row of each kept stamp, for realigning reference payload.
    pub(crate) rows: Vec<usize>,
}

/// Normalize a reference index under `basis`.
pub(crate) fn normalize_reference(
    index: &TimeIndex,
    basis: TimeBasis,
) -> Result<NormalizedReference, InputError> {
    let nanos = index.nanos_in(basis)?;
    let mut order: Vec<usize> = (0..nanos.len()).collect();
    order.sort_by_key(|&i| (nanos[i], i));

    let mut out_stamps = Vec::with_capacity(order.len());
    let mut out_nanos: Vec<i64> = Vec::with_capacity(order.len());
    let mut out_rows = Vec::with_capacity(order.len());
    for &i in &order {
        if out_nanos.last() == Some(&nanos[i]) {
            continue;
        }
        out_nanos.push(nanos[i]);
        out_stamps.push(index.stamps()[i]);
        out_rows.push(i);
    }
    Ok(NormalizedReference { stamps: out_stamps, nanos: out_nanos, rows: out_rows })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDateTime};

    use super::{
        TimeBasis, TimeIndex, Timestamp, TzKind, normalize_reference, resolve_time_basis,
    };
    use crate::error::InputError;

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn zoned(s: &str) -> DateTime<chrono::FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn basis_table() {
        assert_eq!(
            resolve_time_basis(TzKind::Naive, TzKind::Naive),
            TimeBasis::WallClock
        );
        assert_eq!(
            resolve_time_basis(TzKind::Naive, TzKind::Zoned),
            TimeBasis::WallClock
        );
        assert_eq!(
            resolve_time_basis(TzKind::Zoned, TzKind::Naive),
            TimeBasis::WallClock
        );
        assert_eq!(
            resolve_time_basis(TzKind::Zoned, TzKind::Zoned),
            TimeBasis::Utc
        );
    }

    #[test]
    fn empty_index_rejected() {
        let result = TimeIndex::new(vec![]);
        assert!(matches!(result, Err(InputError::EmptyIndex)));
    }

    #[test]
    fn mixed_kinds_rejected() {
        let result = TimeIndex::new(vec![
            Timestamp::Naive(naive("2007-01-01 00:00:00")),
            Timestamp::Zoned(zoned("2007-01-02T00:00:00+00:00")),
        ]);
        assert!(matches!(
            result,
            Err(InputError::MixedTimezoneKinds { position: 1 })
        ));
    }

    #[test]
    fn zoned_wallclock_reads_local_clock() {
        // 03:00 at +05:00 is 22:00 UTC the day before; the wall-clock basis
        // must see 03:00.
        let ts = Timestamp::Zoned(zoned("2007-01-02T03:00:00+05:00"));
        let wall = ts.nanos_in(TimeBasis::WallClock).unwrap();
        let utc = ts.nanos_in(TimeBasis::Utc).unwrap();
        let expected_wall = Timestamp::Naive(naive("2007-01-02 03:00:00"))
            .nanos_in(TimeBasis::WallClock)
            .unwrap();
        assert_eq!(wall, expected_wall, "wall-clock basis should drop the offset");
        assert_eq!(
            wall - utc,
            5 * 3_600 * 1_000_000_000,
            "offset should separate the two bases by five hours"
        );
    }

    #[test]
    fn out_of_range_timestamp() {
        let index = TimeIndex::from_naive(vec![NaiveDateTime::MAX]).unwrap();
        let result = index.nanos_in(TimeBasis::WallClock);
        assert!(matches!(
            result,
            Err(InputError::TimestampOutOfRange { .. })
        ));
    }

    #[test]
    fn normalize_sorts_and_dedups() {
        let index = TimeIndex::from_naive(vec![
            naive("2007-01-03 00:00:00"),
            naive("2007-01-01 00:00:00"),
            naive("2007-01-03 00:00:00"),
            naive("2007-01-02 00:00:00"),
        ])
        .unwrap();
        let normalized = normalize_reference(&index, TimeBasis::WallClock).unwrap();
        assert_eq!(normalized.stamps.len(), 3, "duplicate stamp should collapse");
        assert_eq!(
            normalized.stamps,
            vec![
                Timestamp::Naive(naive("2007-01-01 00:00:00")),
                Timestamp::Naive(naive("2007-01-02 00:00:00")),
                Timestamp::Naive(naive("2007-01-03 00:00:00")),
            ]
        );
        assert!(normalized.nanos.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn equal_instants_different_offsets() {
        let a = Timestamp::Zoned(zoned("2007-01-01T12:00:00+00:00"));
        let b = Timestamp::Zoned(zoned("2007-01-01T17:00:00+05:00"));
        assert_eq!(
            a.nanos_in(TimeBasis::Utc).unwrap(),
            b.nanos_in(TimeBasis::Utc).unwrap(),
            "same instant in different offsets should agree under Utc basis"
        );
    }
}
