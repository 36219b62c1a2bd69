//! Match tolerance window.

use chrono::TimeDelta;

use crate::error::InputError;

pub(crate) const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

/// Maximum tolerated distance between a reference timestamp and its matched
/// candidate, stored as non-negative integer nanoseconds.
///
/// The bound is closed on both sides: a candidate exactly `window` away
/// still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window(i64);

impl Window {
    /// Build a window from a duration.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InputError::NegativeWindow`] | `duration` is negative |
    /// | [`InputError::WindowOutOfRange`] | `duration` exceeds the i64 nanosecond range |
    pub fn from_duration(duration: TimeDelta) -> Result<Self, InputError> {
        let days = duration.num_seconds() as f64 / 86_400.0;
        let nanos = duration
            .num_nanoseconds()
            .ok_or(InputError::WindowOutOfRange { days })?;
        if nanos < 0 {
            return Err(InputError::NegativeWindow { days });
        }
        Ok(Self(nanos))
    }

    /// Build a window from fractional days, rounded to whole nanoseconds.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InputError::NegativeWindow`] | `days` is negative |
    /// | [`InputError::WindowOutOfRange`] | `days` is non-finite or exceeds the i64 nanosecond range |
    pub fn from_days(days: f64) -> Result<Self, InputError> {
        if days < 0.0 {
            return Err(InputError::NegativeWindow { days });
        }
        let nanos = days * NANOS_PER_DAY as f64;
        if !nanos.is_finite() || nanos > i64::MAX as f64 {
            return Err(InputError::WindowOutOfRange { days });
        }
        Ok(Self(nanos.round() as i64))
    }

    /// Return the window length in nanoseconds.
    #[must_use]
    pub fn nanos(self) -> i64 {
        self.0
    }

    /// Return the window as a duration.
    #[must_use]
    pub fn as_duration(self) -> TimeDelta {
        TimeDelta::nanoseconds(self.0)
    }

    /// Whether a signed distance falls inside the closed bound.
    pub(crate) fn contains(self, distance_ns: i128) -> bool {
        distance_ns.unsigned_abs() <= self.0 as u128
    }
}

impl TryFrom<TimeDelta> for Window {
    type Error = InputError;

    fn try_from(duration: TimeDelta) -> Result<Self, Self::Error> {
        Self::from_duration(duration)
    }
}
