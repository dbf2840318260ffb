//! Time ranges with optional ends.
//!
//! Items may be missing either end of their time range. Such ranges are kept
//! as-is and reported as invalid by [`TimeRange::is_valid`]; the layout treats
//! them as degenerate instead of failing.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// A time range whose begin and end instants may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default)]
    begin: Option<NaiveDateTime>,
    #[serde(default)]
    end: Option<NaiveDateTime>,
}

impl TimeRange {
    /// Creates a time range from optional ends.
    pub fn new(begin: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { begin, end }
    }

    /// Creates a time range with both ends present.
    pub fn bounded(begin: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            begin: Some(begin),
            end: Some(end),
        }
    }

    /// Returns the begin instant, if present.
    pub fn begin(self) -> Option<NaiveDateTime> {
        self.begin
    }

    /// Returns the end instant, if present.
    pub fn end(self) -> Option<NaiveDateTime> {
        self.end
    }

    /// Returns both ends when the range is valid.
    pub fn bounds(self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.begin, self.end) {
            (Some(begin), Some(end)) if end > begin => Some((begin, end)),
            _ => None,
        }
    }

    /// Returns true when both ends are present and the range has a positive
    /// duration.
    pub fn is_valid(self) -> bool {
        self.bounds().is_some()
    }

    /// Returns the smallest range covering both ranges.
    ///
    /// Absent ends are ignored: the union takes the minimum of the present
    /// begins and the maximum of the present ends.
    pub fn union(self, other: TimeRange) -> Self {
        Self {
            begin: min_present(self.begin, other.begin),
            end: max_present(self.end, other.end),
        }
    }

    /// Returns true when both ranges are valid and share a non-empty span.
    pub fn intersects(self, other: TimeRange) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some((begin, end)), Some((other_begin, other_end))) => {
                begin < other_end && other_begin < end
            }
            _ => false,
        }
    }
}

/// Returns the signed number of seconds from `from` to `to`.
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    to.signed_duration_since(from).num_milliseconds() as f64 / 1000.0
}

/// Returns `time` shifted by a (possibly negative) number of seconds.
///
/// Offsets are applied at millisecond precision. Returns `None` when the
/// result would leave the representable date range.
pub fn offset_by_seconds(time: NaiveDateTime, seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    time.checked_add_signed(delta)
}

fn min_present(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_present(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
