//! Half-open calendar date ranges for rental stays.
//!
//! A stay `[start, end)` occupies the nights of `start` up to but not
//! including `end`; `end` is the checkout day. Two stays that share a
//! boundary date (one checks out the morning the other checks in) do not
//! overlap.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A non-empty half-open date range `[start, end)`.
///
/// Construction goes through [`StayRange::new`], which rejects ranges
/// where `end` is not strictly after `start`, so every value has at least
/// one night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "StayBounds")]
#[ts(export, export_to = "bindings/")]
pub struct StayRange {
    /// Check-in date (first night stayed).
    start: NaiveDate,
    /// Checkout date (not a night stayed).
    end: NaiveDate,
}

impl StayRange {
    /// Build a stay, returning `None` unless `end > start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Check-in date.
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    /// Checkout date (exclusive).
    pub const fn end(self) -> NaiveDate {
        self.end
    }

    /// Number of nights in the stay. Always at least 1.
    pub fn nights(self) -> i64 {
        self.end.signed_duration_since(self.start).num_days()
    }

    /// Half-open overlap test: `self.start < other.end && self.end > other.start`.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Unvalidated wire form of a [`StayRange`].
#[derive(Deserialize)]
struct StayBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<StayBounds> for StayRange {
    type Error = String;

    fn try_from(bounds: StayBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end).ok_or_else(|| {
            format!(
                "stay end {} must be after start {}",
                bounds.end, bounds.start
            )
        })
    }
}

impl core::fmt::Display for StayRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn stay(from: (u32, u32), to: (u32, u32)) -> Option<StayRange> {
        StayRange::new(date(2024, from.0, from.1), date(2024, to.0, to.1))
    }

    #[test]
    fn zero_night_stay_rejected() {
        assert!(stay((1, 10), (1, 10)).is_none());
        assert!(stay((1, 10), (1, 9)).is_none());
    }

    #[test]
    fn nights_counts_days_between() {
        assert_eq!(stay((3, 1), (3, 11)).map(|s| s.nights()), Some(10));
        assert_eq!(stay((2, 28), (3, 1)).map(|s| s.nights()), Some(2));
    }

    #[test]
    fn back_to_back_stays_do_not_overlap() {
        let existing = stay((1, 10), (1, 15));
        let next = stay((1, 15), (1, 18));
        let before = stay((1, 5), (1, 10));
        assert!(matches!((existing, next), (Some(a), Some(b)) if !a.overlaps(b)));
        assert!(matches!((existing, before), (Some(a), Some(b)) if !a.overlaps(b)));
    }

    #[test]
    fn straddling_and_nested_stays_overlap() {
        let existing = stay((1, 10), (1, 15));
        let candidates = [
            stay((1, 14), (1, 16)),
            stay((1, 8), (1, 11)),
            stay((1, 11), (1, 12)),
            stay((1, 1), (1, 31)),
        ];
        for candidate in candidates {
            assert!(matches!((existing, candidate), (Some(a), Some(b)) if a.overlaps(b) && b.overlaps(a)));
        }
    }

    #[test]
    fn deserialize_rejects_inverted_range() {
        let ok: Result<StayRange, _> =
            serde_json::from_str(r#"{"start":"2024-01-10","end":"2024-01-15"}"#);
        let inverted: Result<StayRange, _> =
            serde_json::from_str(r#"{"start":"2024-01-15","end":"2024-01-10"}"#);
        assert_eq!(ok.ok(), stay((1, 10), (1, 15)));
        assert!(inverted.is_err());
    }

    #[test]
    fn display_shows_half_open_range() {
        assert_eq!(
            stay((1, 10), (1, 15)).map(|s| s.to_string()).as_deref(),
            Some("[2024-01-10, 2024-01-15)")
        );
    }
}
