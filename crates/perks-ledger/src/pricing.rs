//! The stay-cost calculator.
//!
//! Rentals are priced per night with an optional cheaper per-week bundle.
//! A stay is split into full weeks plus leftover nights; the bundle price
//! applies to each full week and the nightly price to the rest. The result
//! is capped at the all-nightly price, so a badly configured weekly rate
//! can never make a stay more expensive than paying night by night.

use serde::Serialize;

/// Nights in one weekly bundle.
const NIGHTS_PER_WEEK: i64 = 7;

/// Point cost of a stay of `nights` nights.
///
/// - `nights <= 0` costs 0. This is a pure helper, not a validator; callers
///   reject empty stays before charging.
/// - `weekly <= 0` means no bundle: `nights * nightly`.
/// - Otherwise `min(weeks * weekly + rem * nightly, nights * nightly)` with
///   `weeks = nights / 7` and `rem = nights % 7`.
///
/// All arithmetic saturates at `i64::MAX`.
pub fn stay_cost(nights: i64, nightly: i64, weekly: i64) -> i64 {
    if nights <= 0 {
        return 0;
    }

    let all_nightly = nights.saturating_mul(nightly);
    if weekly <= 0 {
        return all_nightly;
    }

    // nights > 0 and NIGHTS_PER_WEEK > 0, so neither call can fail.
    let weeks = nights.checked_div(NIGHTS_PER_WEEK).unwrap_or(0);
    let rem = nights.checked_rem(NIGHTS_PER_WEEK).unwrap_or(nights);

    let bundled = weeks
        .saturating_mul(weekly)
        .saturating_add(rem.saturating_mul(nightly));

    bundled.min(all_nightly)
}

/// Validated rates for a bookable rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pricing {
    nightly: i64,
    weekly: i64,
}

impl Pricing {
    /// Build pricing from a rental's stored rates.
    ///
    /// Returns `None` when the nightly rate is missing or not positive.
    /// A missing or negative weekly rate is treated as "no bundle".
    pub fn from_rates(nightly: Option<i64>, weekly: Option<i64>) -> Option<Self> {
        let nightly = nightly.filter(|n| *n > 0)?;
        let weekly = weekly.filter(|w| *w > 0).unwrap_or(0);
        Some(Self { nightly, weekly })
    }

    /// Points per night.
    pub const fn nightly(&self) -> i64 {
        self.nightly
    }

    /// Points per full week, or 0 when no bundle is offered.
    pub const fn weekly(&self) -> i64 {
        self.weekly
    }

    /// Cost of `nights` nights at these rates.
    pub fn quote(&self, nights: i64) -> i64 {
        stay_cost(nights, self.nightly, self.weekly)
    }
}
