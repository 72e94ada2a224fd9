//! Enumeration types shared by the ledger, the booking workflow, and the
//! portal API.
//!
//! All enums serialize as `snake_case` strings so the JSON wire format and
//! the `PostgreSQL` enum labels agree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Which back-office portal an actor signs in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Manager console: postings, employees, points, rentals.
    Manager,
    /// Employee self-service portal.
    Employee,
}

impl Role {
    /// Landing path a freshly signed-in actor is sent to.
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Manager => "/manager",
            Self::Employee => "/employee",
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger categories
// ---------------------------------------------------------------------------

/// Category tag on a points ledger entry.
///
/// | Category | Sign of `amount` |
/// |----------|------------------|
/// | `Earn` | positive |
/// | `Spend` | negative |
/// | `Adjust` | either, never zero |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LedgerCategory {
    /// Points credited for work, recognition, or bonuses.
    Earn,
    /// Points debited to pay for something (a rental booking).
    Spend,
    /// Manual correction by a manager.
    Adjust,
}

// ---------------------------------------------------------------------------
// Booking status
// ---------------------------------------------------------------------------

/// Lifecycle state of a rental booking.
///
/// Only `Booked` stays occupy their dates; `Cancelled` stays are ignored by
/// the availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BookingStatus {
    /// Confirmed and paid for.
    Booked,
    /// No longer holding its dates.
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this state blocks its date range.
    pub const fn holds_dates(self) -> bool {
        matches!(self, Self::Booked)
    }
}
