//! Core entity structs: actors, rentals, ledger entries, and bookings.
//!
//! These mirror the `PostgreSQL` tables one-to-one. Point balances are
//! deliberately absent: an actor's balance is always derived from the
//! ledger, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BookingStatus, LedgerCategory, Role};
use crate::ids::{ActorId, BookingId, LedgerEntryId, RentalId};
use crate::stay::StayRange;

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// An employee or manager with a points ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Actor {
    /// Unique actor identifier.
    pub id: ActorId,
    /// Name shown in both portals.
    pub display_name: String,
    /// Contact email.
    pub email: String,
    /// Portal the actor signs in to.
    pub role: Role,
    /// Set by a manager to revoke access without deleting the record.
    pub disabled: bool,
    /// When the actor was onboarded.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Rental
// ---------------------------------------------------------------------------

/// A vacation rental that can be booked with points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Rental {
    /// Unique rental identifier.
    pub id: RentalId,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Free-text location (town, region).
    pub location: String,
    /// Reference to the listing image, if one was uploaded.
    pub image_ref: Option<String>,
    /// Price per night in points. `None` or non-positive means the rental
    /// cannot be booked yet.
    pub nightly_points: Option<i64>,
    /// Optional cheaper price per full week. `None` or `0` means no bundle.
    pub weekly_points: Option<i64>,
    /// Inactive rentals are hidden from employees and cannot be booked.
    pub active: bool,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ledger entry
// ---------------------------------------------------------------------------

/// One signed, append-only points transaction.
///
/// Positive amounts credit the actor, negative amounts debit them. The
/// actor's balance is the sum of all their entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// Owner of the points.
    pub actor_id: ActorId,
    /// Signed point amount.
    pub amount: i64,
    /// Earn, spend, or adjust.
    pub category: LedgerCategory,
    /// Human-readable reason shown in the points history.
    pub reason: String,
    /// Booking paid for by this entry (spend entries only).
    pub booking_id: Option<BookingId>,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// A reservation of a rental for a half-open date range, paid in points.
///
/// Every booking is written together with exactly one `Spend` ledger entry
/// whose `booking_id` points back at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// The rental being booked.
    pub rental_id: RentalId,
    /// The actor who booked and paid.
    pub actor_id: ActorId,
    /// Nights reserved, `[start, end)`.
    pub stay: StayRange,
    /// Booked or cancelled.
    pub status: BookingStatus,
    /// Points charged at booking time. Not recomputed if rates change.
    pub points_cost: i64,
    /// When the booking was committed.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking currently blocks its dates.
    pub const fn is_active(&self) -> bool {
        self.status.holds_dates()
    }
}
