//! Row types and enum label mapping.
//!
//! Postgres enum columns are selected as `::TEXT` and parsed back here;
//! writes bind the label and cast it (`$n::ledger_category`).

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use perks_types::{
    Actor, Booking, BookingStatus, LedgerCategory, LedgerEntry, Rental, Role, StayRange,
};

use crate::error::DbError;

/// A row from `actors`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActorRow {
    /// Actor UUID.
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Email.
    pub email: String,
    /// Role label.
    pub role: String,
    /// Disabled flag.
    pub disabled: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ActorRow> for Actor {
    type Error = DbError;

    fn try_from(row: ActorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            display_name: row.display_name,
            email: row.email,
            role: role_from_db(&row.role)?,
            disabled: row.disabled,
            created_at: row.created_at,
        })
    }
}

/// A row from `rentals`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RentalRow {
    /// Rental UUID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Location.
    pub location: String,
    /// Image reference.
    pub image_ref: Option<String>,
    /// Nightly rate.
    pub nightly_points: Option<i64>,
    /// Weekly bundle rate.
    pub weekly_points: Option<i64>,
    /// Open for booking.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<RentalRow> for Rental {
    fn from(row: RentalRow) -> Self {
        Self {
            id: row.id.into(),
            title: row.title,
            description: row.description,
            location: row.location,
            image_ref: row.image_ref,
            nightly_points: row.nightly_points,
            weekly_points: row.weekly_points,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// A row from `ledger_entries`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerRow {
    /// Entry UUID.
    pub id: Uuid,
    /// Owning actor.
    pub actor_id: Uuid,
    /// Signed amount.
    pub amount: i64,
    /// Category label.
    pub category: String,
    /// Reason.
    pub reason: String,
    /// Linked booking, for debits.
    pub booking_id: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = DbError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            actor_id: row.actor_id.into(),
            amount: row.amount,
            category: category_from_db(&row.category)?,
            reason: row.reason,
            booking_id: row.booking_id.map(Into::into),
            created_at: row.created_at,
        })
    }
}

/// A row from `bookings`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    /// Booking UUID.
    pub id: Uuid,
    /// Booked rental.
    pub rental_id: Uuid,
    /// Booking actor.
    pub actor_id: Uuid,
    /// First night.
    pub start_date: NaiveDate,
    /// Checkout day.
    pub end_date: NaiveDate,
    /// Status label.
    pub status: String,
    /// Points charged.
    pub points_cost: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DbError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let stay = StayRange::new(row.start_date, row.end_date).ok_or_else(|| {
            DbError::Corrupt(format!(
                "booking {} ends {} before it starts {}",
                row.id, row.end_date, row.start_date
            ))
        })?;
        Ok(Self {
            id: row.id.into(),
            rental_id: row.rental_id.into(),
            actor_id: row.actor_id.into(),
            stay,
            status: status_from_db(&row.status)?,
            points_cost: row.points_cost,
            created_at: row.created_at,
        })
    }
}

/// Convert every row, failing on the first bad one.
pub fn convert<R, T>(rows: Vec<R>) -> Result<Vec<T>, DbError>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// `actor_role` label for a [`Role`].
pub const fn role_to_db(role: Role) -> &'static str {
    match role {
        Role::Manager => "manager",
        Role::Employee => "employee",
    }
}

fn role_from_db(label: &str) -> Result<Role, DbError> {
    match label {
        "manager" => Ok(Role::Manager),
        "employee" => Ok(Role::Employee),
        other => Err(DbError::Corrupt(format!("unknown actor_role {other:?}"))),
    }
}

/// `ledger_category` label for a [`LedgerCategory`].
pub const fn category_to_db(category: LedgerCategory) -> &'static str {
    match category {
        LedgerCategory::Earn => "earn",
        LedgerCategory::Spend => "spend",
        LedgerCategory::Adjust => "adjust",
    }
}

fn category_from_db(label: &str) -> Result<LedgerCategory, DbError> {
    match label {
        "earn" => Ok(LedgerCategory::Earn),
        "spend" => Ok(LedgerCategory::Spend),
        "adjust" => Ok(LedgerCategory::Adjust),
        other => Err(DbError::Corrupt(format!("unknown ledger_category {other:?}"))),
    }
}

/// `booking_status` label for a [`BookingStatus`].
pub const fn status_to_db(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Booked => "booked",
        BookingStatus::Cancelled => "cancelled",
    }
}

fn status_from_db(label: &str) -> Result<BookingStatus, DbError> {
    match label {
        "booked" => Ok(BookingStatus::Booked),
        "cancelled" => Ok(BookingStatus::Cancelled),
        other => Err(DbError::Corrupt(format!("unknown booking_status {other:?}"))),
    }
}
