//! Inputs and outputs of the booking operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use perks_types::{BookingId, RentalId, StayRange};

use crate::error::ServiceError;

/// Wire format of stay dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A request to book a rental, as submitted by the employee portal.
///
/// Dates stay as strings until validation so malformed input surfaces as
/// [`ServiceError::InvalidInput`] from the workflow rather than as a
/// deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookingRequest {
    /// Rental to book.
    pub rental_id: RentalId,
    /// Check-in date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Checkout date, `YYYY-MM-DD`, exclusive.
    pub end_date: String,
}

/// What a successful booking returns to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingReceipt {
    /// The new booking.
    pub booking_id: BookingId,
    /// Points charged.
    pub points_cost: i64,
    /// The actor's balance after the debit.
    pub balance_after: i64,
}

/// A price check for a stay, without booking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Rental quoted.
    pub rental_id: RentalId,
    /// The stay quoted.
    pub stay: StayRange,
    /// Nights in the stay.
    pub nights: i64,
    /// Point cost of the stay.
    pub points_cost: i64,
    /// The actor's current balance.
    pub balance: i64,
    /// Whether the balance covers the cost.
    pub affordable: bool,
    /// Whether the dates are free right now.
    pub available: bool,
}

/// Parse and validate a `[start, end)` pair of `YYYY-MM-DD` dates.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidInput`] if either date is malformed or
/// `end` is not strictly after `start`.
pub fn parse_stay(start: &str, end: &str) -> Result<StayRange, ServiceError> {
    let start_date = parse_date("start", start)?;
    let end_date = parse_date("end", end)?;
    StayRange::new(start_date, end_date).ok_or_else(|| {
        ServiceError::InvalidInput(format!(
            "end date {end_date} must be after start date {start_date}"
        ))
    })
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ServiceError> {
    // chrono accepts unpadded fields and a leading sign; the wire format
    // does not.
    if !is_iso_date_shape(raw) {
        return Err(ServiceError::InvalidInput(format!(
            "{field} date {raw:?} is not YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        ServiceError::InvalidInput(format!("{field} date {raw:?} is not YYYY-MM-DD: {e}"))
    })
}

/// Exactly `dddd-dd-dd` in ASCII.
fn is_iso_date_shape(raw: &str) -> bool {
    raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_range() {
        let stay = parse_stay("2024-03-01", "2024-03-11");
        assert_eq!(stay.map(|s| s.nights()).ok(), Some(10));
    }

    #[test]
    fn rejects_malformed_dates() {
        for (start, end) in [
            ("2024-3-1x", "2024-03-11"),
            ("2024-03-01", "03/11/2024"),
            ("", "2024-03-11"),
            ("2024-02-30", "2024-03-11"),
        ] {
            assert!(matches!(
                parse_stay(start, end),
                Err(ServiceError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn rejects_loose_date_shapes() {
        for (start, end) in [
            ("2024-3-1", "2024-3-5"),
            ("2024-03-1", "2024-03-05"),
            (" 2024-03-01", "2024-03-05"),
            ("2024-03-01", "2024-03-05 "),
            ("+2024-03-01", "2024-03-05"),
            ("2024/03/01", "2024-03-05"),
            ("２０２４-03-01", "2024-03-05"),
        ] {
            assert!(
                matches!(parse_stay(start, end), Err(ServiceError::InvalidInput(_))),
                "{start:?} .. {end:?}"
            );
        }
    }

    #[test]
    fn rejects_zero_and_negative_nights() {
        assert!(matches!(
            parse_stay("2024-03-01", "2024-03-01"),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_stay("2024-03-05", "2024-03-01"),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
