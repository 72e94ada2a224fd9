//! Entry builders and validation for the points ledger.
//!
//! Provides an [`EntryBuilder`] that enforces the sign rules of each
//! [`LedgerCategory`] before producing a [`LedgerEntry`]. Every entry the
//! service writes, whether a manager's award or a booking debit, goes
//! through this builder.

use chrono::Utc;

use perks_types::{ActorId, Booking, BookingId, LedgerCategory, LedgerEntry, LedgerEntryId};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Entry builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// # Examples
///
/// ```
/// use perks_ledger::EntryBuilder;
/// use perks_types::{ActorId, LedgerCategory};
///
/// let entry = EntryBuilder::new(ActorId::new(), LedgerCategory::Earn)
///     .amount(250)
///     .reason("Covered a night shift".to_owned())
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct EntryBuilder {
    actor_id: ActorId,
    category: LedgerCategory,
    amount: Option<i64>,
    reason: Option<String>,
    booking_id: Option<BookingId>,
}

impl EntryBuilder {
    /// Start building an entry for the given actor and category.
    pub const fn new(actor_id: ActorId, category: LedgerCategory) -> Self {
        Self {
            actor_id,
            category,
            amount: None,
            reason: None,
            booking_id: None,
        }
    }

    /// Start building the debit that pays for `booking`.
    ///
    /// The amount is the negated `points_cost` and the entry is linked to
    /// the booking id.
    pub fn booking_debit(booking: &Booking) -> Self {
        Self::new(booking.actor_id, LedgerCategory::Spend)
            .amount(booking.points_cost.saturating_neg())
            .reason(format!("Rental booking {}", booking.stay))
            .booking_id(booking.id)
    }

    /// Build a manager credit or adjustment in one step.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidCategory`] for `Spend`, which is only ever
    /// written as a booking debit; otherwise as [`Self::build`].
    pub fn award(
        actor_id: ActorId,
        category: LedgerCategory,
        amount: i64,
        reason: String,
    ) -> Result<LedgerEntry, LedgerError> {
        if category == LedgerCategory::Spend {
            return Err(LedgerError::InvalidCategory(category));
        }
        Self::new(actor_id, category)
            .amount(amount)
            .reason(reason)
            .build()
    }

    /// Set the signed point amount.
    #[must_use]
    pub const fn amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the human-readable reason.
    #[must_use]
    pub fn reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Link the entry to the booking it pays for.
    #[must_use]
    pub const fn booking_id(mut self, id: BookingId) -> Self {
        self.booking_id = Some(id);
        self
    }

    /// Validate inputs and produce a [`LedgerEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] if amount or reason is unset,
    /// [`LedgerError::ZeroAmount`] for a zero amount,
    /// [`LedgerError::WrongSign`] if the sign contradicts the category,
    /// [`LedgerError::BlankReason`] for an empty reason, and
    /// [`LedgerError::UnlinkedSpend`] for a spend without a booking.
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        let reason = self.reason.ok_or(LedgerError::MissingField("reason"))?;

        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if reason.trim().is_empty() {
            return Err(LedgerError::BlankReason);
        }
        validate_sign(self.category, amount)?;

        if self.category == LedgerCategory::Spend && self.booking_id.is_none() {
            return Err(LedgerError::UnlinkedSpend);
        }

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            actor_id: self.actor_id,
            amount,
            category: self.category,
            reason: reason.trim().to_owned(),
            booking_id: self.booking_id,
            created_at: Utc::now(),
        })
    }
}

/// Check that a non-zero amount has the sign its category requires.
const fn validate_sign(category: LedgerCategory, amount: i64) -> Result<(), LedgerError> {
    let ok = match category {
        LedgerCategory::Earn => amount > 0,
        LedgerCategory::Spend => amount < 0,
        LedgerCategory::Adjust => true,
    };
    if ok {
        Ok(())
    } else {
        Err(LedgerError::WrongSign { category, amount })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use perks_types::{BookingStatus, RentalId, StayRange};

    use super::*;

    fn booking(points_cost: i64) -> Option<Booking> {
        let stay = StayRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1)?,
            NaiveDate::from_ymd_opt(2024, 3, 4)?,
        )?;
        Some(Booking {
            id: BookingId::new(),
            rental_id: RentalId::new(),
            actor_id: ActorId::new(),
            stay,
            status: BookingStatus::Booked,
            points_cost,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn earn_entry_builds() {
        let actor = ActorId::new();
        let entry = EntryBuilder::new(actor, LedgerCategory::Earn)
            .amount(100)
            .reason("  Referral bonus ".to_owned())
            .build();

        assert!(matches!(
            entry,
            Ok(LedgerEntry { amount: 100, actor_id, ref reason, booking_id: None, .. })
                if actor_id == actor && reason == "Referral bonus"
        ));
    }

    #[test]
    fn zero_amount_rejected() {
        let result = EntryBuilder::new(ActorId::new(), LedgerCategory::Adjust)
            .amount(0)
            .reason("noop".to_owned())
            .build();
        assert!(matches!(result, Err(LedgerError::ZeroAmount)));
    }

    #[test]
    fn sign_must_match_category() {
        let negative_earn = EntryBuilder::new(ActorId::new(), LedgerCategory::Earn)
            .amount(-5)
            .reason("bad".to_owned())
            .build();
        assert!(matches!(negative_earn, Err(LedgerError::WrongSign { .. })));

        let positive_spend = EntryBuilder::new(ActorId::new(), LedgerCategory::Spend)
            .amount(5)
            .reason("bad".to_owned())
            .booking_id(BookingId::new())
            .build();
        assert!(matches!(positive_spend, Err(LedgerError::WrongSign { .. })));
    }

    #[test]
    fn adjust_accepts_either_sign() {
        for amount in [-40, 40] {
            let result = EntryBuilder::new(ActorId::new(), LedgerCategory::Adjust)
                .amount(amount)
                .reason("correction".to_owned())
                .build();
            assert!(result.is_ok());
        }
    }

    #[test]
    fn blank_reason_rejected() {
        let result = EntryBuilder::new(ActorId::new(), LedgerCategory::Earn)
            .amount(10)
            .reason("   ".to_owned())
            .build();
        assert!(matches!(result, Err(LedgerError::BlankReason)));
    }

    #[test]
    fn missing_reason_rejected() {
        let result = EntryBuilder::new(ActorId::new(), LedgerCategory::Earn)
            .amount(10)
            .build();
        assert!(matches!(result, Err(LedgerError::MissingField("reason"))));
    }

    #[test]
    fn awards_reject_spend_and_bad_signs() {
        let spend = EntryBuilder::award(
            ActorId::new(),
            LedgerCategory::Spend,
            -10,
            "sneaky".to_owned(),
        );
        assert!(matches!(
            spend,
            Err(LedgerError::InvalidCategory(LedgerCategory::Spend))
        ));

        let negative_earn =
            EntryBuilder::award(ActorId::new(), LedgerCategory::Earn, -10, "oops".to_owned());
        assert!(matches!(negative_earn, Err(LedgerError::WrongSign { .. })));

        let adjust =
            EntryBuilder::award(ActorId::new(), LedgerCategory::Adjust, -10, "fix".to_owned());
        assert!(adjust.is_ok());
    }

    #[test]
    fn spend_requires_booking_link() {
        let result = EntryBuilder::new(ActorId::new(), LedgerCategory::Spend)
            .amount(-10)
            .reason("orphan".to_owned())
            .build();
        assert!(matches!(result, Err(LedgerError::UnlinkedSpend)));
    }

    #[test]
    fn booking_debit_negates_cost_and_links_booking() {
        let booking = booking(450).unwrap();
        let entry = EntryBuilder::booking_debit(&booking).build();

        assert!(matches!(
            entry,
            Ok(LedgerEntry { amount: -450, category: LedgerCategory::Spend, booking_id: Some(id), actor_id, .. })
                if id == booking.id && actor_id == booking.actor_id
        ));
    }
}
