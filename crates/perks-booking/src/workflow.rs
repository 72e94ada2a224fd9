//! The points-paid booking transaction.
//!
//! [`BookingEngine::book_rental`] moves through the stages of
//! [`BookingStage`]. Everything from the availability check to the commit
//! runs on a single [`BookingTx`](crate::store::BookingTx): either the
//! booking row and its debit are both written, or neither is.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use perks_ledger::{EntryBuilder, Pricing, balance};
use perks_types::{Booking, BookingId, BookingStatus, Rental, RentalId, StayRange};

use crate::access::{Policy, Session, resolve};
use crate::error::ServiceError;
use crate::request::{BookingReceipt, BookingRequest, Quote, parse_stay};
use crate::store::PerksStore;

/// Where a booking attempt is, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    /// Identity, dates, rental, and pricing checks.
    Validating,
    /// Looking for overlapping bookings.
    CheckingAvailability,
    /// Pricing the stay.
    ComputingCost,
    /// Comparing the cost with the actor's balance.
    CheckingBalance,
    /// Writing the booking and the debit.
    Committing,
}

impl fmt::Display for BookingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::CheckingAvailability => "checking_availability",
            Self::ComputingCost => "computing_cost",
            Self::CheckingBalance => "checking_balance",
            Self::Committing => "committing",
        };
        f.write_str(name)
    }
}

/// Books rentals, prices stays, and reports availability.
#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn PerksStore>,
}

impl BookingEngine {
    /// Create an engine over `store`.
    pub fn new(store: Arc<dyn PerksStore>) -> Self {
        Self { store }
    }

    /// Book a rental for the session actor and debit its cost.
    ///
    /// # Errors
    ///
    /// Any [`ServiceError`] kind except `Forbidden`. On error nothing has
    /// been written.
    pub async fn book_rental(
        &self,
        session: Option<&Session>,
        request: &BookingRequest,
    ) -> Result<BookingReceipt, ServiceError> {
        let mut stage = BookingStage::Validating;
        let result = self.run_booking(session, request, &mut stage).await;
        match &result {
            Ok(receipt) => info!(
                booking_id = %receipt.booking_id,
                rental_id = %request.rental_id,
                points_cost = receipt.points_cost,
                balance_after = receipt.balance_after,
                "Rental booked"
            ),
            Err(err) => warn!(
                rental_id = %request.rental_id,
                stage = %stage,
                kind = ?err.kind(),
                error = %err,
                "Booking failed"
            ),
        }
        result
    }

    async fn run_booking(
        &self,
        session: Option<&Session>,
        request: &BookingRequest,
        stage: &mut BookingStage,
    ) -> Result<BookingReceipt, ServiceError> {
        let actor = resolve(self.store.as_ref(), session, &Policy::signed_in()).await?;
        let stay = parse_stay(&request.start_date, &request.end_date)?;
        let rental = self.bookable_rental(request.rental_id).await?;
        let pricing = pricing_of(&rental)?;

        let mut tx = self.store.begin().await?;

        // Re-read under the row lock: the actor may have been disabled
        // since the session check above.
        let locked = tx
            .lock_actor(actor.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("actor".to_owned()))?;
        if locked.disabled {
            return Err(ServiceError::ActorDisabled);
        }

        *stage = BookingStage::CheckingAvailability;
        let clashes = tx.overlapping_bookings(rental.id, stay).await?;
        if !clashes.is_empty() {
            debug!(rental_id = %rental.id, %stay, clashes = clashes.len(), "Dates taken");
            return Err(ServiceError::DatesUnavailable);
        }

        *stage = BookingStage::ComputingCost;
        let cost = pricing.quote(stay.nights());

        *stage = BookingStage::CheckingBalance;
        let entries = tx.ledger_entries(actor.id).await?;
        let current = balance(&entries);
        if current < cost {
            return Err(ServiceError::InsufficientBalance {
                cost,
                balance: current,
            });
        }

        *stage = BookingStage::Committing;
        let booking = Booking {
            id: BookingId::new(),
            rental_id: rental.id,
            actor_id: actor.id,
            stay,
            status: BookingStatus::Booked,
            points_cost: cost,
            created_at: Utc::now(),
        };
        let debit = EntryBuilder::booking_debit(&booking)
            .build()
            .map_err(|e| ServiceError::PersistenceFailure(e.to_string()))?;

        tx.insert_booking(&booking).await?;
        tx.append_entry(&debit).await?;
        tx.commit().await?;

        Ok(BookingReceipt {
            booking_id: booking.id,
            points_cost: cost,
            balance_after: current.saturating_add(debit.amount),
        })
    }

    /// Price a stay for the session actor without booking it.
    ///
    /// # Errors
    ///
    /// The validation errors of [`Self::book_rental`]; never
    /// `DatesUnavailable` or `InsufficientBalance` (those are reported in
    /// the quote instead).
    pub async fn quote(
        &self,
        session: Option<&Session>,
        rental_id: RentalId,
        start: &str,
        end: &str,
    ) -> Result<Quote, ServiceError> {
        let actor = resolve(self.store.as_ref(), session, &Policy::signed_in()).await?;
        let stay = parse_stay(start, end)?;
        let rental = self.bookable_rental(rental_id).await?;
        let pricing = pricing_of(&rental)?;

        let points_cost = pricing.quote(stay.nights());
        let current = balance(&self.store.ledger_entries(actor.id).await?);
        let available = !self
            .store
            .active_bookings_for_rental(rental_id)
            .await?
            .iter()
            .any(|b| b.stay.overlaps(stay));

        Ok(Quote {
            rental_id,
            stay,
            nights: stay.nights(),
            points_cost,
            balance: current,
            affordable: current >= points_cost,
            available,
        })
    }

    /// Date ranges already held by active bookings on a rental, ordered by
    /// start date.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `ActorDisabled`, `NotFound`, or
    /// `PersistenceFailure`.
    pub async fn availability(
        &self,
        session: Option<&Session>,
        rental_id: RentalId,
    ) -> Result<Vec<StayRange>, ServiceError> {
        resolve(self.store.as_ref(), session, &Policy::signed_in()).await?;
        if self.store.find_rental(rental_id).await?.is_none() {
            return Err(ServiceError::NotFound("rental".to_owned()));
        }
        Ok(self
            .store
            .active_bookings_for_rental(rental_id)
            .await?
            .into_iter()
            .map(|b| b.stay)
            .collect())
    }

    async fn bookable_rental(&self, id: RentalId) -> Result<Rental, ServiceError> {
        let rental = self
            .store
            .find_rental(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("rental".to_owned()))?;
        if !rental.active {
            return Err(ServiceError::ResourceInactive);
        }
        Ok(rental)
    }
}

fn pricing_of(rental: &Rental) -> Result<Pricing, ServiceError> {
    Pricing::from_rates(rental.nightly_points, rental.weekly_points)
        .ok_or(ServiceError::PricingNotConfigured)
}
