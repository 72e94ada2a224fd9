//! Manager operations: points awards, actor status, rental listings, and
//! ledger reconciliation.
//!
//! Every operation requires an enabled actor with the manager role.
//! Request bodies are checked with `validator` before anything is read.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use perks_ledger::{EntryBuilder, ReconciliationReport, balance, reconcile};
use perks_types::{Actor, ActorId, LedgerCategory, LedgerEntry, Rental, RentalId, Role};

use crate::access::{Policy, Session, resolve};
use crate::error::ServiceError;
use crate::store::PerksStore;

/// An actor with their derived balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSummary {
    /// The actor.
    pub actor: Actor,
    /// Sum of the actor's ledger entries.
    pub balance: i64,
}

/// A manager's credit or correction to an actor's points.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct PointsAward {
    /// `earn` for credits, `adjust` for corrections in either direction.
    pub category: LedgerCategory,
    /// Signed point amount.
    #[validate(range(min = -1_000_000, max = 1_000_000))]
    pub amount: i64,
    /// Shown in the actor's history.
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Enable or disable an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StatusChange {
    /// `true` to disable.
    pub disabled: bool,
}

/// Fields of a rental listing, for create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RentalDraft {
    /// Listing title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Listing body.
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    /// Where the rental is.
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    /// Reference to the listing image.
    #[serde(default)]
    #[validate(length(min = 1, max = 500))]
    pub image_ref: Option<String>,
    /// Points per night. A listing without one cannot be booked.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub nightly_points: Option<i64>,
    /// Points per seven-night bundle; 0 or absent disables the bundle.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub weekly_points: Option<i64>,
    /// Open for booking.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl RentalDraft {
    fn into_rental(self, id: RentalId, created_at: chrono::DateTime<Utc>) -> Rental {
        Rental {
            id,
            title: self.title.trim().to_owned(),
            description: self.description,
            location: self.location.trim().to_owned(),
            image_ref: self.image_ref,
            nightly_points: self.nightly_points,
            weekly_points: self.weekly_points,
            active: self.active,
            created_at,
        }
    }
}

/// Manager-only operations.
#[derive(Clone)]
pub struct Admin {
    store: Arc<dyn PerksStore>,
}

impl Admin {
    /// Create over `store`.
    pub fn new(store: Arc<dyn PerksStore>) -> Self {
        Self { store }
    }

    /// Every actor with their balance, ordered by display name.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `ActorDisabled`, `Forbidden`, or
    /// `PersistenceFailure`.
    pub async fn employees(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<EmployeeSummary>, ServiceError> {
        self.manager(session).await?;
        let entries = self.store.all_ledger_entries().await?;
        let actors = self.store.list_actors().await?;
        Ok(actors
            .into_iter()
            .map(|actor| {
                let balance = balance(entries.iter().filter(|e| e.actor_id == actor.id));
                EmployeeSummary { actor, balance }
            })
            .collect())
    }

    /// Credit or adjust an actor's points.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a spend category, a zero or wrongly signed
    /// amount, or a blank reason; `NotFound` for an unknown actor;
    /// `InsufficientBalance` when an adjustment would take the balance
    /// below zero; plus the access errors of [`Self::employees`].
    pub async fn award_points(
        &self,
        session: Option<&Session>,
        actor_id: ActorId,
        award: PointsAward,
    ) -> Result<LedgerEntry, ServiceError> {
        let manager = self.manager(session).await?;
        award
            .validate()
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
        let entry = EntryBuilder::award(actor_id, award.category, award.amount, award.reason)?;

        // Same row lock as a booking, so a concurrent booking and a
        // negative adjustment cannot overdraw together.
        let mut tx = self.store.begin().await?;
        if tx.lock_actor(actor_id).await?.is_none() {
            return Err(ServiceError::NotFound("actor".to_owned()));
        }
        if entry.amount < 0 {
            let current = balance(&tx.ledger_entries(actor_id).await?);
            if current.saturating_add(entry.amount) < 0 {
                return Err(ServiceError::InsufficientBalance {
                    cost: entry.amount.saturating_neg(),
                    balance: current,
                });
            }
        }
        tx.append_entry(&entry).await?;
        tx.commit().await?;

        info!(
            manager_id = %manager.id,
            actor_id = %actor_id,
            category = ?entry.category,
            amount = entry.amount,
            "Points recorded"
        );
        Ok(entry)
    }

    /// Disable or re-enable an actor. Managers cannot disable themselves.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for self-disable, `NotFound` for an unknown actor,
    /// plus the access errors of [`Self::employees`].
    pub async fn set_actor_status(
        &self,
        session: Option<&Session>,
        actor_id: ActorId,
        change: StatusChange,
    ) -> Result<Actor, ServiceError> {
        let manager = self.manager(session).await?;
        if change.disabled && manager.id == actor_id {
            return Err(ServiceError::InvalidInput(
                "managers cannot disable their own account".to_owned(),
            ));
        }
        if !self.store.set_actor_disabled(actor_id, change.disabled).await? {
            return Err(ServiceError::NotFound("actor".to_owned()));
        }
        info!(manager_id = %manager.id, actor_id = %actor_id, disabled = change.disabled, "Actor status changed");
        self.store
            .find_actor(actor_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("actor".to_owned()))
    }

    /// Every rental, active or not.
    ///
    /// # Errors
    ///
    /// The access errors of [`Self::employees`].
    pub async fn rentals(&self, session: Option<&Session>) -> Result<Vec<Rental>, ServiceError> {
        self.manager(session).await?;
        Ok(self.store.list_rentals(true).await?)
    }

    /// Create a rental listing.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the draft fails validation, plus the access errors
    /// of [`Self::employees`].
    pub async fn create_rental(
        &self,
        session: Option<&Session>,
        draft: RentalDraft,
    ) -> Result<Rental, ServiceError> {
        self.manager(session).await?;
        validate_draft(&draft)?;
        let rental = draft.into_rental(RentalId::new(), Utc::now());
        self.store.save_rental(&rental).await?;
        info!(rental_id = %rental.id, title = %rental.title, "Rental created");
        Ok(rental)
    }

    /// Replace a rental's fields, keeping its id and creation time.
    ///
    /// Existing bookings are unaffected; deactivating a rental only stops
    /// new bookings.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown rental, otherwise as
    /// [`Self::create_rental`].
    pub async fn update_rental(
        &self,
        session: Option<&Session>,
        id: RentalId,
        draft: RentalDraft,
    ) -> Result<Rental, ServiceError> {
        self.manager(session).await?;
        validate_draft(&draft)?;
        let existing = self
            .store
            .find_rental(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("rental".to_owned()))?;
        let rental = draft.into_rental(existing.id, existing.created_at);
        self.store.save_rental(&rental).await?;
        info!(rental_id = %rental.id, active = rental.active, "Rental updated");
        Ok(rental)
    }

    /// Cross-check bookings against their debits.
    ///
    /// # Errors
    ///
    /// The access errors of [`Self::employees`].
    pub async fn reconciliation(
        &self,
        session: Option<&Session>,
    ) -> Result<ReconciliationReport, ServiceError> {
        self.manager(session).await?;
        let bookings = self.store.all_bookings().await?;
        let entries = self.store.all_ledger_entries().await?;
        Ok(reconcile(&bookings, &entries))
    }

    async fn manager(&self, session: Option<&Session>) -> Result<Actor, ServiceError> {
        resolve(self.store.as_ref(), session, &Policy::role(Role::Manager)).await
    }
}

fn validate_draft(draft: &RentalDraft) -> Result<(), ServiceError> {
    draft
        .validate()
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
    if draft.title.trim().is_empty() || draft.location.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "title and location must not be blank".to_owned(),
        ));
    }
    Ok(())
}
