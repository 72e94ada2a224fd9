//! Self-service reads for a signed-in actor.

use std::sync::Arc;

use serde::Serialize;

use perks_ledger::balance;
use perks_types::{Actor, ActorId, Booking, LedgerEntry, Rental, RentalId, Role};

use crate::access::{Policy, Session, resolve};
use crate::error::ServiceError;
use crate::store::PerksStore;

/// Who is signed in and where their portal lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// The actor's current record.
    pub actor: Actor,
    /// Landing path for the actor's role.
    pub home: &'static str,
}

/// An actor's derived balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceView {
    /// Whose balance.
    pub actor_id: ActorId,
    /// Sum of all of the actor's ledger entries.
    pub balance: i64,
}

/// Read-only operations on the caller's own account and the rental list.
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn PerksStore>,
}

impl Accounts {
    /// Create over `store`.
    pub fn new(store: Arc<dyn PerksStore>) -> Self {
        Self { store }
    }

    /// The signed-in actor and their landing path.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `NotFound`, `ActorDisabled`, or
    /// `PersistenceFailure`.
    pub async fn session_summary(
        &self,
        session: Option<&Session>,
    ) -> Result<SessionSummary, ServiceError> {
        let actor = self.caller(session).await?;
        let home = actor.role.home_path();
        Ok(SessionSummary { actor, home })
    }

    /// The caller's current balance.
    ///
    /// # Errors
    ///
    /// As [`Self::session_summary`].
    pub async fn balance(&self, session: Option<&Session>) -> Result<BalanceView, ServiceError> {
        let actor = self.caller(session).await?;
        let entries = self.store.ledger_entries(actor.id).await?;
        Ok(BalanceView {
            actor_id: actor.id,
            balance: balance(&entries),
        })
    }

    /// The caller's ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// As [`Self::session_summary`].
    pub async fn history(&self, session: Option<&Session>) -> Result<Vec<LedgerEntry>, ServiceError> {
        let actor = self.caller(session).await?;
        let mut entries = self.store.ledger_entries(actor.id).await?;
        entries.reverse();
        Ok(entries)
    }

    /// The caller's bookings, most recent stay first.
    ///
    /// # Errors
    ///
    /// As [`Self::session_summary`].
    pub async fn my_bookings(&self, session: Option<&Session>) -> Result<Vec<Booking>, ServiceError> {
        let actor = self.caller(session).await?;
        Ok(self.store.bookings_for_actor(actor.id).await?)
    }

    /// Rentals visible to the caller: active ones for employees, all of
    /// them for managers.
    ///
    /// # Errors
    ///
    /// As [`Self::session_summary`].
    pub async fn rentals(&self, session: Option<&Session>) -> Result<Vec<Rental>, ServiceError> {
        let actor = self.caller(session).await?;
        Ok(self.store.list_rentals(actor.role == Role::Manager).await?)
    }

    /// One rental. Inactive rentals are hidden from employees.
    ///
    /// # Errors
    ///
    /// `NotFound` if the rental does not exist or is hidden, otherwise as
    /// [`Self::session_summary`].
    pub async fn rental(
        &self,
        session: Option<&Session>,
        id: RentalId,
    ) -> Result<Rental, ServiceError> {
        let actor = self.caller(session).await?;
        self.store
            .find_rental(id)
            .await?
            .filter(|r| r.active || actor.role == Role::Manager)
            .ok_or_else(|| ServiceError::NotFound("rental".to_owned()))
    }

    async fn caller(&self, session: Option<&Session>) -> Result<Actor, ServiceError> {
        resolve(self.store.as_ref(), session, &Policy::signed_in()).await
    }
}
