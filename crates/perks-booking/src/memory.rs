//! In-memory [`PerksStore`] for tests and local runs.
//!
//! All state sits behind one [`tokio::sync::Mutex`]. A [`BookingTx`] holds
//! the lock from `begin` until it is committed or dropped, so booking
//! transactions are fully serialized. Writes made through a transaction
//! are staged and only applied on commit; dropping the transaction throws
//! them away.
//!
//! Faults can be injected into the booking commit path with
//! [`MemoryStore::inject_fault`] to exercise rollback behaviour.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use perks_ledger::Ledger;
use perks_types::{Actor, ActorId, Booking, LedgerEntry, Rental, RentalId, StayRange};

use crate::store::{BookingTx, PerksStore, StoreError};

/// A point in the booking commit path where a fault can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail the booking insert.
    InsertBooking,
    /// Fail the debit append after the booking insert succeeded.
    AppendEntry,
    /// Fail the final commit after both writes were staged.
    Commit,
}

/// Everything the store holds.
#[derive(Debug, Default)]
struct MemoryState {
    actors: BTreeMap<ActorId, Actor>,
    sessions: BTreeMap<String, ActorId>,
    rentals: BTreeMap<RentalId, Rental>,
    ledger: Ledger,
    bookings: Vec<Booking>,
    fault: Option<Fault>,
}

impl MemoryState {
    /// Consume the pending fault if it matches `point`.
    fn trip(&mut self, point: Fault) -> Result<(), StoreError> {
        if self.fault == Some(point) {
            self.fault = None;
            return Err(StoreError::Backend(format!("injected fault at {point:?}")));
        }
        Ok(())
    }
}

/// Shared-state in-memory store. Cloning yields another handle to the
/// same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an actor.
    pub async fn insert_actor(&self, actor: Actor) {
        self.state.lock().await.actors.insert(actor.id, actor);
    }

    /// Register a session token for an actor.
    pub async fn insert_session(&self, token: &str, actor_id: ActorId) {
        self.state
            .lock()
            .await
            .sessions
            .insert(token.to_owned(), actor_id);
    }

    /// Arm a one-shot fault for the next booking transaction that reaches
    /// `point`.
    pub async fn inject_fault(&self, point: Fault) {
        self.state.lock().await.fault = Some(point);
    }
}

#[async_trait]
impl PerksStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn BookingTx>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryTx {
            guard,
            bookings: Vec::new(),
            entries: Vec::new(),
        }))
    }

    async fn session_actor(&self, token: &str) -> Result<Option<ActorId>, StoreError> {
        Ok(self.state.lock().await.sessions.get(token).copied())
    }

    async fn find_actor(&self, id: ActorId) -> Result<Option<Actor>, StoreError> {
        Ok(self.state.lock().await.actors.get(&id).cloned())
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError> {
        let mut actors: Vec<Actor> = self.state.lock().await.actors.values().cloned().collect();
        actors.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(actors)
    }

    async fn set_actor_disabled(&self, id: ActorId, disabled: bool) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.actors.get_mut(&id).map(|a| a.disabled = disabled).is_some())
    }

    async fn find_rental(&self, id: RentalId) -> Result<Option<Rental>, StoreError> {
        Ok(self.state.lock().await.rentals.get(&id).cloned())
    }

    async fn list_rentals(&self, include_inactive: bool) -> Result<Vec<Rental>, StoreError> {
        let mut rentals: Vec<Rental> = self
            .state
            .lock()
            .await
            .rentals
            .values()
            .filter(|r| include_inactive || r.active)
            .cloned()
            .collect();
        rentals.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rentals)
    }

    async fn save_rental(&self, rental: &Rental) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .rentals
            .insert(rental.id, rental.clone());
        Ok(())
    }

    async fn ledger_entries(&self, actor_id: ActorId) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .ledger
            .entries_for(actor_id)
            .cloned()
            .collect())
    }

    async fn all_ledger_entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self.state.lock().await.ledger.entries().to_vec())
    }

    async fn append_entry(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        self.state.lock().await.ledger.append(entry.clone());
        Ok(())
    }

    async fn bookings_for_actor(&self, actor_id: ActorId) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<Booking> = self
            .state
            .lock()
            .await
            .bookings
            .iter()
            .filter(|b| b.actor_id == actor_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.stay.start().cmp(&a.stay.start()));
        Ok(bookings)
    }

    async fn active_bookings_for_rental(
        &self,
        rental_id: RentalId,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<Booking> = self
            .state
            .lock()
            .await
            .bookings
            .iter()
            .filter(|b| b.rental_id == rental_id && b.is_active())
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.stay.start());
        Ok(bookings)
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.state.lock().await.bookings.clone())
    }
}

/// A serialized booking transaction over the in-memory state.
struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    bookings: Vec<Booking>,
    entries: Vec<LedgerEntry>,
}

impl MemoryTx {
    /// Committed plus staged active bookings on `rental_id` overlapping `stay`.
    fn overlapping(&self, rental_id: RentalId, stay: StayRange) -> Vec<Booking> {
        self.guard
            .bookings
            .iter()
            .chain(self.bookings.iter())
            .filter(|b| b.rental_id == rental_id && b.is_active() && b.stay.overlaps(stay))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BookingTx for MemoryTx {
    async fn lock_actor(&mut self, id: ActorId) -> Result<Option<Actor>, StoreError> {
        Ok(self.guard.actors.get(&id).cloned())
    }

    async fn overlapping_bookings(
        &mut self,
        rental_id: RentalId,
        stay: StayRange,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(self.overlapping(rental_id, stay))
    }

    async fn ledger_entries(&mut self, actor_id: ActorId) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .guard
            .ledger
            .entries_for(actor_id)
            .chain(self.entries.iter().filter(|e| e.actor_id == actor_id))
            .cloned()
            .collect())
    }

    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), StoreError> {
        self.guard.trip(Fault::InsertBooking)?;
        if booking.is_active() && !self.overlapping(booking.rental_id, booking.stay).is_empty() {
            return Err(StoreError::Conflict(format!(
                "rental {} already booked during {}",
                booking.rental_id, booking.stay
            )));
        }
        self.bookings.push(booking.clone());
        Ok(())
    }

    async fn append_entry(&mut self, entry: &LedgerEntry) -> Result<(), StoreError> {
        self.guard.trip(Fault::AppendEntry)?;
        self.entries.push(entry.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.guard.trip(Fault::Commit)?;
        let bookings = std::mem::take(&mut self.bookings);
        let entries = std::mem::take(&mut self.entries);
        self.guard.bookings.extend(bookings);
        for entry in entries {
            self.guard.ledger.append(entry);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use perks_ledger::EntryBuilder;
    use perks_types::{BookingId, BookingStatus, Role};

    use super::*;

    fn actor() -> Actor {
        Actor {
            id: ActorId::new(),
            display_name: "Sam Okafor".to_owned(),
            email: "sam@example.com".to_owned(),
            role: Role::Employee,
            disabled: false,
            created_at: Utc::now(),
        }
    }

    fn booking(actor_id: ActorId, rental_id: RentalId, from: u32, to: u32) -> Booking {
        let stay = NaiveDate::from_ymd_opt(2024, 1, from)
            .zip(NaiveDate::from_ymd_opt(2024, 1, to))
            .and_then(|(s, e)| StayRange::new(s, e));
        Booking {
            id: BookingId::new(),
            rental_id,
            actor_id,
            stay: stay.unwrap(),
            status: BookingStatus::Booked,
            points_cost: 100,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        let a = actor();
        store.insert_actor(a.clone()).await;
        let b = booking(a.id, RentalId::new(), 10, 12);

        {
            let tx = store.begin().await;
            assert!(tx.is_ok());
            if let Ok(mut tx) = tx {
                assert!(tx.insert_booking(&b).await.is_ok());
                assert_eq!(tx.overlapping_bookings(b.rental_id, b.stay).await.ok().map(|v| v.len()), Some(1));
            }
        }

        assert_eq!(store.all_bookings().await.ok().map(|v| v.len()), Some(0));
    }

    #[tokio::test]
    async fn commit_publishes_booking_and_debit_together() {
        let store = MemoryStore::new();
        let a = actor();
        store.insert_actor(a.clone()).await;
        let b = booking(a.id, RentalId::new(), 10, 12);
        let debit = EntryBuilder::booking_debit(&b).build();
        assert!(debit.is_ok());

        if let (Ok(mut tx), Ok(debit)) = (store.begin().await, debit) {
            assert!(tx.insert_booking(&b).await.is_ok());
            assert!(tx.append_entry(&debit).await.is_ok());
            assert!(tx.commit().await.is_ok());
        }

        assert_eq!(store.all_bookings().await.ok().map(|v| v.len()), Some(1));
        assert_eq!(store.ledger_entries(a.id).await.ok().map(|v| v.len()), Some(1));
    }

    #[tokio::test]
    async fn overlapping_insert_conflicts() {
        let store = MemoryStore::new();
        let a = actor();
        let rental = RentalId::new();

        if let Ok(mut tx) = store.begin().await {
            assert!(tx.insert_booking(&booking(a.id, rental, 10, 15)).await.is_ok());
            let clash = tx.insert_booking(&booking(a.id, rental, 14, 16)).await;
            assert!(matches!(clash, Err(StoreError::Conflict(_))));
            let back_to_back = tx.insert_booking(&booking(a.id, rental, 15, 18)).await;
            assert!(back_to_back.is_ok());
        }
    }

    #[tokio::test]
    async fn injected_fault_fires_once() {
        let store = MemoryStore::new();
        store.inject_fault(Fault::Commit).await;

        if let Ok(mut tx) = store.begin().await {
            assert!(matches!(tx.commit().await, Err(StoreError::Backend(_))));
        }
        if let Ok(mut tx) = store.begin().await {
            assert!(tx.commit().await.is_ok());
        }
    }

    #[tokio::test]
    async fn sessions_and_disable_flag() {
        let store = MemoryStore::new();
        let a = actor();
        store.insert_actor(a.clone()).await;
        store.insert_session("tok-1", a.id).await;

        assert_eq!(store.session_actor("tok-1").await.ok().flatten(), Some(a.id));
        assert_eq!(store.session_actor("nope").await.ok().flatten(), None);

        assert_eq!(store.set_actor_disabled(a.id, true).await.ok(), Some(true));
        assert_eq!(
            store.find_actor(a.id).await.ok().flatten().map(|x| x.disabled),
            Some(true)
        );
        assert_eq!(store.set_actor_disabled(ActorId::new(), true).await.ok(), Some(false));
    }
}
