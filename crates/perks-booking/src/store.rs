//! Storage interface for the perks service.
//!
//! [`PerksStore`] covers the plain reads and writes the portals need.
//! [`BookingTx`] is the transactional slice used by the booking workflow:
//! everything between the availability check and the commit runs on one
//! `BookingTx`, and dropping it without calling [`BookingTx::commit`]
//! discards every write made through it.
//!
//! Implementations:
//! - [`MemoryStore`](crate::memory::MemoryStore) -- single-mutex store for
//!   tests and local runs.
//! - `perks_db::PgStore` -- `PostgreSQL` via `sqlx`, with an exclusion
//!   constraint guarding against double bookings.

use async_trait::async_trait;

use perks_types::{Actor, ActorId, Booking, LedgerEntry, Rental, RentalId, StayRange};

/// Errors reported by a storage backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A write collided with an existing row (for bookings: an overlapping
    /// stay committed by a concurrent request).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed (connection, query, or injected fault).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored row could not be mapped back to a domain type.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Transactional operations used by the booking workflow.
///
/// Reads observe the state at the time of the call plus nothing written
/// by other transactions until they commit.
#[async_trait]
pub trait BookingTx: Send {
    /// Load an actor and hold a lock on it until commit or drop, so two
    /// bookings by the same actor cannot both pass the balance check.
    async fn lock_actor(&mut self, id: ActorId) -> Result<Option<Actor>, StoreError>;

    /// Active (`booked`) bookings on `rental_id` whose stay overlaps `stay`
    /// under the half-open test.
    async fn overlapping_bookings(
        &mut self,
        rental_id: RentalId,
        stay: StayRange,
    ) -> Result<Vec<Booking>, StoreError>;

    /// All ledger entries of one actor.
    async fn ledger_entries(&mut self, actor_id: ActorId) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Insert a booking row.
    ///
    /// Returns [`StoreError::Conflict`] if an overlapping active booking
    /// for the same rental already exists.
    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), StoreError>;

    /// Append a ledger entry.
    async fn append_entry(&mut self, entry: &LedgerEntry) -> Result<(), StoreError>;

    /// Make all writes of this transaction visible atomically.
    async fn commit(&mut self) -> Result<(), StoreError>;
}

/// Non-transactional storage operations.
#[async_trait]
pub trait PerksStore: Send + Sync {
    /// Open a transaction for the booking workflow.
    async fn begin(&self) -> Result<Box<dyn BookingTx>, StoreError>;

    /// Resolve a session token to the actor it belongs to.
    async fn session_actor(&self, token: &str) -> Result<Option<ActorId>, StoreError>;

    /// Look up one actor.
    async fn find_actor(&self, id: ActorId) -> Result<Option<Actor>, StoreError>;

    /// All actors, ordered by display name.
    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError>;

    /// Set or clear an actor's disabled flag. Returns `false` if the actor
    /// does not exist.
    async fn set_actor_disabled(&self, id: ActorId, disabled: bool) -> Result<bool, StoreError>;

    /// Look up one rental.
    async fn find_rental(&self, id: RentalId) -> Result<Option<Rental>, StoreError>;

    /// Rentals ordered by title; inactive ones only when asked for.
    async fn list_rentals(&self, include_inactive: bool) -> Result<Vec<Rental>, StoreError>;

    /// Insert a new rental or replace an existing one with the same id.
    async fn save_rental(&self, rental: &Rental) -> Result<(), StoreError>;

    /// All ledger entries of one actor, oldest first.
    async fn ledger_entries(&self, actor_id: ActorId) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Every ledger entry (reconciliation only).
    async fn all_ledger_entries(&self) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Append a standalone ledger entry (credits and adjustments).
    async fn append_entry(&self, entry: &LedgerEntry) -> Result<(), StoreError>;

    /// Bookings made by one actor, most recent stay first.
    async fn bookings_for_actor(&self, actor_id: ActorId) -> Result<Vec<Booking>, StoreError>;

    /// Active bookings on one rental, ordered by start date.
    async fn active_bookings_for_rental(
        &self,
        rental_id: RentalId,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Every booking (reconciliation only).
    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError>;
}
