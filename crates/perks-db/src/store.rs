//! [`PerksStore`] over `PostgreSQL`.
//!
//! Booking transactions lock the actor row with `SELECT ... FOR UPDATE`,
//! which serializes concurrent bookings by one actor so they cannot both
//! pass the balance check. Double booking of a rental across actors is
//! prevented by the `bookings_no_overlap` exclusion constraint; a losing
//! insert surfaces as [`StoreError::Conflict`].

use async_trait::async_trait;
use sqlx::{PgExecutor, Postgres, Transaction};

use perks_booking::{BookingTx, PerksStore, StoreError};
use perks_types::{Actor, ActorId, Booking, LedgerEntry, Rental, RentalId, StayRange};

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::rows::{
    ActorRow, BookingRow, LedgerRow, RentalRow, category_to_db, convert, role_to_db, status_to_db,
};

const ACTOR_SELECT: &str = "SELECT id, display_name, email, role::TEXT AS role, disabled, created_at FROM actors";
const RENTAL_SELECT: &str = "SELECT id, title, description, location, image_ref, nightly_points, weekly_points, active, created_at FROM rentals";
const LEDGER_SELECT: &str = "SELECT id, actor_id, amount, category::TEXT AS category, reason, booking_id, created_at FROM ledger_entries";
const BOOKING_SELECT: &str = "SELECT id, rental_id, actor_id, start_date, end_date, status::TEXT AS status, points_cost, created_at FROM bookings";

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PostgresPool,
}

impl PgStore {
    /// Wrap a connected pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    /// The wrapped pool.
    pub const fn pool(&self) -> &PostgresPool {
        &self.pool
    }

    /// Insert an actor. Used for provisioning and tests; the portals never
    /// create actors.
    ///
    /// # Errors
    ///
    /// [`DbError::Postgres`] on failure, including a duplicate email.
    pub async fn insert_actor(&self, actor: &Actor) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO actors (id, display_name, email, role, disabled, created_at)
              VALUES ($1, $2, $3, $4::actor_role, $5, $6)",
        )
        .bind(actor.id.into_inner())
        .bind(&actor.display_name)
        .bind(&actor.email)
        .bind(role_to_db(actor.role))
        .bind(actor.disabled)
        .bind(actor.created_at)
        .execute(self.pool.pool())
        .await?;
        Ok(())
    }

    /// Issue a session token for an actor.
    ///
    /// # Errors
    ///
    /// [`DbError::Postgres`] on failure.
    pub async fn insert_session(&self, token: &str, actor_id: ActorId) -> Result<(), DbError> {
        sqlx::query("INSERT INTO sessions (token, actor_id) VALUES ($1, $2)")
            .bind(token)
            .bind(actor_id.into_inner())
            .execute(self.pool.pool())
            .await?;
        Ok(())
    }
}

async fn fetch_entries<'e, E: PgExecutor<'e>>(
    executor: E,
    actor_id: ActorId,
) -> Result<Vec<LedgerEntry>, DbError> {
    let rows = sqlx::query_as::<_, LedgerRow>(&format!(
        "{LEDGER_SELECT} WHERE actor_id = $1 ORDER BY created_at, id"
    ))
    .bind(actor_id.into_inner())
    .fetch_all(executor)
    .await?;
    convert(rows)
}

async fn insert_entry<'e, E: PgExecutor<'e>>(
    executor: E,
    entry: &LedgerEntry,
) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO ledger_entries (id, actor_id, amount, category, reason, booking_id, created_at)
          VALUES ($1, $2, $3, $4::ledger_category, $5, $6, $7)",
    )
    .bind(entry.id.into_inner())
    .bind(entry.actor_id.into_inner())
    .bind(entry.amount)
    .bind(category_to_db(entry.category))
    .bind(&entry.reason)
    .bind(entry.booking_id.map(|b| b.into_inner()))
    .bind(entry.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

async fn fetch_bookings<'e, E: PgExecutor<'e>>(
    executor: E,
    clause: &str,
    id: uuid::Uuid,
) -> Result<Vec<Booking>, DbError> {
    let rows = sqlx::query_as::<_, BookingRow>(&format!("{BOOKING_SELECT} {clause}"))
        .bind(id)
        .fetch_all(executor)
        .await?;
    convert(rows)
}

#[async_trait]
impl PerksStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn BookingTx>, StoreError> {
        let tx = self.pool.pool().begin().await.map_err(DbError::from)?;
        Ok(Box::new(PgBookingTx { tx: Some(tx) }))
    }

    async fn session_actor(&self, token: &str) -> Result<Option<ActorId>, StoreError> {
        let id = sqlx::query_scalar::<_, uuid::Uuid>(
            r"SELECT actor_id FROM sessions
              WHERE token = $1 AND (expires_at IS NULL OR expires_at > now())",
        )
        .bind(token)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(DbError::from)?;
        Ok(id.map(ActorId::from))
    }

    async fn find_actor(&self, id: ActorId) -> Result<Option<Actor>, StoreError> {
        let row = sqlx::query_as::<_, ActorRow>(&format!("{ACTOR_SELECT} WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(self.pool.pool())
            .await
            .map_err(DbError::from)?;
        Ok(row.map(Actor::try_from).transpose()?)
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError> {
        let rows = sqlx::query_as::<_, ActorRow>(&format!("{ACTOR_SELECT} ORDER BY display_name"))
            .fetch_all(self.pool.pool())
            .await
            .map_err(DbError::from)?;
        Ok(convert(rows)?)
    }

    async fn set_actor_disabled(&self, id: ActorId, disabled: bool) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE actors SET disabled = $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(disabled)
            .execute(self.pool.pool())
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_rental(&self, id: RentalId) -> Result<Option<Rental>, StoreError> {
        let row = sqlx::query_as::<_, RentalRow>(&format!("{RENTAL_SELECT} WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(self.pool.pool())
            .await
            .map_err(DbError::from)?;
        Ok(row.map(Rental::from))
    }

    async fn list_rentals(&self, include_inactive: bool) -> Result<Vec<Rental>, StoreError> {
        let rows = sqlx::query_as::<_, RentalRow>(&format!(
            "{RENTAL_SELECT} WHERE active OR $1 ORDER BY title"
        ))
        .bind(include_inactive)
        .fetch_all(self.pool.pool())
        .await
        .map_err(DbError::from)?;
        Ok(rows.into_iter().map(Rental::from).collect())
    }

    async fn save_rental(&self, rental: &Rental) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO rentals (id, title, description, location, image_ref, nightly_points, weekly_points, active, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                location = EXCLUDED.location,
                image_ref = EXCLUDED.image_ref,
                nightly_points = EXCLUDED.nightly_points,
                weekly_points = EXCLUDED.weekly_points,
                active = EXCLUDED.active",
        )
        .bind(rental.id.into_inner())
        .bind(&rental.title)
        .bind(&rental.description)
        .bind(&rental.location)
        .bind(&rental.image_ref)
        .bind(rental.nightly_points)
        .bind(rental.weekly_points)
        .bind(rental.active)
        .bind(rental.created_at)
        .execute(self.pool.pool())
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn ledger_entries(&self, actor_id: ActorId) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(fetch_entries(self.pool.pool(), actor_id).await?)
    }

    async fn all_ledger_entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = sqlx::query_as::<_, LedgerRow>(&format!("{LEDGER_SELECT} ORDER BY created_at, id"))
            .fetch_all(self.pool.pool())
            .await
            .map_err(DbError::from)?;
        Ok(convert(rows)?)
    }

    async fn append_entry(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        Ok(insert_entry(self.pool.pool(), entry).await?)
    }

    async fn bookings_for_actor(&self, actor_id: ActorId) -> Result<Vec<Booking>, StoreError> {
        Ok(fetch_bookings(
            self.pool.pool(),
            "WHERE actor_id = $1 ORDER BY start_date DESC",
            actor_id.into_inner(),
        )
        .await?)
    }

    async fn active_bookings_for_rental(
        &self,
        rental_id: RentalId,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(fetch_bookings(
            self.pool.pool(),
            "WHERE rental_id = $1 AND status = 'booked' ORDER BY start_date",
            rental_id.into_inner(),
        )
        .await?)
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!("{BOOKING_SELECT} ORDER BY created_at"))
            .fetch_all(self.pool.pool())
            .await
            .map_err(DbError::from)?;
        Ok(convert(rows)?)
    }
}

/// One booking transaction. Dropping it without commit rolls back.
struct PgBookingTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgBookingTx {
    fn open(&mut self) -> Result<&mut Transaction<'static, Postgres>, DbError> {
        self.tx.as_mut().ok_or(DbError::Finished)
    }
}

#[async_trait]
impl BookingTx for PgBookingTx {
    async fn lock_actor(&mut self, id: ActorId) -> Result<Option<Actor>, StoreError> {
        let tx = self.open()?;
        let row = sqlx::query_as::<_, ActorRow>(&format!("{ACTOR_SELECT} WHERE id = $1 FOR UPDATE"))
            .bind(id.into_inner())
            .fetch_optional(&mut **tx)
            .await
            .map_err(DbError::from)?;
        Ok(row.map(Actor::try_from).transpose()?)
    }

    async fn overlapping_bookings(
        &mut self,
        rental_id: RentalId,
        stay: StayRange,
    ) -> Result<Vec<Booking>, StoreError> {
        let tx = self.open()?;
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{BOOKING_SELECT} WHERE rental_id = $1 AND status = 'booked' AND start_date < $3 AND end_date > $2"
        ))
        .bind(rental_id.into_inner())
        .bind(stay.start())
        .bind(stay.end())
        .fetch_all(&mut **tx)
        .await
        .map_err(DbError::from)?;
        Ok(convert(rows)?)
    }

    async fn ledger_entries(&mut self, actor_id: ActorId) -> Result<Vec<LedgerEntry>, StoreError> {
        let tx = self.open()?;
        Ok(fetch_entries(&mut **tx, actor_id).await?)
    }

    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), StoreError> {
        let tx = self.open()?;
        sqlx::query(
            r"INSERT INTO bookings (id, rental_id, actor_id, start_date, end_date, status, points_cost, created_at)
              VALUES ($1, $2, $3, $4, $5, $6::booking_status, $7, $8)",
        )
        .bind(booking.id.into_inner())
        .bind(booking.rental_id.into_inner())
        .bind(booking.actor_id.into_inner())
        .bind(booking.stay.start())
        .bind(booking.stay.end())
        .bind(status_to_db(booking.status))
        .bind(booking.points_cost)
        .bind(booking.created_at)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn append_entry(&mut self, entry: &LedgerEntry) -> Result<(), StoreError> {
        let tx = self.open()?;
        Ok(insert_entry(&mut **tx, entry).await?)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let tx = self.tx.take().ok_or(DbError::Finished)?;
        tx.commit().await.map_err(DbError::from)?;
        tracing::debug!("Booking transaction committed");
        Ok(())
    }
}
