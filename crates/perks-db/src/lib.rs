//! `PostgreSQL` storage for the staff perks service.
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool and migrations
//! - [`store`] -- [`PgStore`], the `PostgreSQL` implementation of
//!   [`perks_booking::PerksStore`]
//! - [`rows`] -- row types and enum label mapping
//! - [`error`] -- [`DbError`] and its mapping onto store errors
//!
//! The schema lives in `migrations/`. Overlapping active bookings on one
//! rental are rejected by an exclusion constraint, so the guarantee holds
//! even for writers that bypass [`PgStore`].

pub mod error;
pub mod postgres;
pub mod rows;
pub mod store;

pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::PgStore;
