//! Shared type definitions for the staff perks service.
//!
//! This crate is the single source of truth for the entities that flow
//! between the points ledger, the booking workflow, the database layer, and
//! the portal API. Types are exported to `TypeScript` via `ts-rs` for the
//! manager and employee portal frontends.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Roles, ledger categories, booking status
//! - [`stay`] -- Half-open date ranges for rental stays
//! - [`structs`] -- Actors, rentals, ledger entries, bookings

pub mod enums;
pub mod ids;
pub mod stay;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BookingStatus, LedgerCategory, Role};
pub use ids::{ActorId, BookingId, LedgerEntryId, RentalId};
pub use stay::StayRange;
pub use structs::{Actor, Booking, LedgerEntry, Rental};
