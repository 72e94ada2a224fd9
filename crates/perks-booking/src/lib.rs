//! Booking workflow, authorization, and storage interface for the staff
//! perks service.
//!
//! - [`BookingEngine`] runs the points-paid booking transaction and prices
//!   stays.
//! - [`Accounts`] serves an actor's own balance, history, and bookings.
//! - [`Admin`] holds the manager operations.
//! - [`authorize`] is the one access check all of them go through.
//! - [`PerksStore`] / [`BookingTx`] abstract storage; [`MemoryStore`] is
//!   the in-process implementation.

pub mod access;
pub mod accounts;
pub mod admin;
pub mod error;
pub mod memory;
pub mod request;
pub mod store;
pub mod workflow;

pub use access::{AccessError, Policy, Session, authorize};
pub use accounts::{Accounts, BalanceView, SessionSummary};
pub use admin::{Admin, EmployeeSummary, PointsAward, RentalDraft, StatusChange};
pub use error::{ErrorKind, ServiceError};
pub use memory::{Fault, MemoryStore};
pub use request::{BookingReceipt, BookingRequest, Quote, parse_stay};
pub use store::{BookingTx, PerksStore, StoreError};
pub use workflow::{BookingEngine, BookingStage};
