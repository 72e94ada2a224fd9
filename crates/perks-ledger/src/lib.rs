//! Points ledger for the staff perks service.
//!
//! Employees earn points, managers credit and adjust them, and points pay
//! for rental bookings. Every movement of points is one signed entry in an
//! append-only ledger; nothing else records a balance.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: append-only log with per-actor queries.
//! - [`transaction`] -- The [`EntryBuilder`] for validated entry construction.
//! - [`balance`](mod@balance) -- The balance calculator.
//! - [`pricing`] -- The stay-cost calculator and validated [`Pricing`].
//! - [`reconcile`](mod@reconcile) -- Booking/debit drift detection.
//!
//! # Invariants
//!
//! ```text
//! balance(actor) == sum(entry.amount for entry in ledger if entry.actor == actor)
//! stay_cost(n, nightly, weekly) <= n * nightly
//! ```
//!
//! # Usage
//!
//! ```
//! use perks_ledger::{EntryBuilder, Ledger, stay_cost};
//! use perks_types::{ActorId, LedgerCategory};
//!
//! let mut ledger = Ledger::new();
//! let actor = ActorId::new();
//!
//! let credit = EntryBuilder::award(
//!     actor,
//!     LedgerCategory::Earn,
//!     1_000,
//!     "Quarterly recognition".to_owned(),
//! );
//! if let Ok(entry) = credit {
//!     ledger.append(entry);
//! }
//!
//! assert_eq!(ledger.balance_of(actor), 1_000);
//! assert_eq!(stay_cost(10, 100, 700), 1_000);
//! ```

pub mod balance;
pub mod ledger;
pub mod pricing;
pub mod reconcile;
pub mod transaction;

// Re-export primary types at crate root.
pub use balance::balance;
pub use ledger::Ledger;
pub use pricing::{Pricing, stay_cost};
pub use reconcile::{Discrepancy, ReconciliationReport, reconcile};
pub use transaction::EntryBuilder;

use perks_types::LedgerCategory;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when building or recording ledger entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be non-zero.
    #[error("ledger entry amount must be non-zero")]
    ZeroAmount,

    /// The amount's sign contradicts the entry category.
    #[error("{category:?} entries cannot carry amount {amount}")]
    WrongSign {
        /// The entry category.
        category: LedgerCategory,
        /// The rejected amount.
        amount: i64,
    },

    /// The reason was empty or whitespace.
    #[error("ledger entry reason must not be blank")]
    BlankReason,

    /// A spend entry must reference the booking it pays for.
    #[error("spend entries must reference a booking")]
    UnlinkedSpend,

    /// The category is not allowed for this operation.
    #[error("category {0:?} is not allowed here")]
    InvalidCategory(LedgerCategory),

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
