//! Error taxonomy for the booking workflow and the portal operations.
//!
//! Each variant is a user-facing failure kind. None are retried; the
//! caller surfaces the message and the system stays in its prior state.

use serde::Serialize;

use crate::access::AccessError;
use crate::store::StoreError;

/// Errors returned by [`BookingEngine`](crate::BookingEngine),
/// [`Accounts`](crate::Accounts), and [`Admin`](crate::Admin).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No signed-in actor.
    #[error("sign in to continue")]
    Unauthenticated,

    /// The actor has been disabled by a manager.
    #[error("this account has been disabled")]
    ActorDisabled,

    /// The signed-in actor lacks the role or ownership required.
    #[error("not allowed: {0}")]
    Forbidden(String),

    /// Malformed input (dates, amounts, listing fields).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced rental, actor, or record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The rental exists but is not open for booking.
    #[error("this rental is not currently available for booking")]
    ResourceInactive,

    /// The rental has no usable nightly rate.
    #[error("this rental has no nightly point price configured")]
    PricingNotConfigured,

    /// Another active booking overlaps the requested dates.
    #[error("the selected dates are not available")]
    DatesUnavailable,

    /// The actor cannot afford the stay.
    #[error("insufficient points: this stay costs {cost} points but your balance is {balance}")]
    InsufficientBalance {
        /// Point cost of the requested stay.
        cost: i64,
        /// The actor's current balance.
        balance: i64,
    },

    /// A storage operation failed after all checks passed; nothing was
    /// committed.
    #[error("could not save: {0}")]
    PersistenceFailure(String),
}

/// Stable machine-readable name of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ServiceError::Unauthenticated`].
    Unauthenticated,
    /// See [`ServiceError::ActorDisabled`].
    ActorDisabled,
    /// See [`ServiceError::Forbidden`].
    Forbidden,
    /// See [`ServiceError::InvalidInput`].
    InvalidInput,
    /// See [`ServiceError::NotFound`].
    NotFound,
    /// See [`ServiceError::ResourceInactive`].
    ResourceInactive,
    /// See [`ServiceError::PricingNotConfigured`].
    PricingNotConfigured,
    /// See [`ServiceError::DatesUnavailable`].
    DatesUnavailable,
    /// See [`ServiceError::InsufficientBalance`].
    InsufficientBalance,
    /// See [`ServiceError::PersistenceFailure`].
    PersistenceFailure,
}

impl ServiceError {
    /// The kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::ActorDisabled => ErrorKind::ActorDisabled,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ResourceInactive => ErrorKind::ResourceInactive,
            Self::PricingNotConfigured => ErrorKind::PricingNotConfigured,
            Self::DatesUnavailable => ErrorKind::DatesUnavailable,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
        }
    }
}

impl From<AccessError> for ServiceError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => Self::Unauthenticated,
            AccessError::UnknownActor => Self::NotFound("actor".to_owned()),
            AccessError::ActorDisabled => Self::ActorDisabled,
            AccessError::Forbidden(why) => Self::Forbidden(why.to_owned()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            // Only the booking insert can conflict: a concurrent request
            // took the same dates between our check and our write.
            StoreError::Conflict(_) => Self::DatesUnavailable,
            StoreError::Backend(msg) | StoreError::Corrupt(msg) => Self::PersistenceFailure(msg),
        }
    }
}

impl From<perks_ledger::LedgerError> for ServiceError {
    fn from(err: perks_ledger::LedgerError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_reports_cost_and_balance() {
        let err = ServiceError::InsufficientBalance {
            cost: 50,
            balance: 40,
        };
        let message = err.to_string();
        assert!(message.contains("50"));
        assert!(message.contains("40"));
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    }

    #[test]
    fn store_conflict_means_dates_taken() {
        let err = ServiceError::from(StoreError::Conflict("overlap".to_owned()));
        assert_eq!(err.kind(), ErrorKind::DatesUnavailable);

        let err = ServiceError::from(StoreError::Backend("connection reset".to_owned()));
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    }

    #[test]
    fn access_errors_map_to_kinds() {
        assert_eq!(
            ServiceError::from(AccessError::ActorDisabled).kind(),
            ErrorKind::ActorDisabled
        );
        assert_eq!(
            ServiceError::from(AccessError::UnknownActor).kind(),
            ErrorKind::NotFound
        );
    }
}
