//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors. The booking layer sees them as
//! [`StoreError`](perks_booking::StoreError); the exclusion-constraint
//! violation raised by an overlapping booking insert becomes
//! [`StoreError::Conflict`](perks_booking::StoreError::Conflict).

use perks_booking::StoreError;

/// SQLSTATE for `exclusion_violation`.
pub const EXCLUSION_VIOLATION: &str = "23P01";

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A row held a value the domain types cannot represent.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// The transaction was already committed.
    #[error("Transaction already finished")]
    Finished,

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Whether this is an exclusion-constraint violation.
    pub fn is_exclusion_violation(&self) -> bool {
        match self {
            Self::Postgres(sqlx::Error::Database(db)) => {
                db.code().as_deref() == Some(EXCLUSION_VIOLATION)
            }
            _ => false,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if err.is_exclusion_violation() {
            return Self::Conflict(err.to_string());
        }
        match err {
            DbError::Corrupt(msg) => Self::Corrupt(msg),
            other => Self::Backend(other.to_string()),
        }
    }
}
