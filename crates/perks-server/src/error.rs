//! Error types for the server binary.

/// Top-level error for startup and serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Database connection or migration failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: perks_db::DbError,
    },

    /// Writing seed data failed.
    #[error("seed error: {0}")]
    Seed(String),

    /// The portal server failed to bind or serve.
    #[error("portal error: {source}")]
    Portal {
        /// The underlying server error.
        #[from]
        source: perks_portal::ServerError,
    },
}

impl From<perks_booking::StoreError> for ServerError {
    fn from(err: perks_booking::StoreError) -> Self {
        Self::Seed(err.to_string())
    }
}
