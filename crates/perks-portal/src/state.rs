//! Shared state for the portal handlers.

use std::sync::Arc;

use perks_booking::{Accounts, Admin, BookingEngine, PerksStore};

/// Services every handler can reach. Built once at startup and shared as
/// `Arc<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Backing store; also used to resolve session tokens.
    pub store: Arc<dyn PerksStore>,
    /// Booking, quotes, availability.
    pub engine: BookingEngine,
    /// Self-service reads.
    pub accounts: Accounts,
    /// Manager operations.
    pub admin: Admin,
    /// Name of the storage backend, reported by `/health`.
    pub backend: &'static str,
}

impl AppState {
    /// Wire every service to `store`.
    pub fn new(store: Arc<dyn PerksStore>, backend: &'static str) -> Self {
        Self {
            engine: BookingEngine::new(Arc::clone(&store)),
            accounts: Accounts::new(Arc::clone(&store)),
            admin: Admin::new(Arc::clone(&store)),
            store,
            backend,
        }
    }
}
