//! Axum router construction for the portal API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::manager;
use crate::state::AppState;

/// Build the complete router.
///
/// Employee routes live under `/api`, manager routes under
/// `/api/manager`; see [`handlers`] for the table. Access control is
/// enforced by the services, not by route grouping.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/session", get(handlers::session))
        // Rentals and booking
        .route("/api/rentals", get(handlers::list_rentals))
        .route("/api/rentals/{id}", get(handlers::get_rental))
        .route("/api/rentals/{id}/availability", get(handlers::availability))
        .route("/api/rentals/{id}/quote", get(handlers::quote))
        .route("/api/rentals/{id}/bookings", post(handlers::book_rental))
        // Own account
        .route("/api/me/balance", get(handlers::my_balance))
        .route("/api/me/ledger", get(handlers::my_ledger))
        .route("/api/me/bookings", get(handlers::my_bookings))
        // Manager portal
        .route("/api/manager/employees", get(manager::list_employees))
        .route("/api/manager/employees/{id}/points", post(manager::award_points))
        .route("/api/manager/employees/{id}/status", put(manager::set_status))
        .route(
            "/api/manager/rentals",
            get(manager::list_rentals).post(manager::create_rental),
        )
        .route("/api/manager/rentals/{id}", put(manager::update_rental))
        .route("/api/manager/reconciliation", get(manager::reconciliation))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
