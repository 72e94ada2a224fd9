//! Employee-facing endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness and storage backend |
//! | `GET` | `/api/session` | Signed-in actor and landing path |
//! | `GET` | `/api/rentals` | Rentals visible to the caller |
//! | `GET` | `/api/rentals/{id}` | One rental |
//! | `GET` | `/api/rentals/{id}/availability` | Booked date ranges |
//! | `GET` | `/api/rentals/{id}/quote` | Price a stay (`?start=&end=`) |
//! | `POST` | `/api/rentals/{id}/bookings` | Book a stay |
//! | `GET` | `/api/me/balance` | Current points balance |
//! | `GET` | `/api/me/ledger` | Points history, newest first |
//! | `GET` | `/api/me/bookings` | Own bookings |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;

use perks_booking::BookingRequest;
use perks_types::RentalId;

use crate::auth::MaybeSession;
use crate::error::PortalError;
use crate::state::AppState;

/// Query parameters for `GET /api/rentals/{id}/quote`.
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    /// Check-in date, `YYYY-MM-DD`.
    pub start: Option<String>,
    /// Checkout date, `YYYY-MM-DD`.
    pub end: Option<String>,
}

/// Body of `POST /api/rentals/{id}/bookings`.
#[derive(Debug, Deserialize)]
pub struct StayBody {
    /// Check-in date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Checkout date, `YYYY-MM-DD`, exclusive.
    pub end_date: String,
}

/// Liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "backend": state.backend,
    }))
}

/// The signed-in actor and where their portal lives.
pub async fn session(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
) -> Result<impl IntoResponse, PortalError> {
    let summary = state.accounts.session_summary(caller.session()).await?;
    Ok(Json(summary))
}

/// Rentals the caller can see.
pub async fn list_rentals(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
) -> Result<impl IntoResponse, PortalError> {
    let rentals = state.accounts.rentals(caller.session()).await?;
    Ok(Json(serde_json::json!({
        "count": rentals.len(),
        "rentals": rentals,
    })))
}

/// One rental.
pub async fn get_rental(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, PortalError> {
    let id = parse_rental_id(&id_str)?;
    let rental = state.accounts.rental(caller.session(), id).await?;
    Ok(Json(rental))
}

/// Date ranges held by active bookings, for the availability calendar.
pub async fn availability(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, PortalError> {
    let id = parse_rental_id(&id_str)?;
    let booked = state.engine.availability(caller.session(), id).await?;
    Ok(Json(serde_json::json!({
        "rental_id": id,
        "booked": booked,
    })))
}

/// Price a stay without booking it.
pub async fn quote(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
    Path(id_str): Path<String>,
    Query(params): Query<QuoteQuery>,
) -> Result<impl IntoResponse, PortalError> {
    let id = parse_rental_id(&id_str)?;
    let start = params.start.unwrap_or_default();
    let end = params.end.unwrap_or_default();
    let quote = state.engine.quote(caller.session(), id, &start, &end).await?;
    Ok(Json(quote))
}

/// Book a stay and pay for it with points.
pub async fn book_rental(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
    Path(id_str): Path<String>,
    body: Result<Json<StayBody>, JsonRejection>,
) -> Result<impl IntoResponse, PortalError> {
    // Identity errors outrank payload errors: a disabled caller gets 403
    // whatever they sent.
    state.accounts.session_summary(caller.session()).await?;
    let rental_id = parse_rental_id(&id_str)?;
    let Json(stay) = body?;
    let request = BookingRequest {
        rental_id,
        start_date: stay.start_date,
        end_date: stay.end_date,
    };
    let receipt = state.engine.book_rental(caller.session(), &request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// The caller's balance.
pub async fn my_balance(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
) -> Result<impl IntoResponse, PortalError> {
    Ok(Json(state.accounts.balance(caller.session()).await?))
}

/// The caller's ledger, newest first.
pub async fn my_ledger(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
) -> Result<impl IntoResponse, PortalError> {
    let entries = state.accounts.history(caller.session()).await?;
    Ok(Json(serde_json::json!({
        "count": entries.len(),
        "entries": entries,
    })))
}

/// The caller's bookings.
pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
) -> Result<impl IntoResponse, PortalError> {
    let bookings = state.accounts.my_bookings(caller.session()).await?;
    Ok(Json(serde_json::json!({
        "count": bookings.len(),
        "bookings": bookings,
    })))
}

/// Parse a UUID path segment.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, PortalError> {
    s.parse::<Uuid>()
        .map_err(|e| PortalError::InvalidUuid(format!("{s}: {e}")))
}

fn parse_rental_id(s: &str) -> Result<RentalId, PortalError> {
    parse_uuid(s).map(RentalId::from)
}
