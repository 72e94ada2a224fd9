//! Manager portal endpoint handlers.
//!
//! Every handler here delegates to [`Admin`](perks_booking::Admin), which
//! rejects callers without the manager role.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use perks_booking::{PointsAward, RentalDraft, StatusChange};
use perks_types::{ActorId, RentalId};

use crate::auth::MaybeSession;
use crate::error::PortalError;
use crate::handlers::parse_uuid;
use crate::state::AppState;

/// `GET /api/manager/employees`
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
) -> Result<impl IntoResponse, PortalError> {
    let employees = state.admin.employees(caller.session()).await?;
    Ok(Json(serde_json::json!({
        "count": employees.len(),
        "employees": employees,
    })))
}

/// `POST /api/manager/employees/{id}/points`
pub async fn award_points(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
    Path(id_str): Path<String>,
    body: Result<Json<PointsAward>, JsonRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let actor_id = ActorId::from(parse_uuid(&id_str)?);
    let Json(award) = body?;
    let entry = state
        .admin
        .award_points(caller.session(), actor_id, award)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `PUT /api/manager/employees/{id}/status`
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
    Path(id_str): Path<String>,
    body: Result<Json<StatusChange>, JsonRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let actor_id = ActorId::from(parse_uuid(&id_str)?);
    let Json(change) = body?;
    let actor = state
        .admin
        .set_actor_status(caller.session(), actor_id, change)
        .await?;
    Ok(Json(actor))
}

/// `GET /api/manager/rentals`
pub async fn list_rentals(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
) -> Result<impl IntoResponse, PortalError> {
    let rentals = state.admin.rentals(caller.session()).await?;
    Ok(Json(serde_json::json!({
        "count": rentals.len(),
        "rentals": rentals,
    })))
}

/// `POST /api/manager/rentals`
pub async fn create_rental(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
    body: Result<Json<RentalDraft>, JsonRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Json(draft) = body?;
    let rental = state.admin.create_rental(caller.session(), draft).await?;
    Ok((StatusCode::CREATED, Json(rental)))
}

/// `PUT /api/manager/rentals/{id}`
pub async fn update_rental(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
    Path(id_str): Path<String>,
    body: Result<Json<RentalDraft>, JsonRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let id = RentalId::from(parse_uuid(&id_str)?);
    let Json(draft) = body?;
    let rental = state
        .admin
        .update_rental(caller.session(), id, draft)
        .await?;
    Ok(Json(rental))
}

/// `GET /api/manager/reconciliation`
pub async fn reconciliation(
    State(state): State<Arc<AppState>>,
    caller: MaybeSession,
) -> Result<impl IntoResponse, PortalError> {
    let report = state.admin.reconciliation(caller.session()).await?;
    Ok(Json(report))
}
