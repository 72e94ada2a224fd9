//! Per-request session resolution.
//!
//! The `Authorization: Bearer <token>` header is looked up in the store on
//! every request. A missing, malformed, or unknown token yields no session;
//! the service then answers `Unauthenticated`. Whether the session may do
//! what it asks is decided by the service layer, not here.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use perks_booking::Session;

use crate::error::PortalError;
use crate::state::AppState;

/// The caller's session, if the request carried a valid token.
#[derive(Debug, Clone, Copy)]
pub struct MaybeSession(pub Option<Session>);

impl MaybeSession {
    /// Borrow the session for a service call.
    pub const fn session(&self) -> Option<&Session> {
        self.0.as_ref()
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeSession {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };
        let Some(actor_id) = state.store.session_actor(token).await? else {
            tracing::debug!("Unknown session token");
            return Ok(Self(None));
        };
        let session = state
            .store
            .find_actor(actor_id)
            .await?
            .map(|actor| Session {
                actor_id: actor.id,
                role: actor.role,
            });
        Ok(Self(session))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
