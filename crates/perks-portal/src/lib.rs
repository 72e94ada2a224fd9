//! Employee and manager portal API for the staff perks service.
//!
//! An Axum HTTP server exposing the booking workflow, self-service account
//! reads, and manager operations as JSON endpoints. Callers authenticate
//! with a bearer token that is resolved to a
//! [`Session`](perks_booking::Session) on every request.
//!
//! Errors render as `{ "error", "kind", "status" }` with the status chosen
//! from the error kind (see [`error::status_for`]).

pub mod auth;
pub mod error;
pub mod handlers;
pub mod manager;
pub mod router;
pub mod server;
pub mod state;

pub use error::PortalError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
