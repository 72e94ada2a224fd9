//! The single authorization check shared by every entry point.
//!
//! A request carries an explicit [`Session`] (or none). Each operation
//! describes what it needs as a [`Policy`] and calls [`authorize`] with the
//! session and the freshly loaded actor record. Disabled actors are
//! rejected before role or ownership is considered, so a disabled actor
//! always sees [`AccessError::ActorDisabled`].

use perks_types::{Actor, ActorId, Role};
use serde::Serialize;

use crate::error::ServiceError;
use crate::store::PerksStore;

/// The signed-in caller of a request.
///
/// Built per request from the bearer token by the portal layer; there is
/// no process-wide "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    /// The signed-in actor.
    pub actor_id: ActorId,
    /// The actor's role when the session was resolved.
    pub role: Role,
}

impl Session {
    /// Landing path for this session's role.
    pub const fn home_path(&self) -> &'static str {
        self.role.home_path()
    }
}

/// What an operation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policy {
    role: Option<Role>,
    owner: Option<ActorId>,
}

impl Policy {
    /// Any signed-in, enabled actor.
    pub const fn signed_in() -> Self {
        Self {
            role: None,
            owner: None,
        }
    }

    /// A signed-in, enabled actor with exactly this role.
    pub const fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            owner: None,
        }
    }

    /// Additionally require the caller to own the record belonging to
    /// `owner`. Managers pass ownership checks for any record.
    #[must_use]
    pub const fn owned_by(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Why an authorization check failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// No session.
    #[error("no session")]
    Unauthenticated,
    /// The session refers to an actor that no longer exists.
    #[error("session actor does not exist")]
    UnknownActor,
    /// The actor is disabled.
    #[error("actor is disabled")]
    ActorDisabled,
    /// Wrong role or not the owner.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
}

/// Check `session` against `policy`.
///
/// `actor` is the session actor's current record, loaded by the caller;
/// its role and disabled flag take precedence over whatever the session
/// captured earlier.
pub fn authorize<'s>(
    session: Option<&'s Session>,
    actor: Option<&Actor>,
    policy: &Policy,
) -> Result<&'s Session, AccessError> {
    let session = session.ok_or(AccessError::Unauthenticated)?;
    let actor = actor
        .filter(|a| a.id == session.actor_id)
        .ok_or(AccessError::UnknownActor)?;

    if actor.disabled {
        return Err(AccessError::ActorDisabled);
    }

    if let Some(required) = policy.role {
        if actor.role != required {
            return Err(AccessError::Forbidden("wrong portal for this role"));
        }
    }

    if let Some(owner) = policy.owner {
        if owner != actor.id && actor.role != Role::Manager {
            return Err(AccessError::Forbidden("record belongs to another actor"));
        }
    }

    Ok(session)
}

/// Load the session actor's current record and run [`authorize`] on it.
///
/// Returns the fresh actor record on success.
pub(crate) async fn resolve(
    store: &dyn PerksStore,
    session: Option<&Session>,
    policy: &Policy,
) -> Result<Actor, ServiceError> {
    let actor = match session {
        Some(s) => store.find_actor(s.actor_id).await?,
        None => None,
    };
    authorize(session, actor.as_ref(), policy)?;
    actor.ok_or_else(|| ServiceError::NotFound("actor".to_owned()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn actor(role: Role, disabled: bool) -> Actor {
        Actor {
            id: ActorId::new(),
            display_name: "Dana Reyes".to_owned(),
            email: "dana@example.com".to_owned(),
            role,
            disabled,
            created_at: Utc::now(),
        }
    }

    fn session_for(actor: &Actor) -> Session {
        Session {
            actor_id: actor.id,
            role: actor.role,
        }
    }

    #[test]
    fn missing_session_is_unauthenticated() {
        let a = actor(Role::Employee, false);
        let result = authorize(None, Some(&a), &Policy::signed_in());
        assert_eq!(result, Err(AccessError::Unauthenticated));
    }

    #[test]
    fn missing_actor_is_unknown() {
        let a = actor(Role::Employee, false);
        let s = session_for(&a);
        assert_eq!(
            authorize(Some(&s), None, &Policy::signed_in()),
            Err(AccessError::UnknownActor)
        );

        let other = actor(Role::Employee, false);
        assert_eq!(
            authorize(Some(&s), Some(&other), &Policy::signed_in()),
            Err(AccessError::UnknownActor)
        );
    }

    #[test]
    fn disabled_wins_over_role_and_ownership() {
        let a = actor(Role::Manager, true);
        let s = session_for(&a);
        let policy = Policy::role(Role::Employee).owned_by(ActorId::new());
        assert_eq!(
            authorize(Some(&s), Some(&a), &policy),
            Err(AccessError::ActorDisabled)
        );
    }

    #[test]
    fn role_must_match() {
        let a = actor(Role::Employee, false);
        let s = session_for(&a);
        assert!(authorize(Some(&s), Some(&a), &Policy::role(Role::Employee)).is_ok());
        assert!(matches!(
            authorize(Some(&s), Some(&a), &Policy::role(Role::Manager)),
            Err(AccessError::Forbidden(_))
        ));
    }

    #[test]
    fn role_change_after_sign_in_is_honoured() {
        let mut a = actor(Role::Manager, false);
        let s = session_for(&a);
        a.role = Role::Employee;
        assert!(matches!(
            authorize(Some(&s), Some(&a), &Policy::role(Role::Manager)),
            Err(AccessError::Forbidden(_))
        ));
    }

    #[test]
    fn owners_and_managers_pass_ownership() {
        let employee = actor(Role::Employee, false);
        let manager = actor(Role::Manager, false);
        let owned = Policy::signed_in().owned_by(employee.id);

        assert!(authorize(Some(&session_for(&employee)), Some(&employee), &owned).is_ok());
        assert!(authorize(Some(&session_for(&manager)), Some(&manager), &owned).is_ok());

        let stranger = actor(Role::Employee, false);
        assert!(matches!(
            authorize(Some(&session_for(&stranger)), Some(&stranger), &owned),
            Err(AccessError::Forbidden(_))
        ));
    }
}
