// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session-token authentication.
//!
//! Tokens and users are written by the credential issuer. This module only
//! turns a presented token into the identity and role it was issued for.

use reparto_domain::{Actor, Role, UserId};
use reparto_persistence::{Persistence, PersistenceError, SessionData, UserData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::error::AuthError;

/// An actor whose session token has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The identity and role to authorize against.
    pub actor: Actor,
    /// The user's display name.
    pub display_name: String,
    /// When the presented session stops being valid.
    pub session_expires_at: OffsetDateTime,
}

impl AuthenticatedActor {
    /// The acting user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.actor.id
    }

    /// The role the user acts under.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.actor.role
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session lifetime for tokens issued here.
    pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::days(30);

    /// Validates a session token and returns the actor it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` for a blank token,
    /// `AuthError::AuthenticationFailed` for an unknown or expired session, and
    /// `AuthError::Unavailable` if storage fails.
    pub fn validate_token(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<AuthenticatedActor, AuthError> {
        let session_token: &str = session_token.trim();
        if session_token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        if now >= session.expires_at {
            debug!(user_id = session.user_id.value(), "Rejected expired session");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        Ok(AuthenticatedActor {
            actor: Actor::new(user.user_id, user.role),
            display_name: user.display_name,
            session_expires_at: session.expires_at,
        })
    }

    /// Issues a fresh session token for an existing user.
    ///
    /// This is the hook the credential issuer and the test suites use; it
    /// performs no credential check of its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or storage fails.
    pub fn issue_session(
        persistence: &mut Persistence,
        user_id: UserId,
        lifetime: Duration,
        now: OffsetDateTime,
    ) -> Result<String, AuthError> {
        if persistence
            .get_user(user_id)
            .map_err(Self::map_persistence_error)?
            .is_none()
        {
            return Err(AuthError::AuthenticationFailed {
                reason: format!("Unknown user {user_id}"),
            });
        }

        let session_token: String = Self::generate_session_token();
        persistence
            .create_session(&session_token, user_id, now + lifetime, now)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = user_id.value(), "Issued session");
        Ok(session_token)
    }

    /// Ends a session. Returns `false` if the token was not live.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<bool, AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    fn generate_session_token() -> String {
        format!(
            "{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::Unavailable {
            message: err.to_string(),
        }
    }
}
