// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server boundary.
//!
//! Every order endpoint takes a [`SessionActor`], which resolves the
//! `Authorization: Bearer <token>` header into the caller's identity and
//! role. The live channel takes a [`LiveSession`], which also accepts the
//! token as a `?token=` query parameter since browsers cannot set headers on
//! WebSocket upgrades.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use reparto_api::{AuthError, AuthenticatedActor, AuthenticationService};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::HttpError;

/// The authenticated caller of an order endpoint.
pub struct SessionActor(pub AuthenticatedActor);

/// The authenticated caller of the live channel.
pub struct LiveSession(pub AuthenticatedActor);

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: String = bearer_token(parts)?.ok_or_else(|| {
            debug!("Missing Authorization header");
            AuthError::MissingToken
        })?;
        Ok(Self(authenticate(state, &token).await?))
    }
}

impl FromRequestParts<AppState> for LiveSession {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: Option<String> = match bearer_token(parts)? {
            Some(token) => Some(token),
            None => Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(query)| query.token),
        };
        let token: String = token.ok_or(AuthError::MissingToken)?;
        Ok(Self(authenticate(state, &token).await?))
    }
}

/// The bearer token of the request, if an `Authorization` header is present.
fn bearer_token(parts: &Parts) -> Result<Option<String>, AuthError> {
    let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let header: &str = header.to_str().map_err(|_| {
        warn!("Invalid Authorization header encoding");
        AuthError::AuthenticationFailed {
            reason: String::from("Authorization header is not valid text"),
        }
    })?;
    let token: &str = header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        AuthError::AuthenticationFailed {
            reason: String::from("expected 'Bearer <token>'"),
        }
    })?;
    Ok(Some(token.to_string()))
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedActor, AuthError> {
    let now = state.service.now();
    let mut persistence = state.persistence.lock().await;
    let actor = AuthenticationService::validate_token(&mut persistence, token, now)
        .inspect_err(|e| warn!(error = %e, "Session validation failed"))?;
    drop(persistence);

    debug!(
        actor_id = actor.user_id().value(),
        role = actor.role().as_str(),
        "Session validated"
    );
    Ok(actor)
}
