// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP error mapping.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reparto_api::{AuthError, LifecycleError};
use reparto_domain::DomainError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error indicator.
    pub error: bool,
    /// Machine-readable error kind.
    pub kind: String,
    /// Error message.
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// Machine-readable error kind.
    pub kind: &'static str,
    /// The error message.
    pub message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            kind: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<LifecycleError> for HttpError {
    fn from(err: LifecycleError) -> Self {
        let status: StatusCode = match err {
            LifecycleError::Validation { .. } => StatusCode::BAD_REQUEST,
            LifecycleError::Forbidden { .. } => StatusCode::FORBIDDEN,
            LifecycleError::NotFound { .. } => StatusCode::NOT_FOUND,
            LifecycleError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LifecycleError::Conflict { .. } => StatusCode::CONFLICT,
            LifecycleError::Infrastructure { .. } => {
                error!(error = %err, "Storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::AuthenticationFailed { .. } => Self {
                status: StatusCode::UNAUTHORIZED,
                kind: "authentication",
                message: err.to_string(),
            },
            AuthError::Unavailable { .. } => {
                error!(error = %err, "Session store failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "infrastructure",
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<DomainError> for HttpError {
    fn from(err: DomainError) -> Self {
        Self::from(LifecycleError::from(err))
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "validation",
            message: format!("Invalid request body: {}", rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "validation",
            message: format!("Invalid query: {}", rejection.body_text()),
        }
    }
}
