// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the lifecycle service.

use reparto_domain::DomainError;
use reparto_persistence::PersistenceError;

use crate::request_response::RequestError;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No token was presented.
    MissingToken,
    /// The token is unknown, expired, or names a user that no longer exists.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The session store could not be consulted.
    Unavailable {
        /// The underlying failure.
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "Authentication required: no session token"),
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unavailable { message } => {
                write!(f, "Authentication unavailable: {message}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Errors returned by lifecycle operations.
///
/// Each variant is a distinct outcome the boundary reports differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The order, user or product does not exist.
    NotFound {
        /// The kind of resource.
        resource: &'static str,
        /// What was looked up.
        message: String,
    },
    /// The requested move is not part of the order lifecycle.
    InvalidTransition {
        /// A human-readable description.
        message: String,
    },
    /// The actor may not perform this operation.
    Forbidden {
        /// Why the request was denied.
        reason: String,
    },
    /// The request is malformed or violates a business rule.
    Validation {
        /// The offending field.
        field: &'static str,
        /// A human-readable description.
        message: String,
    },
    /// The order changed underneath the request.
    Conflict {
        /// A human-readable description.
        message: String,
    },
    /// Storage failed.
    Infrastructure {
        /// The underlying failure.
        message: String,
    },
}

impl LifecycleError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(resource: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            message: message.into(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// A short machine-readable name for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Forbidden { .. } => "forbidden",
            Self::Validation { .. } => "validation",
            Self::Conflict { .. } => "conflict",
            Self::Infrastructure { .. } => "infrastructure",
        }
    }
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { resource, message } => write!(f, "{resource} not found: {message}"),
            Self::InvalidTransition { message } => write!(f, "Invalid transition: {message}"),
            Self::Forbidden { reason } => write!(f, "Forbidden: {reason}"),
            Self::Validation { field, message } => {
                write!(f, "Invalid {field}: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Infrastructure { message } => write!(f, "Storage failure: {message}"),
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Translates a domain error into a lifecycle error.
///
/// Lifecycle and permission violations keep their own kinds; every other
/// domain rejection is a validation failure.
impl From<DomainError> for LifecycleError {
    fn from(err: DomainError) -> Self {
        let message: String = err.to_string();
        match err {
            DomainError::InvalidTransition { .. } => Self::InvalidTransition { message },
            DomainError::PermissionDenied { reason, .. } => Self::Forbidden { reason },
            DomainError::InvalidIdentifier { kind, .. } => Self::Validation {
                field: kind,
                message,
            },
            DomainError::InvalidStatus(_) => Self::Validation {
                field: "status",
                message,
            },
            DomainError::InvalidRole(_) => Self::Validation {
                field: "role",
                message,
            },
            DomainError::EmptyOrder | DomainError::InvalidQuantity { .. } => Self::Validation {
                field: "items",
                message,
            },
            DomainError::InvalidCoordinates { .. } => Self::Validation {
                field: "location",
                message,
            },
            DomainError::InvalidRadius(_) => Self::Validation {
                field: "radius_km",
                message,
            },
            DomainError::InvalidAddress(_) => Self::Validation {
                field: "address",
                message,
            },
            DomainError::AmountOverflow => Self::Validation {
                field: "total",
                message,
            },
            DomainError::InvalidTimezone(_) | DomainError::InvalidBusinessHours(_) => {
                Self::Validation {
                    field: "business_hours",
                    message,
                }
            }
        }
    }
}

impl From<PersistenceError> for LifecycleError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(message) => Self::NotFound {
                resource: "Record",
                message,
            },
            other => Self::Infrastructure {
                message: other.to_string(),
            },
        }
    }
}

impl From<RequestError> for LifecycleError {
    fn from(err: RequestError) -> Self {
        Self::Validation {
            field: err.field(),
            message: err.to_string(),
        }
    }
}
