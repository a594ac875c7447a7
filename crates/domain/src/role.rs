// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor roles and the authenticated actor.

use crate::error::DomainError;
use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Places orders and may cancel their own orders before confirmation.
    Client,
    /// Repartidor: claims pending orders and physically delivers assigned ones.
    DeliveryAgent,
    /// Dispatches and manages orders but never takes physical custody.
    Admin,
}

impl Role {
    /// Every role, in a stable order.
    pub const ALL: [Self; 3] = [Self::Client, Self::DeliveryAgent, Self::Admin];

    /// Returns the string representation used for storage and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::DeliveryAgent => "delivery_agent",
            Self::Admin => "admin",
        }
    }

    /// Whether an identity with this role may be assigned an order.
    #[must_use]
    pub const fn can_carry_orders(&self) -> bool {
        matches!(self, Self::DeliveryAgent | Self::Admin)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "delivery_agent" => Ok(Self::DeliveryAgent),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated identity and the role it acts under.
///
/// Actors are never persisted by the lifecycle core; they are supplied per
/// request by the authentication collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    /// The acting user.
    pub id: UserId,
    /// The role the user acts under.
    pub role: Role,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
