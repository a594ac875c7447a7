// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order status states and the structural transition table.
//!
//! The transition table answers only whether a move between two states is part
//! of the lifecycle. Whether a particular actor may request it is decided by the
//! permission engine in `permission`.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Order lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed inside business hours, waiting for confirmation.
    Pending,
    /// Placed outside business hours, waiting for confirmation.
    PendingOutOfHours,
    /// Accepted for delivery, no agent assigned yet.
    Confirmed,
    /// A delivery agent has committed to the order.
    Assigned,
    /// The assigned agent is on the way.
    InTransit,
    /// Handed to the client. Terminal.
    Delivered,
    /// Cancelled before assignment. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::PendingOutOfHours,
        Self::Confirmed,
        Self::Assigned,
        Self::InTransit,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingOutOfHours => "pending_out_of_hours",
            Self::Confirmed => "confirmed",
            Self::Assigned => "assigned",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "pending_out_of_hours" => Ok(Self::PendingOutOfHours),
            "confirmed" => Ok(Self::Confirmed),
            "assigned" => Ok(Self::Assigned),
            "in_transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true if no transition may leave this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Returns true for the two initial, unclaimed statuses.
    #[must_use]
    pub const fn is_unclaimed(&self) -> bool {
        matches!(self, Self::Pending | Self::PendingOutOfHours)
    }

    /// Returns true for statuses in which an agent must be assigned.
    #[must_use]
    pub const fn requires_agent(&self) -> bool {
        matches!(self, Self::Assigned | Self::InTransit | Self::Delivered)
    }

    /// Whether moving from this status to `target` is part of the lifecycle.
    ///
    /// Same-state pairs, skipped states and anything leaving a terminal state
    /// are illegal. Cancellation is only reachable before assignment.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending | Self::PendingOutOfHours,
                Self::Confirmed | Self::Cancelled
            ) | (Self::Confirmed, Self::Assigned | Self::Cancelled)
                | (Self::Assigned, Self::InTransit)
                | (Self::InTransit, Self::Delivered)
        )
    }

    /// Validates a transition against the lifecycle table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the pair is not legal.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: *self,
                to: target,
            })
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
