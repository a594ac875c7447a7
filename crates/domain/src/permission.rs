// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role-based transition policies.
//!
//! A transition is permitted only when the lifecycle table allows it and the
//! actor's policy allows it. The table is consulted first so that a request
//! for an impossible move is always reported as an invalid transition, never
//! as a permission problem.

use crate::error::DomainError;
use crate::order::Order;
use crate::role::{Actor, Role};
use crate::status::OrderStatus;

/// Decides whether an actor of one role may request a lifecycle move.
///
/// Implementations assume the move is already legal per the transition table.
pub trait TransitionPolicy: Send + Sync {
    /// The role this policy governs.
    fn role(&self) -> Role;

    /// Returns `Ok(())` if `actor` may move `order` to `target`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PermissionDenied` with a reason otherwise.
    fn authorize(&self, order: &Order, target: OrderStatus, actor: &Actor)
    -> Result<(), DomainError>;

    /// Builds a denial for this policy's role.
    fn deny(&self, reason: &str) -> DomainError {
        DomainError::PermissionDenied {
            role: self.role(),
            reason: reason.to_string(),
        }
    }
}

/// Clients may only cancel their own unclaimed orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientPolicy;

impl TransitionPolicy for ClientPolicy {
    fn role(&self) -> Role {
        Role::Client
    }

    fn authorize(
        &self,
        order: &Order,
        target: OrderStatus,
        actor: &Actor,
    ) -> Result<(), DomainError> {
        if target != OrderStatus::Cancelled {
            return Err(self.deny("clients may only cancel orders"));
        }
        if order.client_id != actor.id {
            return Err(self.deny("clients may only cancel their own orders"));
        }
        if !order.status.is_unclaimed() {
            return Err(self.deny("orders can only be cancelled by the client before confirmation"));
        }
        Ok(())
    }
}

/// Delivery agents confirm unclaimed orders and drive their own deliveries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryAgentPolicy;

impl TransitionPolicy for DeliveryAgentPolicy {
    fn role(&self) -> Role {
        Role::DeliveryAgent
    }

    fn authorize(
        &self,
        order: &Order,
        target: OrderStatus,
        actor: &Actor,
    ) -> Result<(), DomainError> {
        match target {
            OrderStatus::Confirmed if order.status.is_unclaimed() => Ok(()),
            OrderStatus::InTransit | OrderStatus::Delivered => {
                if order.is_assigned_to(actor.id) {
                    Ok(())
                } else {
                    Err(self.deny("only the assigned agent may advance this delivery"))
                }
            }
            _ => Err(self.deny(&format!(
                "delivery agents may not move orders from {} to {target}",
                order.status
            ))),
        }
    }
}

/// Administrators dispatch and cancel but never take physical custody.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminPolicy;

impl TransitionPolicy for AdminPolicy {
    fn role(&self) -> Role {
        Role::Admin
    }

    fn authorize(
        &self,
        order: &Order,
        target: OrderStatus,
        _actor: &Actor,
    ) -> Result<(), DomainError> {
        let allowed = match target {
            OrderStatus::Confirmed => order.status.is_unclaimed(),
            OrderStatus::Assigned => order.status == OrderStatus::Confirmed,
            OrderStatus::Cancelled => {
                order.status.is_unclaimed() || order.status == OrderStatus::Confirmed
            }
            OrderStatus::InTransit | OrderStatus::Delivered => {
                return Err(self.deny("administrators do not carry deliveries"));
            }
            OrderStatus::Pending | OrderStatus::PendingOutOfHours => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(self.deny(&format!(
                "administrators may not move orders from {} to {target}",
                order.status
            )))
        }
    }
}

static CLIENT_POLICY: ClientPolicy = ClientPolicy;
static DELIVERY_AGENT_POLICY: DeliveryAgentPolicy = DeliveryAgentPolicy;
static ADMIN_POLICY: AdminPolicy = AdminPolicy;

/// Returns the policy governing `role`.
#[must_use]
pub fn policy_for(role: Role) -> &'static dyn TransitionPolicy {
    match role {
        Role::Client => &CLIENT_POLICY,
        Role::DeliveryAgent => &DELIVERY_AGENT_POLICY,
        Role::Admin => &ADMIN_POLICY,
    }
}

/// Checks a requested move against the lifecycle table, then the actor's policy.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if the move is not in the
/// lifecycle, or `DomainError::PermissionDenied` if the actor may not request it.
pub fn authorize_transition(
    order: &Order,
    target: OrderStatus,
    actor: &Actor,
) -> Result<(), DomainError> {
    order.status.validate_transition(target)?;
    policy_for(actor.role).authorize(order, target, actor)
}

/// Whether `actor` may read `order`.
#[must_use]
pub fn can_read(order: &Order, actor: &Actor) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Client => order.client_id == actor.id,
        Role::DeliveryAgent => order.status.is_unclaimed() || order.is_assigned_to(actor.id),
    }
}

/// Checks that `actor` may record an estimated arrival on `order`.
///
/// # Errors
///
/// Returns `DomainError::PermissionDenied` unless the actor is the assigned
/// agent or an administrator.
pub fn authorize_estimated_arrival(order: &Order, actor: &Actor) -> Result<(), DomainError> {
    if actor.role == Role::Admin || order.is_assigned_to(actor.id) {
        Ok(())
    } else {
        Err(DomainError::PermissionDenied {
            role: actor.role,
            reason: String::from("only the assigned agent or an administrator may set the ETA"),
        })
    }
}

/// Checks that `actor` may search for nearby unclaimed orders.
///
/// # Errors
///
/// Returns `DomainError::PermissionDenied` for clients.
pub fn authorize_proximity_search(actor: &Actor) -> Result<(), DomainError> {
    match actor.role {
        Role::DeliveryAgent | Role::Admin => Ok(()),
        Role::Client => Err(DomainError::PermissionDenied {
            role: actor.role,
            reason: String::from("clients may not search for nearby orders"),
        }),
    }
}
