// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification events and their audiences.
//!
//! Events describe facts that already happened. They are informational,
//! never retried, and dropped when nobody matching the audience is connected.

use reparto_domain::{OrderId, OrderStatus, Role, UserId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An event pushed to live connections, serialized as JSON tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// Sent once when a connection is accepted.
    Connected {
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
    },
    /// A client placed an order.
    OrderCreated {
        order_id: OrderId,
        status: OrderStatus,
        total_cents: i64,
    },
    /// An order moved to a new status.
    StatusChanged {
        order_id: OrderId,
        previous: OrderStatus,
        status: OrderStatus,
    },
    /// A delivery agent was assigned to an order.
    RepartidorAssigned {
        order_id: OrderId,
        repartidor_id: UserId,
    },
    /// The expected arrival time of an order was recorded.
    EstimatedArrivalSet {
        order_id: OrderId,
        #[serde(with = "time::serde::rfc3339")]
        estimated_arrival: OffsetDateTime,
    },
}

impl NotificationEvent {
    /// The wire tag of this event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::OrderCreated { .. } => "order_created",
            Self::StatusChanged { .. } => "status_changed",
            Self::RepartidorAssigned { .. } => "repartidor_assigned",
            Self::EstimatedArrivalSet { .. } => "estimated_arrival_set",
        }
    }

    /// The order this event concerns, if any.
    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Connected { .. } => None,
            Self::OrderCreated { order_id, .. }
            | Self::StatusChanged { order_id, .. }
            | Self::RepartidorAssigned { order_id, .. }
            | Self::EstimatedArrivalSet { order_id, .. } => Some(*order_id),
        }
    }
}

/// Who should receive a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Every connection of one identity.
    User(UserId),
    /// Every connection acting under one role.
    Role(Role),
    /// Every connection.
    All,
}

/// An event addressed to an audience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub audience: Audience,
    pub event: NotificationEvent,
}

impl Notification {
    /// Addresses `event` to one identity.
    #[must_use]
    pub const fn to_user(user_id: UserId, event: NotificationEvent) -> Self {
        Self {
            audience: Audience::User(user_id),
            event,
        }
    }

    /// Addresses `event` to a role group.
    #[must_use]
    pub const fn to_role(role: Role, event: NotificationEvent) -> Self {
        Self {
            audience: Audience::Role(role),
            event,
        }
    }

    /// Addresses `event` to every connection.
    #[must_use]
    pub const fn to_all(event: NotificationEvent) -> Self {
        Self {
            audience: Audience::All,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_events_are_tagged_by_type() {
        let event = NotificationEvent::StatusChanged {
            order_id: OrderId::new(4),
            previous: OrderStatus::Pending,
            status: OrderStatus::Confirmed,
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["order_id"], 4);
        assert_eq!(json["previous"], "pending");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["type"], event.kind());
    }

    #[test]
    fn test_timestamps_are_rfc3339() {
        let event = NotificationEvent::EstimatedArrivalSet {
            order_id: OrderId::new(9),
            estimated_arrival: datetime!(2026-03-02 12:30 UTC),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["estimated_arrival"], "2026-03-02T12:30:00Z");
        let back: NotificationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_order_id_accessor() {
        let connected = NotificationEvent::Connected {
            timestamp: datetime!(2026-03-02 12:00 UTC),
        };
        assert_eq!(connected.order_id(), None);
        let assigned = NotificationEvent::RepartidorAssigned {
            order_id: OrderId::new(2),
            repartidor_id: UserId::new(8),
        };
        assert_eq!(assigned.order_id(), Some(OrderId::new(2)));
    }
}
