// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::role::Role;
use crate::status::OrderStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A caller-supplied identifier could not be parsed.
    InvalidIdentifier {
        /// The kind of identifier (e.g. `order_id`).
        kind: &'static str,
        /// The rejected raw value.
        value: String,
    },
    /// An order status name is not recognized.
    InvalidStatus(String),
    /// A role name is not recognized.
    InvalidRole(String),
    /// The transition is not part of the order lifecycle.
    InvalidTransition {
        /// The current status.
        from: OrderStatus,
        /// The requested status.
        to: OrderStatus,
    },
    /// The transition is structurally legal but this actor may not request it.
    PermissionDenied {
        /// The role of the requesting actor.
        role: Role,
        /// Why the request was denied.
        reason: String,
    },
    /// An order must contain at least one item.
    EmptyOrder,
    /// A line item quantity is zero, negative, or out of range.
    InvalidQuantity {
        /// The raw product identifier of the item.
        product_id: i64,
        /// The rejected quantity.
        quantity: i64,
    },
    /// Latitude or longitude is out of range or not finite.
    InvalidCoordinates {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },
    /// A search radius is not a positive finite number.
    InvalidRadius(f64),
    /// The delivery address is empty.
    InvalidAddress(String),
    /// A monetary computation overflowed.
    AmountOverflow,
    /// A timezone name is not a known IANA timezone.
    InvalidTimezone(String),
    /// A business-hours time of day could not be parsed.
    InvalidBusinessHours(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier { kind, value } => {
                write!(f, "Invalid {kind}: '{value}' is not a valid identifier")
            }
            Self::InvalidStatus(status) => write!(f, "Invalid order status: '{status}'"),
            Self::InvalidRole(role) => write!(f, "Invalid role: '{role}'"),
            Self::InvalidTransition { from, to } => {
                write!(
                    f,
                    "Order cannot move from {} to {}",
                    from.as_str(),
                    to.as_str()
                )
            }
            Self::PermissionDenied { role, reason } => {
                write!(f, "Role {} may not perform this action: {reason}", role.as_str())
            }
            Self::EmptyOrder => write!(f, "An order must contain at least one item"),
            Self::InvalidQuantity {
                product_id,
                quantity,
            } => {
                write!(
                    f,
                    "Invalid quantity {quantity} for product {product_id}. Must be greater than 0"
                )
            }
            Self::InvalidCoordinates {
                latitude,
                longitude,
            } => {
                write!(f, "Invalid coordinates ({latitude}, {longitude})")
            }
            Self::InvalidRadius(radius) => {
                write!(f, "Invalid radius {radius}. Must be a positive number of kilometres")
            }
            Self::InvalidAddress(msg) => write!(f, "Invalid address: {msg}"),
            Self::AmountOverflow => write!(f, "Order amount is too large"),
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: '{tz}'"),
            Self::InvalidBusinessHours(msg) => write!(f, "Invalid business hours: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
