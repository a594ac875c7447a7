// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The order aggregate and its line items.
//!
//! ## Invariants
//!
//! - An order has at least one line item, every quantity is positive
//! - Unit prices are snapshotted into line items at creation
//! - The total is derived from the line items and never stored separately
//! - Exactly the timestamps of states already passed through are set
//! - An agent is assigned iff the status is assigned, in transit or delivered

use crate::error::DomainError;
use crate::geo::GeoPoint;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use crate::status::OrderStatus;
use time::OffsetDateTime;

/// A product and quantity requested by a client, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRequest {
    /// The requested product.
    pub product_id: ProductId,
    /// The requested quantity, always positive.
    pub quantity: u32,
}

impl ItemRequest {
    /// Validates a raw item request.
    ///
    /// # Errors
    ///
    /// Returns an error if the product id is malformed or the quantity is
    /// not a positive 32-bit value.
    pub fn new(product_id: i64, quantity: i64) -> Result<Self, DomainError> {
        let product: ProductId = ProductId::try_from(product_id)?;
        let qty: u32 = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(DomainError::InvalidQuantity {
                product_id,
                quantity,
            })?;
        Ok(Self {
            product_id: product,
            quantity: qty,
        })
    }
}

/// A validated request to place an order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Requested items in display order.
    pub items: Vec<ItemRequest>,
    /// Delivery location.
    pub location: GeoPoint,
    /// Free-text delivery address.
    pub address: String,
    /// Optional free-text payment note.
    pub payment_note: Option<String>,
}

impl NewOrder {
    /// Validates the structural parts of an order request.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no items or the address is blank.
    pub fn new(
        items: Vec<ItemRequest>,
        location: GeoPoint,
        address: &str,
        payment_note: Option<&str>,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let address = address.trim();
        if address.is_empty() {
            return Err(DomainError::InvalidAddress(String::from(
                "address cannot be empty",
            )));
        }
        let payment_note = payment_note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            items,
            location,
            address: address.to_string(),
            payment_note,
        })
    }
}

/// A line item whose product has been resolved and whose price is snapshotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedItem {
    /// The resolved product.
    pub product_id: ProductId,
    /// The ordered quantity.
    pub quantity: u32,
    /// Unit price at creation time.
    pub unit_price: Money,
}

impl PricedItem {
    /// Quantity times unit price.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` on overflow.
    pub fn subtotal(&self) -> Result<Money, DomainError> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// An order ready to be persisted: every item resolved and priced.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    client_id: UserId,
    request: NewOrder,
    items: Vec<PricedItem>,
    total: Money,
}

impl OrderDraft {
    /// Builds a draft from a request and its resolved items.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no items or the total overflows.
    pub fn new(
        client_id: UserId,
        request: NewOrder,
        items: Vec<PricedItem>,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let total = items
            .iter()
            .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.subtotal()?))?;
        Ok(Self {
            client_id,
            request,
            items,
            total,
        })
    }

    /// The owning client.
    #[must_use]
    pub const fn client_id(&self) -> UserId {
        self.client_id
    }

    /// Delivery location.
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        self.request.location
    }

    /// Delivery address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.request.address
    }

    /// Payment note, if any.
    #[must_use]
    pub fn payment_note(&self) -> Option<&str> {
        self.request.payment_note.as_deref()
    }

    /// Priced items in display order.
    #[must_use]
    pub fn items(&self) -> &[PricedItem] {
        &self.items
    }

    /// Sum of all subtotals.
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }
}

/// A persisted line item. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    /// Storage identity.
    pub line_item_id: i64,
    /// The owning order.
    pub order_id: OrderId,
    /// The referenced product.
    pub product_id: ProductId,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit price snapshot.
    pub unit_price: Money,
}

impl LineItem {
    /// Quantity times unit price.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` on overflow.
    pub fn checked_subtotal(&self) -> Result<Money, DomainError> {
        self.unit_price.checked_mul(self.quantity)
    }

    /// Quantity times unit price, saturating on overflow.
    ///
    /// Drafting and loading both reject orders whose amounts overflow, so
    /// the saturation is never observed on a stored order.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.checked_subtotal()
            .unwrap_or(Money::from_cents(i64::MAX))
    }
}

/// The order aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub client_id: UserId,
    pub status: OrderStatus,
    pub location: GeoPoint,
    pub address: String,
    pub payment_note: Option<String>,
    pub items: Vec<LineItem>,
    pub repartidor_id: Option<UserId>,
    pub created_at: OffsetDateTime,
    pub confirmed_at: Option<OffsetDateTime>,
    pub assigned_at: Option<OffsetDateTime>,
    pub estimated_arrival: Option<OffsetDateTime>,
    pub delivered_at: Option<OffsetDateTime>,
    pub cancelled_at: Option<OffsetDateTime>,
}

impl Order {
    /// Sum of every line item's subtotal.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` if any subtotal or the sum
    /// overflows.
    pub fn checked_total(&self) -> Result<Money, DomainError> {
        self.items.iter().try_fold(Money::ZERO, |acc, item| {
            acc.checked_add(item.checked_subtotal()?)
        })
    }

    /// Sum of every line item's subtotal, saturating on overflow.
    ///
    /// See [`checked_total`](Self::checked_total); stored orders never
    /// saturate.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().fold(Money::ZERO, |acc, item| {
            acc.checked_add(item.subtotal())
                .unwrap_or(Money::from_cents(i64::MAX))
        })
    }

    /// Whether `user` is the order's assigned agent.
    #[must_use]
    pub fn is_assigned_to(&self, user: UserId) -> bool {
        self.repartidor_id == Some(user)
    }

    /// Moves the order to `target` and stamps the matching timestamp.
    ///
    /// Assignment needs an agent and goes through [`Order::assign`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the lifecycle forbids the
    /// move or the target is `Assigned`.
    pub fn advance(&mut self, target: OrderStatus, at: OffsetDateTime) -> Result<(), DomainError> {
        self.status.validate_transition(target)?;
        if target == OrderStatus::Assigned {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        match target {
            OrderStatus::Confirmed => self.confirmed_at = Some(at),
            OrderStatus::Delivered => self.delivered_at = Some(at),
            OrderStatus::Cancelled => self.cancelled_at = Some(at),
            OrderStatus::Pending
            | OrderStatus::PendingOutOfHours
            | OrderStatus::Assigned
            | OrderStatus::InTransit => {}
        }
        Ok(())
    }

    /// Assigns a delivery agent, moving the order to `Assigned`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the order is confirmed.
    pub fn assign(&mut self, agent: UserId, at: OffsetDateTime) -> Result<(), DomainError> {
        self.status.validate_transition(OrderStatus::Assigned)?;
        self.status = OrderStatus::Assigned;
        self.repartidor_id = Some(agent);
        self.assigned_at = Some(at);
        Ok(())
    }

    /// Checks the lifecycle invariants of the aggregate.
    ///
    /// Returns a description of the first violation found.
    #[must_use]
    pub fn lifecycle_violation(&self) -> Option<String> {
        if self.status.requires_agent() != self.repartidor_id.is_some() {
            return Some(format!(
                "agent presence does not match status {}",
                self.status
            ));
        }

        let passed_confirmation = matches!(
            self.status,
            OrderStatus::Confirmed
                | OrderStatus::Assigned
                | OrderStatus::InTransit
                | OrderStatus::Delivered
        );
        let expected = [
            ("confirmed_at", self.confirmed_at, passed_confirmation),
            ("assigned_at", self.assigned_at, self.status.requires_agent()),
            (
                "delivered_at",
                self.delivered_at,
                self.status == OrderStatus::Delivered,
            ),
        ];
        for (name, stamp, required) in expected {
            if stamp.is_some() != required {
                return Some(format!("{name} does not match status {}", self.status));
            }
        }
        if self.cancelled_at.is_some() != (self.status == OrderStatus::Cancelled) {
            return Some(format!("cancelled_at does not match status {}", self.status));
        }

        let ordered = [
            Some(self.created_at),
            self.confirmed_at,
            self.assigned_at,
            self.delivered_at,
        ];
        let mut last: Option<OffsetDateTime> = None;
        for stamp in ordered.into_iter().flatten() {
            if last.is_some_and(|prev| stamp < prev) {
                return Some(String::from("lifecycle timestamps are not monotonic"));
            }
            last = Some(stamp);
        }
        None
    }
}
