// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response shapes of the order API.
//!
//! Requests carry raw caller values; each one converts into validated domain
//! values before the lifecycle sees it. Responses are plain serializable
//! snapshots of domain state.

use reparto_domain::{
    GeoPoint, ItemRequest, LineItem, NewOrder, Order, OrderId, OrderStatus, ProductId, UserId,
};
use reparto_persistence::StatusHistoryEntry;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::LifecycleError;
use crate::lifecycle::NearbyOrder;

/// Request fields that failed to parse before reaching the domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// A timestamp was not RFC 3339.
    #[error("'{value}' is not an RFC 3339 timestamp")]
    InvalidTimestamp {
        /// The field holding the timestamp.
        field: &'static str,
        /// The rejected text.
        value: String,
    },
    /// A required parameter was absent.
    #[error("parameter '{name}' is required")]
    MissingParameter {
        /// The missing parameter.
        name: &'static str,
    },
}

impl RequestError {
    /// The request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidTimestamp { field, .. } => field,
            Self::MissingParameter { name } => name,
        }
    }
}

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// Request to place an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    #[serde(default)]
    pub payment_note: Option<String>,
}

impl CreateOrderRequest {
    /// Validates the request into a new-order command.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty item lists, bad quantities or
    /// identifiers, out-of-range coordinates, or a blank address.
    pub fn into_command(self) -> Result<NewOrder, LifecycleError> {
        let items: Vec<ItemRequest> = self
            .items
            .iter()
            .map(|item| ItemRequest::new(item.product_id, item.quantity))
            .collect::<Result<_, _>>()?;
        let location: GeoPoint = GeoPoint::new(self.latitude, self.longitude)?;
        Ok(NewOrder::new(
            items,
            location,
            &self.address,
            self.payment_note.as_deref(),
        )?)
    }
}

/// Request to move an order to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

impl UpdateStatusRequest {
    /// The requested status.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown status name.
    pub fn target(&self) -> Result<OrderStatus, LifecycleError> {
        Ok(self.status.parse::<OrderStatus>()?)
    }
}

/// Request to assign a delivery agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub repartidor_id: i64,
}

impl AssignRequest {
    /// The named agent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive identifier.
    pub fn agent(&self) -> Result<UserId, LifecycleError> {
        Ok(UserId::try_from(self.repartidor_id)?)
    }
}

/// Request to record an estimated arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtaRequest {
    pub estimated_arrival: String,
}

impl EtaRequest {
    /// The requested arrival instant.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the text is not RFC 3339.
    pub fn instant(&self) -> Result<OffsetDateTime, LifecycleError> {
        OffsetDateTime::parse(self.estimated_arrival.trim(), &Rfc3339).map_err(|_| {
            LifecycleError::from(RequestError::InvalidTimestamp {
                field: "estimated_arrival",
                value: self.estimated_arrival.clone(),
            })
        })
    }
}

/// Query of a proximity search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
}

impl NearbyQuery {
    /// The search centre and radius.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a parameter is missing or the centre is
    /// out of range. The radius itself is checked by the search.
    pub fn parse(&self) -> Result<(GeoPoint, f64), LifecycleError> {
        let lat: f64 = self.lat.ok_or(RequestError::MissingParameter { name: "lat" })?;
        let lon: f64 = self.lon.ok_or(RequestError::MissingParameter { name: "lon" })?;
        let radius_km: f64 = self
            .radius_km
            .ok_or(RequestError::MissingParameter { name: "radius_km" })?;
        Ok((GeoPoint::new(lat, lon)?, radius_km))
    }
}

/// A line item as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemResponse {
    pub line_item_id: i64,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl From<&LineItem> for LineItemResponse {
    fn from(item: &LineItem) -> Self {
        Self {
            line_item_id: item.line_item_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            subtotal_cents: item.subtotal().cents(),
        }
    }
}

/// An order as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub client_id: UserId,
    pub status: OrderStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub payment_note: Option<String>,
    pub repartidor_id: Option<UserId>,
    pub items: Vec<LineItemResponse>,
    pub total_cents: i64,
    /// The total formatted with two decimals.
    pub total: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub confirmed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub assigned_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub estimated_arrival: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub delivered_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub cancelled_at: Option<OffsetDateTime>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let total = order.total();
        Self {
            order_id: order.id,
            client_id: order.client_id,
            status: order.status,
            latitude: order.location.latitude,
            longitude: order.location.longitude,
            address: order.address.clone(),
            payment_note: order.payment_note.clone(),
            repartidor_id: order.repartidor_id,
            items: order.items.iter().map(LineItemResponse::from).collect(),
            total_cents: total.cents(),
            total: total.to_string(),
            created_at: order.created_at,
            confirmed_at: order.confirmed_at,
            assigned_at: order.assigned_at,
            estimated_arrival: order.estimated_arrival,
            delivered_at: order.delivered_at,
            cancelled_at: order.cancelled_at,
        }
    }
}

/// A proximity search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyOrderResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub distance_km: f64,
}

impl From<&NearbyOrder> for NearbyOrderResponse {
    fn from(hit: &NearbyOrder) -> Self {
        Self {
            order: OrderResponse::from(&hit.order),
            distance_km: hit.distance_km,
        }
    }
}

/// One status history row as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub previous_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub changed_by: UserId,
    #[serde(with = "time::serde::rfc3339")]
    pub changed_at: OffsetDateTime,
}

impl From<&StatusHistoryEntry> for HistoryResponse {
    fn from(entry: &StatusHistoryEntry) -> Self {
        Self {
            previous_status: entry.previous_status,
            new_status: entry.new_status,
            changed_by: entry.changed_by,
            changed_at: entry.changed_at,
        }
    }
}
