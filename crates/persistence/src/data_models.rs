// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reparto_domain::{Money, OrderId, OrderStatus, ProductId, Role, UserId};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::error::PersistenceError;

/// A stored identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

/// A stored session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: UserId,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductData {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub is_active: bool,
    pub stock: i64,
}

/// One accepted status change of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHistoryEntry {
    pub history_id: i64,
    pub order_id: OrderId,
    /// `None` for the row recorded at creation.
    pub previous_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub changed_by: UserId,
    pub changed_at: OffsetDateTime,
}

/// Formats an instant as UTC RFC 3339 for storage.
pub(crate) fn format_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored RFC 3339 timestamp.
pub(crate) fn parse_timestamp(
    table: &'static str,
    value: &str,
) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::corrupt(table, format!("timestamp '{value}': {e}")))
}

pub(crate) fn parse_optional_timestamp(
    table: &'static str,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(|v| parse_timestamp(table, v)).transpose()
}

pub(crate) fn parse_status(
    table: &'static str,
    value: &str,
) -> Result<OrderStatus, PersistenceError> {
    value
        .parse()
        .map_err(|e| PersistenceError::corrupt(table, e))
}
