// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order queries.
//!
//! Orders are always returned with their line items in insertion order.
//! Items for a batch of orders are fetched with a single `IN` query.

use std::collections::HashMap;

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use reparto_domain::{
    GeoPoint, LineItem, Money, Order, OrderId, OrderStatus, ProductId, UserId,
};
use tracing::debug;

use crate::data_models::{
    StatusHistoryEntry, parse_optional_timestamp, parse_status, parse_timestamp,
};
use crate::diesel_schema::{order_items, order_status_history, orders};
use crate::error::PersistenceError;

/// Which orders a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order.
    All,
    /// Orders placed by this client.
    Client(UserId),
    /// Orders assigned to this agent.
    Repartidor(UserId),
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = orders)]
struct OrderRow {
    order_id: i64,
    client_id: i64,
    status: String,
    latitude: f64,
    longitude: f64,
    address: String,
    payment_note: Option<String>,
    repartidor_id: Option<i64>,
    created_at: String,
    confirmed_at: Option<String>,
    assigned_at: Option<String>,
    estimated_arrival: Option<String>,
    delivered_at: Option<String>,
    cancelled_at: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = order_items)]
struct LineItemRow {
    line_item_id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price_cents: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = order_status_history)]
struct HistoryRow {
    history_id: i64,
    order_id: i64,
    previous_status: Option<String>,
    new_status: String,
    changed_by: i64,
    changed_at: String,
}

fn line_item_from_row(row: LineItemRow) -> Result<LineItem, PersistenceError> {
    let quantity: u32 = u32::try_from(row.quantity).map_err(|_| {
        PersistenceError::corrupt("order_items", format!("quantity {}", row.quantity))
    })?;
    Ok(LineItem {
        line_item_id: row.line_item_id,
        order_id: OrderId::new(row.order_id),
        product_id: ProductId::new(row.product_id),
        quantity,
        unit_price: Money::from_cents(row.unit_price_cents),
    })
}

fn order_from_row(row: OrderRow, items: Vec<LineItem>) -> Result<Order, PersistenceError> {
    const TABLE: &str = "orders";

    let location: GeoPoint = GeoPoint::new(row.latitude, row.longitude)
        .map_err(|e| PersistenceError::corrupt(TABLE, e))?;

    let order = Order {
        id: OrderId::new(row.order_id),
        client_id: UserId::new(row.client_id),
        status: parse_status(TABLE, &row.status)?,
        location,
        address: row.address,
        payment_note: row.payment_note,
        items,
        repartidor_id: row.repartidor_id.map(UserId::new),
        created_at: parse_timestamp(TABLE, &row.created_at)?,
        confirmed_at: parse_optional_timestamp(TABLE, row.confirmed_at.as_deref())?,
        assigned_at: parse_optional_timestamp(TABLE, row.assigned_at.as_deref())?,
        estimated_arrival: parse_optional_timestamp(TABLE, row.estimated_arrival.as_deref())?,
        delivered_at: parse_optional_timestamp(TABLE, row.delivered_at.as_deref())?,
        cancelled_at: parse_optional_timestamp(TABLE, row.cancelled_at.as_deref())?,
    };
    order.checked_total().map_err(|e| {
        PersistenceError::corrupt(TABLE, format!("order {}: {e}", order.id))
    })?;
    Ok(order)
}

/// Attaches line items to a batch of order rows, preserving row order.
fn hydrate(
    conn: &mut SqliteConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, PersistenceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|row| row.order_id).collect();
    let item_rows: Vec<LineItemRow> = order_items::table
        .filter(order_items::order_id.eq_any(ids))
        .order(order_items::line_item_id.asc())
        .select(LineItemRow::as_select())
        .load(conn)?;

    let mut items_by_order: HashMap<i64, Vec<LineItem>> = HashMap::new();
    for item_row in item_rows {
        let item: LineItem = line_item_from_row(item_row)?;
        items_by_order
            .entry(item.order_id.value())
            .or_default()
            .push(item);
    }

    rows.into_iter()
        .map(|row| {
            let items: Vec<LineItem> = items_by_order.remove(&row.order_id).unwrap_or_default();
            order_from_row(row, items)
        })
        .collect()
}

/// Retrieves an order with its line items.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is malformed.
/// Returns `Ok(None)` if the order does not exist.
pub fn get_order(
    conn: &mut SqliteConnection,
    order_id: OrderId,
) -> Result<Option<Order>, PersistenceError> {
    debug!(order_id = order_id.value(), "Loading order");

    let row: Option<OrderRow> = orders::table
        .filter(orders::order_id.eq(order_id.value()))
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };
    Ok(hydrate(conn, vec![row])?.pop())
}

/// Lists orders in `scope`, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is malformed.
pub fn list_orders(
    conn: &mut SqliteConnection,
    scope: OrderScope,
) -> Result<Vec<Order>, PersistenceError> {
    let mut query: orders::BoxedQuery<'_, Sqlite> = orders::table.into_boxed();
    match scope {
        OrderScope::All => {}
        OrderScope::Client(client) => {
            query = query.filter(orders::client_id.eq(client.value()));
        }
        OrderScope::Repartidor(agent) => {
            query = query.filter(orders::repartidor_id.eq(agent.value()));
        }
    }

    let rows: Vec<OrderRow> = query
        .order(orders::order_id.desc())
        .select(OrderRow::as_select())
        .load(conn)?;
    hydrate(conn, rows)
}

/// Unclaimed orders whose latitude lies within `[min_latitude, max_latitude]`.
///
/// This is a coarse prefilter; callers apply the exact distance check.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is malformed.
pub fn find_unclaimed_in_latitude_band(
    conn: &mut SqliteConnection,
    min_latitude: f64,
    max_latitude: f64,
) -> Result<Vec<Order>, PersistenceError> {
    let unclaimed: [&str; 2] = [
        OrderStatus::Pending.as_str(),
        OrderStatus::PendingOutOfHours.as_str(),
    ];

    let rows: Vec<OrderRow> = orders::table
        .filter(orders::status.eq_any(unclaimed))
        .filter(orders::latitude.between(min_latitude, max_latitude))
        .order(orders::order_id.asc())
        .select(OrderRow::as_select())
        .load(conn)?;

    debug!(
        candidates = rows.len(),
        min_latitude, max_latitude, "Latitude band prefilter"
    );
    hydrate(conn, rows)
}

/// The status history of an order, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is malformed.
pub fn order_history(
    conn: &mut SqliteConnection,
    order_id: OrderId,
) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
    const TABLE: &str = "order_status_history";

    let rows: Vec<HistoryRow> = order_status_history::table
        .filter(order_status_history::order_id.eq(order_id.value()))
        .order(order_status_history::history_id.asc())
        .select(HistoryRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| -> Result<StatusHistoryEntry, PersistenceError> {
            Ok(StatusHistoryEntry {
                history_id: row.history_id,
                order_id: OrderId::new(row.order_id),
                previous_status: row
                    .previous_status
                    .as_deref()
                    .map(|s| parse_status(TABLE, s))
                    .transpose()?,
                new_status: parse_status(TABLE, &row.new_status)?,
                changed_by: UserId::new(row.changed_by),
                changed_at: parse_timestamp(TABLE, &row.changed_at)?,
            })
        })
        .collect()
}
