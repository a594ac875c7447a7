// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use reparto_domain::{OrderDraft, OrderId, OrderStatus, UserId};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::{order_items, order_status_history, orders};
use crate::error::PersistenceError;

/// Inserts an order and its line items. Stock and history are the caller's job.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn insert_order(
    conn: &mut SqliteConnection,
    draft: &OrderDraft,
    status: OrderStatus,
    created_at: OffsetDateTime,
) -> Result<OrderId, PersistenceError> {
    let location = draft.location();

    diesel::insert_into(orders::table)
        .values((
            orders::client_id.eq(draft.client_id().value()),
            orders::status.eq(status.as_str()),
            orders::latitude.eq(location.latitude),
            orders::longitude.eq(location.longitude),
            orders::address.eq(draft.address()),
            orders::payment_note.eq(draft.payment_note()),
            orders::created_at.eq(format_timestamp(created_at)?),
        ))
        .execute(conn)?;

    let order_id: i64 = get_last_insert_rowid(conn)?;

    for item in draft.items() {
        diesel::insert_into(order_items::table)
            .values((
                order_items::order_id.eq(order_id),
                order_items::product_id.eq(item.product_id.value()),
                order_items::quantity.eq(i64::from(item.quantity)),
                order_items::unit_price_cents.eq(item.unit_price.cents()),
            ))
            .execute(conn)?;
    }

    info!(
        order_id,
        client_id = draft.client_id().value(),
        items = draft.items().len(),
        status = status.as_str(),
        "Inserted order"
    );
    Ok(OrderId::new(order_id))
}

/// Appends a status history row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_history(
    conn: &mut SqliteConnection,
    order_id: OrderId,
    previous_status: Option<OrderStatus>,
    new_status: OrderStatus,
    changed_by: UserId,
    changed_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    diesel::insert_into(order_status_history::table)
        .values((
            order_status_history::order_id.eq(order_id.value()),
            order_status_history::previous_status.eq(previous_status.map(|s| s.as_str())),
            order_status_history::new_status.eq(new_status.as_str()),
            order_status_history::changed_by.eq(changed_by.value()),
            order_status_history::changed_at.eq(format_timestamp(changed_at)?),
        ))
        .execute(conn)?;
    Ok(())
}

/// Moves an order from `from` to `to`, stamping the matching timestamp.
///
/// Returns `false` if the order was no longer in `from`. Assignment names an
/// agent and goes through [`assign_repartidor`] instead.
///
/// # Errors
///
/// Returns an error if the update fails or `to` is `Assigned`.
pub fn transition_status(
    conn: &mut SqliteConnection,
    order_id: OrderId,
    from: OrderStatus,
    to: OrderStatus,
    at: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    let stamp: String = format_timestamp(at)?;
    let target = orders::table
        .filter(orders::order_id.eq(order_id.value()))
        .filter(orders::status.eq(from.as_str()));

    let updated: usize = match to {
        OrderStatus::Confirmed => diesel::update(target)
            .set((
                orders::status.eq(to.as_str()),
                orders::confirmed_at.eq(stamp.as_str()),
            ))
            .execute(conn)?,
        OrderStatus::Delivered => diesel::update(target)
            .set((
                orders::status.eq(to.as_str()),
                orders::delivered_at.eq(stamp.as_str()),
            ))
            .execute(conn)?,
        OrderStatus::Cancelled => diesel::update(target)
            .set((
                orders::status.eq(to.as_str()),
                orders::cancelled_at.eq(stamp.as_str()),
            ))
            .execute(conn)?,
        OrderStatus::Assigned => {
            return Err(PersistenceError::QueryFailed(String::from(
                "assignment must name a delivery agent",
            )));
        }
        OrderStatus::Pending | OrderStatus::PendingOutOfHours | OrderStatus::InTransit => {
            diesel::update(target)
                .set(orders::status.eq(to.as_str()))
                .execute(conn)?
        }
    };

    debug!(
        order_id = order_id.value(),
        from = from.as_str(),
        to = to.as_str(),
        applied = updated == 1,
        "Status transition"
    );
    Ok(updated == 1)
}

/// Assigns a delivery agent to a confirmed, unassigned order.
///
/// Returns `false` if the order was not confirmed or already had an agent,
/// which is how concurrent assignments lose.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn assign_repartidor(
    conn: &mut SqliteConnection,
    order_id: OrderId,
    repartidor_id: UserId,
    at: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(orders::table)
        .filter(orders::order_id.eq(order_id.value()))
        .filter(orders::status.eq(OrderStatus::Confirmed.as_str()))
        .filter(orders::repartidor_id.is_null())
        .set((
            orders::status.eq(OrderStatus::Assigned.as_str()),
            orders::repartidor_id.eq(repartidor_id.value()),
            orders::assigned_at.eq(format_timestamp(at)?),
        ))
        .execute(conn)?;

    debug!(
        order_id = order_id.value(),
        repartidor_id = repartidor_id.value(),
        applied = updated == 1,
        "Assignment"
    );
    Ok(updated == 1)
}

/// Records an estimated arrival on an order that is assigned or in transit.
///
/// Returns `false` if the order has left those states.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_estimated_arrival(
    conn: &mut SqliteConnection,
    order_id: OrderId,
    estimated_arrival: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    let active: [&str; 2] = [
        OrderStatus::Assigned.as_str(),
        OrderStatus::InTransit.as_str(),
    ];
    let updated: usize = diesel::update(orders::table)
        .filter(orders::order_id.eq(order_id.value()))
        .filter(orders::status.eq_any(active))
        .set(orders::estimated_arrival.eq(format_timestamp(estimated_arrival)?))
        .execute(conn)?;
    Ok(updated == 1)
}
