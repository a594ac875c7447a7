// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use crate::{GeoPoint, LineItem, Money, Order, OrderId, OrderStatus, ProductId, UserId};
use time::OffsetDateTime;
use time::macros::datetime;

pub const CLIENT: UserId = UserId::new(1);
pub const OTHER_CLIENT: UserId = UserId::new(2);
pub const AGENT: UserId = UserId::new(10);
pub const OTHER_AGENT: UserId = UserId::new(11);
pub const ADMIN: UserId = UserId::new(100);

const CREATED: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);

/// Builds an order owned by `CLIENT` that is consistent with `status`.
pub fn order_in(status: OrderStatus) -> Order {
    let mut order = Order {
        id: OrderId::new(7),
        client_id: CLIENT,
        status,
        location: GeoPoint::new(-34.6037, -58.3816).unwrap(),
        address: String::from("Florida 100"),
        payment_note: Some(String::from("cash")),
        items: vec![LineItem {
            line_item_id: 1,
            order_id: OrderId::new(7),
            product_id: ProductId::new(3),
            quantity: 1,
            unit_price: Money::from_cents(1000),
        }],
        repartidor_id: None,
        created_at: CREATED,
        confirmed_at: None,
        assigned_at: None,
        estimated_arrival: None,
        delivered_at: None,
        cancelled_at: None,
    };
    let later = CREATED + time::Duration::minutes(5);
    if matches!(
        status,
        OrderStatus::Confirmed
            | OrderStatus::Assigned
            | OrderStatus::InTransit
            | OrderStatus::Delivered
    ) {
        order.confirmed_at = Some(later);
    }
    if status.requires_agent() {
        order.repartidor_id = Some(AGENT);
        order.assigned_at = Some(later);
    }
    if status == OrderStatus::Delivered {
        order.delivered_at = Some(later);
    }
    if status == OrderStatus::Cancelled {
        order.cancelled_at = Some(later);
    }
    order
}
