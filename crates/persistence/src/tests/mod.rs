// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod order_tests;

use crate::Persistence;
use reparto_domain::{
    GeoPoint, ItemRequest, Money, NewOrder, OrderDraft, OrderId, OrderStatus, PricedItem,
    ProductId, Role, UserId,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);

pub fn persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn user(persistence: &mut Persistence, role: Role) -> UserId {
    persistence.create_user("Test User", role, NOW).unwrap()
}

/// Builds a draft for `(product, quantity, unit price cents)` lines at `location`.
pub fn draft(client: UserId, location: GeoPoint, lines: &[(ProductId, u32, i64)]) -> OrderDraft {
    let requests: Vec<ItemRequest> = lines
        .iter()
        .map(|(product, quantity, _)| ItemRequest {
            product_id: *product,
            quantity: *quantity,
        })
        .collect();
    let priced: Vec<PricedItem> = lines
        .iter()
        .map(|(product, quantity, cents)| PricedItem {
            product_id: *product,
            quantity: *quantity,
            unit_price: Money::from_cents(*cents),
        })
        .collect();
    let request = NewOrder::new(requests, location, "Florida 100", Some("cash")).unwrap();
    OrderDraft::new(client, request, priced).unwrap()
}

/// Persists an order directly, bypassing stock, and records its creation.
pub fn insert_order(
    persistence: &mut Persistence,
    client: UserId,
    location: GeoPoint,
    status: OrderStatus,
) -> OrderId {
    let product = persistence
        .create_product("Empanada", Money::from_cents(450), 100)
        .unwrap();
    let draft = draft(client, location, &[(product, 2, 450)]);
    persistence
        .transaction(|tx| -> Result<OrderId, crate::PersistenceError> {
            let id = tx.insert_order(&draft, status, NOW)?;
            tx.append_history(id, None, status, client, NOW)?;
            Ok(id)
        })
        .unwrap()
}

pub fn buenos_aires() -> GeoPoint {
    GeoPoint::new(-34.6037, -58.3816).unwrap()
}
