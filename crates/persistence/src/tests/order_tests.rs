// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{NOW, buenos_aires, insert_order, persistence, user};
use crate::OrderScope;
use reparto_domain::{GeoPoint, Money, OrderId, OrderStatus, Role};

#[test]
fn test_order_round_trip_with_items() {
    let mut persistence = persistence();
    let client = user(&mut persistence, Role::Client);
    let id = insert_order(&mut persistence, client, buenos_aires(), OrderStatus::Pending);

    let order = persistence.get_order(id).unwrap().unwrap();
    assert_eq!(order.client_id, client);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.address, "Florida 100");
    assert_eq!(order.payment_note.as_deref(), Some("cash"));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.total(), Money::from_cents(900));
    assert_eq!(order.created_at, NOW);
    assert_eq!(order.repartidor_id, None);
    assert_eq!(order.lifecycle_violation(), None);
}

#[test]
fn test_missing_order_is_none() {
    let mut persistence = persistence();
    assert!(persistence.get_order(OrderId::new(5)).unwrap().is_none());
}

#[test]
fn test_list_orders_by_scope_newest_first() {
    let mut persistence = persistence();
    let alice = user(&mut persistence, Role::Client);
    let bob = user(&mut persistence, Role::Client);
    let first = insert_order(&mut persistence, alice, buenos_aires(), OrderStatus::Pending);
    let second = insert_order(&mut persistence, bob, buenos_aires(), OrderStatus::Pending);
    let third = insert_order(&mut persistence, alice, buenos_aires(), OrderStatus::Pending);

    let all: Vec<OrderId> = persistence
        .list_orders(OrderScope::All)
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(all, vec![third, second, first]);

    let alices: Vec<OrderId> = persistence
        .list_orders(OrderScope::Client(alice))
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(alices, vec![third, first]);
}

#[test]
fn test_list_orders_for_repartidor() {
    let mut persistence = persistence();
    let client = user(&mut persistence, Role::Client);
    let agent = user(&mut persistence, Role::DeliveryAgent);
    let id = insert_order(&mut persistence, client, buenos_aires(), OrderStatus::Confirmed);
    insert_order(&mut persistence, client, buenos_aires(), OrderStatus::Confirmed);

    assert!(
        persistence
            .list_orders(OrderScope::Repartidor(agent))
            .unwrap()
            .is_empty()
    );
    persistence
        .transaction(|tx| tx.assign_repartidor(id, agent, NOW))
        .unwrap();

    let assigned = persistence
        .list_orders(OrderScope::Repartidor(agent))
        .unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id, id);
}

#[test]
fn test_latitude_band_only_returns_unclaimed_orders() {
    let mut persistence = persistence();
    let client = user(&mut persistence, Role::Client);
    let near = insert_order(&mut persistence, client, buenos_aires(), OrderStatus::Pending);
    let out_of_hours = insert_order(
        &mut persistence,
        client,
        buenos_aires(),
        OrderStatus::PendingOutOfHours,
    );
    insert_order(&mut persistence, client, buenos_aires(), OrderStatus::Confirmed);
    insert_order(
        &mut persistence,
        client,
        GeoPoint::new(-31.4, -64.18).unwrap(),
        OrderStatus::Pending,
    );

    let (min, max) = buenos_aires().latitude_band(5.0);
    let found: Vec<OrderId> = persistence
        .find_unclaimed_in_latitude_band(min, max)
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(found, vec![near, out_of_hours]);
}

#[test]
fn test_history_is_recorded_in_order() {
    let mut persistence = persistence();
    let client = user(&mut persistence, Role::Client);
    let admin = user(&mut persistence, Role::Admin);
    let id = insert_order(&mut persistence, client, buenos_aires(), OrderStatus::Pending);

    persistence
        .transaction(|tx| -> Result<(), crate::PersistenceError> {
            assert!(tx.transition_status(id, OrderStatus::Pending, OrderStatus::Confirmed, NOW)?);
            tx.append_history(
                id,
                Some(OrderStatus::Pending),
                OrderStatus::Confirmed,
                admin,
                NOW,
            )
        })
        .unwrap();

    let history = persistence.order_history(id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].previous_status, None);
    assert_eq!(history[0].new_status, OrderStatus::Pending);
    assert_eq!(history[0].changed_by, client);
    assert_eq!(history[1].previous_status, Some(OrderStatus::Pending));
    assert_eq!(history[1].new_status, OrderStatus::Confirmed);
    assert_eq!(history[1].changed_by, admin);
}

#[test]
fn test_overflowing_stored_total_is_reported_as_corrupt() {
    use diesel::RunQueryDsl;

    let mut persistence = persistence();
    let client = user(&mut persistence, Role::Client);
    let id = insert_order(&mut persistence, client, buenos_aires(), OrderStatus::Pending);

    diesel::sql_query(format!(
        "UPDATE order_items SET unit_price_cents = {} WHERE order_id = {}",
        i64::MAX,
        id.value()
    ))
    .execute(&mut persistence.conn)
    .unwrap();

    let err = persistence.get_order(id).unwrap_err();
    assert!(matches!(
        err,
        crate::PersistenceError::CorruptRecord { table: "orders", .. }
    ));
}
