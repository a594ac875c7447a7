// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reparto_domain::{ItemRequest, Money, NewOrder, OrderStatus, ProductId, Role};
use reparto_live::{Audience, NotificationEvent};

use super::{CLOSED, Harness, buenos_aires, kinds, new_order};
use crate::LifecycleError;

#[test]
fn test_order_inside_hours_starts_pending_with_exact_total() {
    let mut h = Harness::new();
    let stew = h.product(4_550, 10);
    let flan = h.product(1_000, 10);

    let order = h.place(&[(stew, 3), (flan, 1)]);

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total(), Money::from_cents(14_650));
    assert_eq!(order.total().to_string(), "146.50");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].unit_price, Money::from_cents(4_550));
    assert_eq!(order.client_id, h.client.id);
    assert!(order.lifecycle_violation().is_none());
}

#[test]
fn test_order_outside_hours_starts_pending_out_of_hours() {
    let mut h = Harness::new();
    h.clock.set(CLOSED);
    let stew = h.product(4_550, 10);
    let flan = h.product(1_000, 10);

    let order = h.place(&[(stew, 3), (flan, 1)]);

    assert_eq!(order.status, OrderStatus::PendingOutOfHours);
    assert_eq!(order.total(), Money::from_cents(14_650));
    assert_eq!(order.created_at, CLOSED);
}

#[test]
fn test_fractional_prices_total_exactly() {
    let mut h = Harness::new();
    let product = h.product(2_275, 10);

    let order = h.place(&[(product, 2)]);

    assert_eq!(order.total().to_string(), "45.50");
}

#[test]
fn test_totals_for_one_three_and_fifty_items() {
    let mut h = Harness::new();

    let single = h.product(999, 100);
    assert_eq!(h.place(&[(single, 1)]).total(), Money::from_cents(999));

    let three: Vec<(ProductId, u32)> = (1..=3).map(|i| (h.product(i * 100 + 5, 10), 1)).collect();
    assert_eq!(h.place(&three).total(), Money::from_cents(105 + 205 + 305));

    let fifty: Vec<(ProductId, u32)> = (1..=50).map(|i| (h.product(i, 10), 2)).collect();
    let expected: i64 = (1..=50).map(|i| i * 2).sum();
    let order = h.place(&fifty);
    assert_eq!(order.items.len(), 50);
    assert_eq!(order.total(), Money::from_cents(expected));
}

#[test]
fn test_creation_takes_stock_and_records_history() {
    let mut h = Harness::new();
    let product = h.product(500, 7);

    let order = h.place(&[(product, 3)]);

    assert_eq!(h.stock(product), 4);
    let history = h.persistence.order_history(order.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].previous_status, None);
    assert_eq!(history[0].new_status, OrderStatus::Pending);
    assert_eq!(history[0].changed_by, h.client.id);
}

#[test]
fn test_creation_notifies_staff_groups_and_client() {
    let mut h = Harness::new();
    let product = h.product(500, 7);
    let order = h.place(&[(product, 1)]);

    let events = h.events();
    assert_eq!(kinds(&events), vec!["order_created"; 3]);
    let audiences: Vec<Audience> = events.iter().map(|n| n.audience).collect();
    assert!(audiences.contains(&Audience::Role(Role::Admin)));
    assert!(audiences.contains(&Audience::Role(Role::DeliveryAgent)));
    assert!(audiences.contains(&Audience::User(h.client.id)));
    assert_eq!(
        events[0].event,
        NotificationEvent::OrderCreated {
            order_id: order.id,
            status: OrderStatus::Pending,
            total_cents: 500,
        }
    );
}

#[test]
fn test_insufficient_stock_leaves_nothing_behind() {
    let mut h = Harness::new();
    let plenty = h.product(500, 10);
    let scarce = h.product(700, 1);

    let request = new_order(&[(plenty, 2), (scarce, 5)], buenos_aires());
    let client = h.client;
    let err = h
        .service
        .create_order(&mut h.persistence, &client, request)
        .unwrap_err();

    assert!(matches!(err, LifecycleError::Validation { field: "items", .. }));
    assert_eq!(h.stock(plenty), 10);
    assert_eq!(h.stock(scarce), 1);
    assert!(h.service.list_orders(&mut h.persistence, &client).unwrap().is_empty());
    assert!(h.events().is_empty());
}

#[test]
fn test_unknown_and_inactive_products_are_rejected() {
    let mut h = Harness::new();
    let client = h.client;

    let request = new_order(&[(ProductId::new(404), 1)], buenos_aires());
    let err = h
        .service
        .create_order(&mut h.persistence, &client, request)
        .unwrap_err();
    assert_eq!(err.kind(), "validation");

    let retired = h.product(300, 10);
    h.persistence.set_product_active(retired, false).unwrap();
    let request = new_order(&[(retired, 1)], buenos_aires());
    let err = h
        .service
        .create_order(&mut h.persistence, &client, request)
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert_eq!(h.stock(retired), 10);
}

#[test]
fn test_only_clients_place_orders() {
    let mut h = Harness::new();
    let product = h.product(300, 10);

    for actor in [h.agent, h.admin] {
        let request = new_order(&[(product, 1)], buenos_aires());
        let err = h
            .service
            .create_order(&mut h.persistence, &actor, request)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden { .. }));
    }
    assert_eq!(h.stock(product), 10);
}

#[test]
fn test_structural_validation_happens_before_the_service() {
    assert!(NewOrder::new(Vec::new(), buenos_aires(), "Somewhere", None).is_err());
    assert!(ItemRequest::new(1, 0).is_err());
    assert!(ItemRequest::new(1, -3).is_err());
    let item = ItemRequest::new(1, 1).unwrap();
    assert!(NewOrder::new(vec![item], buenos_aires(), "   ", None).is_err());
}
