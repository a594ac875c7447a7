// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reparto_domain::{DomainError, OrderStatus, UserId};
use reparto_persistence::PersistenceError;
use time::macros::datetime;

use super::Harness;
use crate::{
    AssignRequest, CreateOrderRequest, EtaRequest, LifecycleError, NearbyQuery, OrderResponse,
    UpdateStatusRequest,
};

#[test]
fn test_create_request_parses_from_json() {
    let request: CreateOrderRequest = serde_json::from_str(
        r#"{
            "items": [{"product_id": 3, "quantity": 2}],
            "latitude": -34.6,
            "longitude": -58.38,
            "address": "  Defensa 500  "
        }"#,
    )
    .unwrap();

    let command = request.into_command().unwrap();
    assert_eq!(command.items.len(), 1);
    assert_eq!(command.items[0].quantity, 2);
    assert_eq!(command.address, "Defensa 500");
    assert_eq!(command.payment_note, None);
}

#[test]
fn test_create_request_rejects_bad_input() {
    let base = CreateOrderRequest {
        items: vec![crate::OrderItemRequest {
            product_id: 1,
            quantity: 1,
        }],
        latitude: 0.0,
        longitude: 0.0,
        address: String::from("Somewhere"),
        payment_note: None,
    };

    let mut empty = base.clone();
    empty.items.clear();
    assert!(matches!(
        empty.into_command(),
        Err(LifecycleError::Validation { field: "items", .. })
    ));

    let mut zero = base.clone();
    zero.items[0].quantity = 0;
    assert!(matches!(
        zero.into_command(),
        Err(LifecycleError::Validation { field: "items", .. })
    ));

    let mut bad_id = base.clone();
    bad_id.items[0].product_id = -4;
    assert!(matches!(
        bad_id.into_command(),
        Err(LifecycleError::Validation { field: "product_id", .. })
    ));

    let mut off_map = base.clone();
    off_map.latitude = 91.0;
    assert!(matches!(
        off_map.into_command(),
        Err(LifecycleError::Validation { field: "location", .. })
    ));

    let mut blank = base;
    blank.address = String::from("   ");
    assert!(matches!(
        blank.into_command(),
        Err(LifecycleError::Validation { field: "address", .. })
    ));
}

#[test]
fn test_status_and_assign_requests() {
    let request = UpdateStatusRequest {
        status: String::from("in_transit"),
    };
    assert_eq!(request.target().unwrap(), OrderStatus::InTransit);

    let request = UpdateStatusRequest {
        status: String::from("lost"),
    };
    assert!(matches!(
        request.target(),
        Err(LifecycleError::Validation { field: "status", .. })
    ));

    assert_eq!(
        AssignRequest { repartidor_id: 7 }.agent().unwrap(),
        UserId::new(7)
    );
    assert!(AssignRequest { repartidor_id: 0 }.agent().is_err());
}

#[test]
fn test_eta_request_parses_rfc3339() {
    let request = EtaRequest {
        estimated_arrival: String::from("2026-03-02T12:45:00-03:00"),
    };
    assert_eq!(request.instant().unwrap(), datetime!(2026-03-02 15:45 UTC));

    let request = EtaRequest {
        estimated_arrival: String::from("in ten minutes"),
    };
    assert!(matches!(
        request.instant(),
        Err(LifecycleError::Validation {
            field: "estimated_arrival",
            ..
        })
    ));
}

#[test]
fn test_nearby_query_requires_every_parameter() {
    let query = NearbyQuery {
        lat: Some(-34.6),
        lon: Some(-58.4),
        radius_km: Some(5.0),
    };
    let (centre, radius) = query.parse().unwrap();
    assert!((centre.latitude + 34.6).abs() < f64::EPSILON);
    assert!((radius - 5.0).abs() < f64::EPSILON);

    let missing = NearbyQuery {
        radius_km: None,
        ..query
    };
    assert!(matches!(
        missing.parse(),
        Err(LifecycleError::Validation {
            field: "radius_km",
            ..
        })
    ));
}

#[test]
fn test_order_response_serializes_totals_and_timestamps() {
    let mut h = Harness::new();
    let product = h.product(2_275, 5);
    let order = h.place(&[(product, 2)]);

    let json = serde_json::to_value(OrderResponse::from(&order)).unwrap();
    assert_eq!(json["status"], "pending");
    assert_eq!(json["total_cents"], 4_550);
    assert_eq!(json["total"], "45.50");
    assert_eq!(json["items"][0]["subtotal_cents"], 4_550);
    assert_eq!(json["created_at"], "2026-03-02T12:00:00Z");
    assert!(json["confirmed_at"].is_null());
}

#[test]
fn test_error_translation() {
    let err = LifecycleError::from(DomainError::InvalidTransition {
        from: OrderStatus::Delivered,
        to: OrderStatus::Cancelled,
    });
    assert_eq!(err.kind(), "invalid_transition");

    let err = LifecycleError::from(PersistenceError::NotFound(String::from("gone")));
    assert_eq!(err.kind(), "not_found");

    let err = LifecycleError::from(PersistenceError::DatabaseError(String::from("disk")));
    assert_eq!(err.kind(), "infrastructure");
}
