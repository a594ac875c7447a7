// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use axum::http::StatusCode;
use reparto_domain::{OrderStatus, Role};
use reparto_live::NotificationEvent;
use tokio::sync::mpsc;

use super::TestApp;

async fn next_event(events: &mut mpsc::Receiver<NotificationEvent>) -> NotificationEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event should arrive")
        .expect("queue should stay open")
}

#[tokio::test]
async fn test_live_channel_requires_a_session() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/live", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "authentication");

    let (status, _) = app.send("GET", "/live?token=bogus", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_query_token_passes_authentication() {
    let app = TestApp::new();
    let uri = format!("/live?token={}", app.agent.token);

    // Authentication succeeds; the plain request then fails the upgrade.
    let (status, _) = app.send("GET", &uri, None, None).await;
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_order_events_reach_registered_connections() {
    let app = TestApp::new();
    let product = app.product(1_000, 5).await;
    let (_, mut client_events) = app
        .state
        .hub
        .register(app.client.id, Role::Client)
        .await
        .unwrap();
    let (_, mut agent_events) = app
        .state
        .hub
        .register(app.agent.id, Role::DeliveryAgent)
        .await
        .unwrap();
    let (_, mut other_events) = app
        .state
        .hub
        .register(app.other_client.id, Role::Client)
        .await
        .unwrap();

    let order = app.place_order(product, 2).await;

    match next_event(&mut agent_events).await {
        NotificationEvent::OrderCreated {
            order_id,
            status,
            total_cents,
        } => {
            assert_eq!(order_id.value(), order);
            assert_eq!(status, OrderStatus::Pending);
            assert_eq!(total_cents, 2_000);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(next_event(&mut client_events).await.kind(), "order_created");

    app.move_to(order, "confirmed", &app.agent.token).await;
    match next_event(&mut client_events).await {
        NotificationEvent::StatusChanged {
            previous, status, ..
        } => {
            assert_eq!(previous, OrderStatus::Pending);
            assert_eq!(status, OrderStatus::Confirmed);
        }
        other => panic!("unexpected event {other:?}"),
    }

    assert!(other_events.try_recv().is_err());
}

#[tokio::test]
async fn test_health_counts_live_connections() {
    let app = TestApp::new();
    let (id, _events) = app
        .state
        .hub
        .register(app.admin.id, Role::Admin)
        .await
        .unwrap();

    let (_, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(body["live_connections"], 1);

    app.state.hub.unregister(id).await;
    let (_, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(body["live_connections"], 0);
}
