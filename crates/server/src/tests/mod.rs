// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod live_tests;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use reparto_api::{AuthenticationService, FixedClock, LifecycleService};
use reparto_domain::{BusinessHours, Money, ProductId, Role, UserId};
use reparto_live::{HubConfig, NotificationHub, NotificationSink};
use reparto_persistence::Persistence;
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::{AppState, build_router};

pub const NOW: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);

/// A user with a live session.
#[derive(Clone)]
pub struct Caller {
    pub id: UserId,
    pub token: String,
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub client: Caller,
    pub other_client: Caller,
    pub agent: Caller,
    pub admin: Caller,
}

impl TestApp {
    pub fn new() -> Self {
        let mut persistence = Persistence::new_in_memory().unwrap();
        let mut caller = |name: &str, role: Role| {
            let id = persistence.create_user(name, role, NOW).unwrap();
            let token = AuthenticationService::issue_session(
                &mut persistence,
                id,
                time::Duration::hours(8),
                NOW,
            )
            .unwrap();
            Caller { id, token }
        };
        let client = caller("Lucia", Role::Client);
        let other_client = caller("Mateo", Role::Client);
        let agent = caller("Rafa", Role::DeliveryAgent);
        let admin = caller("Dispatch", Role::Admin);

        let (hub, dispatcher) = NotificationHub::new(HubConfig {
            delivery_timeout: Duration::from_millis(200),
            connection_buffer: 16,
        });
        tokio::spawn(dispatcher.run());

        let hours = BusinessHours::new("UTC", "09:00", "21:00").unwrap();
        let sink: Arc<dyn NotificationSink> = hub.clone();
        let service = LifecycleService::new(hours, Arc::new(FixedClock::new(NOW)), sink);
        let state = AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            service: Arc::new(service),
            hub,
        };

        Self {
            router: build_router(state.clone()),
            state,
            client,
            other_client,
            agent,
            admin,
        }
    }

    pub async fn product(&self, cents: i64, stock: i64) -> ProductId {
        self.state
            .persistence
            .lock()
            .await
            .create_product("Menu item", Money::from_cents(cents), stock)
            .unwrap()
    }

    pub async fn stock(&self, product: ProductId) -> i64 {
        self.state
            .persistence
            .lock()
            .await
            .get_product(product)
            .unwrap()
            .unwrap()
            .stock
    }

    /// Sends a request and returns the status and JSON body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Places an order as the client and returns its id.
    pub async fn place_order(&self, product: ProductId, quantity: u32) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/orders",
                Some(&self.client.token),
                Some(serde_json::json!({
                    "items": [{"product_id": product.value(), "quantity": quantity}],
                    "latitude": -34.6037,
                    "longitude": -58.3816,
                    "address": "Av. Corrientes 1234",
                    "payment_note": "cash"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["order_id"].as_i64().unwrap()
    }

    pub async fn move_to(&self, order: i64, status: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/orders/{order}/status"),
            Some(token),
            Some(serde_json::json!({ "status": status })),
        )
        .await
    }
}
