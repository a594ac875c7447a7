// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test module for the API crate.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod create_order_tests;
mod request_tests;

use std::sync::{Arc, Mutex};

use reparto_domain::{
    Actor, BusinessHours, GeoPoint, ItemRequest, Money, NewOrder, Order, ProductId, Role,
};
use reparto_live::{Notification, NotificationEvent, NotificationSink};
use reparto_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{FixedClock, LifecycleService};

/// Inside the default 09:00-21:00 UTC window.
pub const OPEN: OffsetDateTime = datetime!(2026-03-02 12:00 UTC);
/// Outside it.
pub const CLOSED: OffsetDateTime = datetime!(2026-03-02 23:30 UTC);

/// Collects every published notification.
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, notifications: Vec<Notification>) {
        self.published.lock().unwrap().extend(notifications);
    }
}

pub struct Harness {
    pub persistence: Persistence,
    pub service: LifecycleService,
    pub clock: Arc<FixedClock>,
    pub sink: Arc<RecordingSink>,
    pub client: Actor,
    pub other_client: Actor,
    pub agent: Actor,
    pub other_agent: Actor,
    pub admin: Actor,
}

impl Harness {
    pub fn new() -> Self {
        let mut persistence = Persistence::new_in_memory().unwrap();
        let mut actor = |name: &str, role: Role| {
            Actor::new(persistence.create_user(name, role, OPEN).unwrap(), role)
        };
        let client = actor("Lucia", Role::Client);
        let other_client = actor("Mateo", Role::Client);
        let agent = actor("Rafa", Role::DeliveryAgent);
        let other_agent = actor("Sol", Role::DeliveryAgent);
        let admin = actor("Dispatch", Role::Admin);

        let clock = Arc::new(FixedClock::new(OPEN));
        let sink = Arc::new(RecordingSink::default());
        let hours = BusinessHours::new("UTC", "09:00", "21:00").unwrap();
        let service = LifecycleService::new(hours, clock.clone(), sink.clone());

        Self {
            persistence,
            service,
            clock,
            sink,
            client,
            other_client,
            agent,
            other_agent,
            admin,
        }
    }

    pub fn product(&mut self, cents: i64, stock: i64) -> ProductId {
        self.persistence
            .create_product("Menu item", Money::from_cents(cents), stock)
            .unwrap()
    }

    pub fn stock(&mut self, product: ProductId) -> i64 {
        self.persistence
            .get_product(product)
            .unwrap()
            .unwrap()
            .stock
    }

    /// Places an order for `self.client` with `(product, quantity)` lines.
    pub fn place(&mut self, lines: &[(ProductId, u32)]) -> Order {
        let request = new_order(lines, buenos_aires());
        let client = self.client;
        self.service
            .create_order(&mut self.persistence, &client, request)
            .unwrap()
    }

    /// Places a one-item order and drives it into `Confirmed`.
    pub fn confirmed_order(&mut self) -> Order {
        let product = self.product(1_000, 50);
        let order = self.place(&[(product, 1)]);
        let agent = self.agent;
        self.service
            .update_status(
                &mut self.persistence,
                &agent,
                order.id,
                reparto_domain::OrderStatus::Confirmed,
            )
            .unwrap()
    }

    /// Places a one-item order and assigns it to `self.agent`.
    pub fn assigned_order(&mut self) -> Order {
        let order = self.confirmed_order();
        let (admin, agent) = (self.admin, self.agent);
        self.service
            .assign_repartidor(&mut self.persistence, &admin, order.id, agent.id)
            .unwrap()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.sink.take()
    }
}

pub fn new_order(lines: &[(ProductId, u32)], location: GeoPoint) -> NewOrder {
    let items = lines
        .iter()
        .map(|(product, quantity)| ItemRequest {
            product_id: *product,
            quantity: *quantity,
        })
        .collect();
    NewOrder::new(items, location, "Av. Corrientes 1234", Some("card on delivery")).unwrap()
}

pub fn buenos_aires() -> GeoPoint {
    GeoPoint::new(-34.6037, -58.3816).unwrap()
}

pub fn kinds(notifications: &[Notification]) -> Vec<&'static str> {
    notifications.iter().map(|n| n.event.kind()).collect()
}

pub fn status_changes(notifications: &[Notification]) -> usize {
    notifications
        .iter()
        .filter(|n| matches!(n.event, NotificationEvent::StatusChanged { .. }))
        .count()
}
