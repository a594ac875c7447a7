// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod concurrency_tests;

use crate::{HubConfig, NotificationEvent};
use reparto_domain::{OrderId, OrderStatus};
use std::time::Duration;

pub fn fast_config() -> HubConfig {
    HubConfig {
        delivery_timeout: Duration::from_millis(50),
        connection_buffer: 8,
    }
}

pub fn status_event(order: i64) -> NotificationEvent {
    NotificationEvent::StatusChanged {
        order_id: OrderId::new(order),
        previous: OrderStatus::Pending,
        status: OrderStatus::Confirmed,
    }
}
