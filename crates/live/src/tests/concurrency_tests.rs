// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{fast_config, status_event};
use crate::{DeliveryReport, HubConfig, NotificationEvent, NotificationHub};
use reparto_domain::{Role, UserId};
use std::time::Duration;
use tokio::sync::mpsc;

/// Drains every queued event, checking they arrive in broadcast order.
fn drain_in_order(rx: &mut mpsc::Receiver<NotificationEvent>) -> Vec<i64> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        seen.push(event.order_id().unwrap().value());
    }
    assert!(seen.windows(2).all(|pair| pair[0] < pair[1]), "{seen:?}");
    seen
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_register_and_unregister_during_role_broadcast() {
    const BROADCASTS: i64 = 200;
    // Room for every broadcast, so no delivery can fail on a full queue.
    let config = HubConfig {
        delivery_timeout: Duration::from_millis(50),
        connection_buffer: 256,
    };
    let (hub, _dispatcher) = NotificationHub::new(config);

    let mut observers = Vec::new();
    for observer in 100..104 {
        observers.push(
            hub.register(UserId::new(observer), Role::DeliveryAgent)
                .await
                .unwrap()
                .1,
        );
    }

    let broadcaster = {
        let hub = hub.clone();
        tokio::spawn(async move {
            let mut reports: Vec<DeliveryReport> = Vec::new();
            for order in 1..=BROADCASTS {
                reports.push(hub.send_to_role(Role::DeliveryAgent, &status_event(order)).await);
                tokio::task::yield_now().await;
            }
            reports
        })
    };

    let mut churners = Vec::new();
    for agent in 1..=16 {
        let hub = hub.clone();
        churners.push(tokio::spawn(async move {
            let mut retired = Vec::new();
            for _ in 0..25 {
                let (id, rx) = hub
                    .register(UserId::new(agent), Role::DeliveryAgent)
                    .await
                    .unwrap();
                tokio::task::yield_now().await;
                assert!(hub.unregister(id).await, "connection {id} vanished early");
                assert!(!hub.unregister(id).await);
                // Kept open so in-flight deliveries can still land.
                retired.push(rx);
            }
            retired
        }));
    }

    let mut retired = Vec::new();
    for churner in churners {
        retired.extend(churner.await.unwrap());
    }
    let reports = broadcaster.await.unwrap();

    assert!(reports.iter().all(|report| report.dropped == 0));
    assert!(reports.iter().all(|report| report.delivered >= observers.len()));

    let expected: Vec<i64> = (1..=BROADCASTS).collect();
    let mut received = 0;
    for rx in &mut observers {
        let seen = drain_in_order(rx);
        assert_eq!(seen, expected);
        received += seen.len();
    }
    for rx in &mut retired {
        received += drain_in_order(rx).len();
    }
    let delivered: usize = reports.iter().map(|report| report.delivered).sum();
    assert_eq!(received, delivered);

    assert_eq!(hub.connection_count().await, observers.len());
    assert_eq!(
        hub.connections_for_role(Role::DeliveryAgent).await,
        observers.len()
    );
    for agent in 1..=16 {
        assert_eq!(hub.connections_for_user(UserId::new(agent)).await, 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fan_out_to_a_stable_audience() {
    let (hub, _dispatcher) = NotificationHub::new(fast_config());
    let mut receivers = Vec::new();
    for admin in 1..=4 {
        receivers.push(hub.register(UserId::new(admin), Role::Admin).await.unwrap().1);
    }

    let mut senders = Vec::new();
    for order in 0..4 {
        let hub = hub.clone();
        senders.push(tokio::spawn(async move {
            hub.send_to_role(Role::Admin, &status_event(order)).await
        }));
    }
    for sender in senders {
        let report = sender.await.unwrap();
        assert_eq!(report.delivered, 4);
        assert_eq!(report.dropped, 0);
    }

    for rx in &mut receivers {
        let mut seen = 0;
        while rx.try_recv().is_ok() {
            seen += 1;
        }
        assert_eq!(seen, 4);
    }
}
