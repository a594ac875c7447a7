// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The notification hub: a registry of live connections and fan-out delivery.
//!
//! # Locking
//!
//! The registry lives behind one `RwLock`. Fan-out takes the read lock only
//! long enough to copy the matching senders, delivers with the lock released,
//! then takes the write lock once to remove every connection that failed.
//! Nothing is ever removed while the read lock is held.
//!
//! # Delivery
//!
//! Each connection owns a bounded queue. An event that cannot be queued
//! within the configured timeout, or whose queue is closed, costs the
//! connection its registration. Other connections are unaffected.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures::future::join_all;
use reparto_domain::{Role, UserId};
use tokio::sync::RwLock;
use tokio::sync::mpsc::{
    self,
    error::{SendTimeoutError, TrySendError},
};
use tracing::{debug, info, warn};

use crate::error::HubError;
use crate::event::{Audience, Notification, NotificationEvent};

/// Identifies one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// The raw id.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hub tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// How long one delivery may wait on a full connection queue.
    pub delivery_timeout: Duration,
    /// Capacity of each connection's queue.
    pub connection_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_millis(2_000),
            connection_buffer: 32,
        }
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Connections that accepted the event.
    pub delivered: usize,
    /// Connections that failed and were unregistered.
    pub dropped: usize,
}

/// Consumes notifications produced by the lifecycle.
///
/// `publish` must return immediately; delivery happens elsewhere and its
/// failures never reach the publisher.
pub trait NotificationSink: Send + Sync {
    /// Hands notifications off for delivery.
    fn publish(&self, notifications: Vec<Notification>);
}

struct Registration {
    user_id: UserId,
    role: Role,
    sender: mpsc::Sender<NotificationEvent>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Registration>,
    by_user: HashMap<UserId, HashSet<ConnectionId>>,
    by_role: HashMap<Role, HashSet<ConnectionId>>,
    shut_down: bool,
}

impl Registry {
    fn insert(&mut self, id: ConnectionId, registration: Registration) {
        self.by_user
            .entry(registration.user_id)
            .or_default()
            .insert(id);
        self.by_role
            .entry(registration.role)
            .or_default()
            .insert(id);
        self.connections.insert(id, registration);
    }

    fn remove(&mut self, id: ConnectionId) -> bool {
        let Some(registration) = self.connections.remove(&id) else {
            return false;
        };
        if let Some(ids) = self.by_user.get_mut(&registration.user_id) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_user.remove(&registration.user_id);
            }
        }
        if let Some(ids) = self.by_role.get_mut(&registration.role) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_role.remove(&registration.role);
            }
        }
        true
    }

    fn targets(&self, audience: Audience) -> Vec<(ConnectionId, mpsc::Sender<NotificationEvent>)> {
        let sender_for = |id: &ConnectionId| {
            self.connections
                .get(id)
                .map(|registration| (*id, registration.sender.clone()))
        };
        match audience {
            Audience::User(user_id) => self
                .by_user
                .get(&user_id)
                .map(|ids| ids.iter().filter_map(sender_for).collect())
                .unwrap_or_default(),
            Audience::Role(role) => self
                .by_role
                .get(&role)
                .map(|ids| ids.iter().filter_map(sender_for).collect())
                .unwrap_or_default(),
            Audience::All => self
                .connections
                .iter()
                .map(|(id, registration)| (*id, registration.sender.clone()))
                .collect(),
        }
    }
}

/// Registry of live connections keyed by identity and by role.
pub struct NotificationHub {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
    config: HubConfig,
    outbox: Mutex<Option<mpsc::UnboundedSender<Vec<Notification>>>>,
}

/// Drains published notifications and delivers them through the hub.
///
/// Returned by [`NotificationHub::new`]; the owner spawns [`run`](Self::run).
///
/// The dispatcher never waits on a connection. An event is queued with
/// `try_send`; when a queue is full the connection gets an overflow lane, a
/// task that feeds it with the hub's delivery timeout. Once a lane exists
/// every later event for that connection goes through it, so per-connection
/// order is kept while other connections are served immediately.
pub struct NotificationDispatcher {
    hub: Weak<NotificationHub>,
    outbox: mpsc::UnboundedReceiver<Vec<Notification>>,
    lanes: HashMap<ConnectionId, mpsc::UnboundedSender<NotificationEvent>>,
}

impl NotificationDispatcher {
    /// Delivers published batches in order until the hub shuts down.
    pub async fn run(mut self) {
        while let Some(batch) = self.outbox.recv().await {
            let Some(hub) = self.hub.upgrade() else {
                break;
            };
            self.lanes.retain(|_, lane| !lane.is_closed());
            for notification in &batch {
                let report: DeliveryReport = self.dispatch(&hub, notification).await;
                debug!(
                    kind = notification.event.kind(),
                    delivered = report.delivered,
                    dropped = report.dropped,
                    "Dispatched notification"
                );
            }
        }
        debug!("Notification dispatcher stopped");
    }

    async fn dispatch(
        &mut self,
        hub: &NotificationHub,
        notification: &Notification,
    ) -> DeliveryReport {
        let targets = hub.registry.read().await.targets(notification.audience);

        let mut report = DeliveryReport::default();
        let mut closed: Vec<ConnectionId> = Vec::new();
        for (connection_id, sender) in targets {
            let mut event: NotificationEvent = notification.event.clone();
            if let Some(lane) = self.lanes.get(&connection_id) {
                match lane.send(event) {
                    Ok(()) => {
                        report.delivered += 1;
                        continue;
                    }
                    // The lane ended with its connection.
                    Err(mpsc::error::SendError(returned)) => {
                        self.lanes.remove(&connection_id);
                        event = returned;
                    }
                }
            }

            match sender.try_send(event) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(event)) => {
                    debug!(connection_id = %connection_id, "Connection queue full, opening overflow lane");
                    let (lane, backlog) = mpsc::unbounded_channel();
                    if lane.send(event).is_ok() {
                        tokio::spawn(drain_lane(
                            self.hub.clone(),
                            connection_id,
                            sender,
                            backlog,
                            hub.config.delivery_timeout,
                        ));
                        self.lanes.insert(connection_id, lane);
                        report.delivered += 1;
                    }
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(
                        connection_id = %connection_id,
                        error = %HubError::ConnectionClosed { connection_id },
                        "Dropping live connection"
                    );
                    closed.push(connection_id);
                }
            }
        }

        if !closed.is_empty() {
            let mut registry = hub.registry.write().await;
            for connection_id in &closed {
                registry.remove(*connection_id);
            }
        }
        report.dropped = closed.len();
        report
    }
}

/// Feeds a backlogged connection in order, each event bounded by `timeout`.
///
/// A timeout or a closed queue unregisters the connection and ends the lane.
async fn drain_lane(
    hub: Weak<NotificationHub>,
    connection_id: ConnectionId,
    sender: mpsc::Sender<NotificationEvent>,
    mut backlog: mpsc::UnboundedReceiver<NotificationEvent>,
    timeout: Duration,
) {
    while let Some(event) = backlog.recv().await {
        if let Err(err) = sender.send_timeout(event, timeout).await {
            let err: HubError = match err {
                SendTimeoutError::Timeout(_) => HubError::DeliveryTimedOut {
                    connection_id,
                    timeout,
                },
                SendTimeoutError::Closed(_) => HubError::ConnectionClosed { connection_id },
            };
            warn!(connection_id = %connection_id, error = %err, "Dropping live connection");
            if let Some(hub) = hub.upgrade() {
                hub.unregister(connection_id).await;
            }
            return;
        }
    }
}

impl NotificationHub {
    /// Creates a hub and the dispatcher that serves its `publish` calls.
    #[must_use]
    pub fn new(config: HubConfig) -> (Arc<Self>, NotificationDispatcher) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Arc::new(Self {
            registry: RwLock::new(Registry::default()),
            next_id: AtomicU64::new(1),
            config,
            outbox: Mutex::new(Some(tx)),
        });
        let dispatcher = NotificationDispatcher {
            hub: Arc::downgrade(&hub),
            outbox: rx,
            lanes: HashMap::new(),
        };
        (hub, dispatcher)
    }

    /// The hub's configuration.
    #[must_use]
    pub const fn config(&self) -> HubConfig {
        self.config
    }

    /// Registers a connection and returns the queue its worker must drain.
    ///
    /// # Errors
    ///
    /// Returns `HubError::ShutDown` once the hub has been shut down.
    pub async fn register(
        &self,
        user_id: UserId,
        role: Role,
    ) -> Result<(ConnectionId, mpsc::Receiver<NotificationEvent>), HubError> {
        let (sender, receiver) = mpsc::channel(self.config.connection_buffer.max(1));
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut registry = self.registry.write().await;
        if registry.shut_down {
            return Err(HubError::ShutDown);
        }
        registry.insert(
            id,
            Registration {
                user_id,
                role,
                sender,
            },
        );
        drop(registry);

        info!(
            connection_id = %id,
            user_id = user_id.value(),
            role = role.as_str(),
            "Registered live connection"
        );
        Ok((id, receiver))
    }

    /// Removes a connection. Returns `false` if it was already gone.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.registry.write().await.remove(id);
        if removed {
            info!(connection_id = %id, "Unregistered live connection");
        }
        removed
    }

    /// Delivers to every connection of one identity.
    pub async fn send_to_user(&self, user_id: UserId, event: &NotificationEvent) -> DeliveryReport {
        self.fan_out(Audience::User(user_id), event).await
    }

    /// Delivers to every connection acting under `role`.
    pub async fn send_to_role(&self, role: Role, event: &NotificationEvent) -> DeliveryReport {
        self.fan_out(Audience::Role(role), event).await
    }

    /// Delivers to every connection.
    pub async fn broadcast(&self, event: &NotificationEvent) -> DeliveryReport {
        self.fan_out(Audience::All, event).await
    }

    /// Delivers one notification to its audience.
    pub async fn deliver(&self, notification: &Notification) -> DeliveryReport {
        self.fan_out(notification.audience, &notification.event).await
    }

    async fn fan_out(&self, audience: Audience, event: &NotificationEvent) -> DeliveryReport {
        let targets = self.registry.read().await.targets(audience);
        if targets.is_empty() {
            debug!(kind = event.kind(), ?audience, "No connections for notification");
            return DeliveryReport::default();
        }

        let timeout = self.config.delivery_timeout;
        let attempts = targets.into_iter().map(|(connection_id, sender)| {
            let event = event.clone();
            async move {
                let result = sender
                    .send_timeout(event, timeout)
                    .await
                    .map_err(|err| match err {
                        SendTimeoutError::Timeout(_) => HubError::DeliveryTimedOut {
                            connection_id,
                            timeout,
                        },
                        SendTimeoutError::Closed(_) => {
                            HubError::ConnectionClosed { connection_id }
                        }
                    });
                (connection_id, result)
            }
        });

        let mut report = DeliveryReport::default();
        let mut failed: Vec<ConnectionId> = Vec::new();
        for (connection_id, result) in join_all(attempts).await {
            match result {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(connection_id = %connection_id, error = %err, "Dropping live connection");
                    failed.push(connection_id);
                }
            }
        }

        if !failed.is_empty() {
            let mut registry = self.registry.write().await;
            for connection_id in &failed {
                registry.remove(*connection_id);
            }
        }
        report.dropped = failed.len();
        report
    }

    /// Refuses new connections, drops every registration and stops the dispatcher.
    ///
    /// Dropping the registrations closes every connection queue, which ends
    /// the connection workers.
    pub async fn shutdown(&self) {
        let dropped = {
            let mut registry = self.registry.write().await;
            registry.shut_down = true;
            registry.by_user.clear();
            registry.by_role.clear();
            let count = registry.connections.len();
            registry.connections.clear();
            count
        };
        let outbox = match self.outbox.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(outbox);
        info!(connections = dropped, "Notification hub shut down");
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Number of connections registered for one identity.
    pub async fn connections_for_user(&self, user_id: UserId) -> usize {
        self.registry
            .read()
            .await
            .by_user
            .get(&user_id)
            .map_or(0, HashSet::len)
    }

    /// Number of connections registered under one role.
    pub async fn connections_for_role(&self, role: Role) -> usize {
        self.registry
            .read()
            .await
            .by_role
            .get(&role)
            .map_or(0, HashSet::len)
    }
}

impl NotificationSink for NotificationHub {
    fn publish(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        let guard = match self.outbox.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.as_ref() {
            Some(outbox) => {
                if outbox.send(notifications).is_err() {
                    warn!("Notification dispatcher is gone; dropping notifications");
                }
            }
            None => debug!("Hub is shut down; dropping notifications"),
        }
    }
}
