// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The order lifecycle service.
//!
//! Every mutating operation follows the same shape:
//!
//! 1. Open one immediate storage transaction
//! 2. Load the order and check the lifecycle table, then the actor's policy
//! 3. Apply conditional writes; a write that matches no row is a conflict
//! 4. Commit, then hand notifications to the sink
//!
//! Notifications are published only after a successful commit. Their
//! delivery is best-effort and never changes the operation's result.

use std::sync::Arc;

use reparto_domain::{
    Actor, BusinessHours, GeoPoint, NewOrder, Order, OrderDraft, OrderId, OrderStatus,
    PricedItem, Role, UserId, authorize_estimated_arrival, authorize_proximity_search,
    authorize_transition, can_read, policy_for, validate_radius,
};
use reparto_live::{Notification, NotificationEvent, NotificationSink};
use reparto_persistence::{
    OrderScope, OrderTransaction, Persistence, ProductData, StatusHistoryEntry, UserData,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::LifecycleError;

/// An unclaimed order found by a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyOrder {
    pub order: Order,
    /// Great-circle distance from the search centre.
    pub distance_km: f64,
}

/// Creates orders and moves them through their lifecycle.
pub struct LifecycleService {
    hours: BusinessHours,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSink>,
}

impl LifecycleService {
    /// Creates a service.
    ///
    /// `hours` picks the initial status of new orders, `clock` supplies "now"
    /// and `notifier` receives the events of committed changes.
    #[must_use]
    pub fn new(
        hours: BusinessHours,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            hours,
            clock,
            notifier,
        }
    }

    /// The business hours used for new orders.
    #[must_use]
    pub const fn business_hours(&self) -> BusinessHours {
        self.hours
    }

    /// The service's current instant.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Places an order for a client.
    ///
    /// Products are resolved and priced, stock is taken, and the order, its
    /// items and its first history row are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-clients, `Validation` for unknown or
    /// inactive products and insufficient stock, `Infrastructure` if storage
    /// fails. Nothing is persisted on error.
    pub fn create_order(
        &self,
        persistence: &mut Persistence,
        actor: &Actor,
        request: NewOrder,
    ) -> Result<Order, LifecycleError> {
        if actor.role != Role::Client {
            return Err(LifecycleError::forbidden(format!(
                "{} actors may not place orders",
                actor.role
            )));
        }

        let now: OffsetDateTime = self.clock.now();
        let status: OrderStatus = self.hours.initial_status(now);

        let order: Order = persistence.transaction(|tx| -> Result<Order, LifecycleError> {
            let mut priced: Vec<PricedItem> = Vec::with_capacity(request.items.len());
            for item in &request.items {
                let product: ProductData = tx.get_product(item.product_id)?.ok_or_else(|| {
                    LifecycleError::validation(
                        "items",
                        format!("product {} does not exist", item.product_id),
                    )
                })?;
                if !product.is_active {
                    return Err(LifecycleError::validation(
                        "items",
                        format!("product {} is not available", item.product_id),
                    ));
                }
                if !tx.decrement_stock(item.product_id, item.quantity)? {
                    return Err(LifecycleError::validation(
                        "items",
                        format!(
                            "insufficient stock for product {}: requested {}",
                            item.product_id, item.quantity
                        ),
                    ));
                }
                priced.push(PricedItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: product.price,
                });
            }

            let draft: OrderDraft = OrderDraft::new(actor.id, request, priced)?;
            let order_id: OrderId = tx.insert_order(&draft, status, now)?;
            tx.append_history(order_id, None, status, actor.id, now)?;
            load_order(tx, order_id)
        })?;

        info!(
            order_id = order.id.value(),
            actor_id = actor.id.value(),
            status = order.status.as_str(),
            total_cents = order.total().cents(),
            "Order created"
        );

        let event = NotificationEvent::OrderCreated {
            order_id: order.id,
            status: order.status,
            total_cents: order.total().cents(),
        };
        self.notifier.publish(vec![
            Notification::to_role(Role::Admin, event.clone()),
            Notification::to_role(Role::DeliveryAgent, event.clone()),
            Notification::to_user(order.client_id, event),
        ]);
        Ok(order)
    }

    /// Moves an order to `target`.
    ///
    /// Cancelling returns the stock of every line item.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidTransition` for moves outside the
    /// lifecycle, `Forbidden` for moves the actor's role may not make,
    /// `Validation` for a target of `Assigned`, and `Conflict` if the order
    /// changed concurrently.
    pub fn update_status(
        &self,
        persistence: &mut Persistence,
        actor: &Actor,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, LifecycleError> {
        let now: OffsetDateTime = self.clock.now();

        let (order, previous) = persistence.transaction(
            |tx| -> Result<(Order, OrderStatus), LifecycleError> {
                let mut order: Order = load_order(tx, order_id)?;
                authorize_transition(&order, target, actor)?;
                if target == OrderStatus::Assigned {
                    return Err(LifecycleError::validation(
                        "status",
                        "assignment must name a delivery agent; use the assign operation",
                    ));
                }

                let previous: OrderStatus = order.status;
                if !tx.transition_status(order_id, previous, target, now)? {
                    return Err(LifecycleError::conflict(format!(
                        "order {order_id} is no longer {previous}"
                    )));
                }
                tx.append_history(order_id, Some(previous), target, actor.id, now)?;

                if target == OrderStatus::Cancelled {
                    for item in &order.items {
                        tx.restore_stock(item.product_id, item.quantity)?;
                    }
                }

                order.advance(target, now)?;
                Ok((order, previous))
            },
        )?;

        info!(
            order_id = order_id.value(),
            actor_id = actor.id.value(),
            role = actor.role.as_str(),
            from = previous.as_str(),
            to = target.as_str(),
            "Order status changed"
        );

        let event = NotificationEvent::StatusChanged {
            order_id,
            previous,
            status: order.status,
        };
        let mut notifications: Vec<Notification> =
            vec![Notification::to_user(order.client_id, event.clone())];
        if let Some(agent) = order.repartidor_id {
            notifications.push(Notification::to_user(agent, event.clone()));
        }
        notifications.push(Notification::to_role(Role::Admin, event));
        self.notifier.publish(notifications);

        Ok(order)
    }

    /// Assigns a delivery agent to a confirmed order.
    ///
    /// Exactly one of several concurrent assignments succeeds; the rest see
    /// `Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing order or agent, `Forbidden` if the
    /// actor may not dispatch, `Validation` if the named user cannot carry
    /// orders, `Conflict` if an agent is already assigned, and
    /// `InvalidTransition` if the order is not confirmed.
    pub fn assign_repartidor(
        &self,
        persistence: &mut Persistence,
        actor: &Actor,
        order_id: OrderId,
        agent_id: UserId,
    ) -> Result<Order, LifecycleError> {
        let now: OffsetDateTime = self.clock.now();

        let order: Order = persistence.transaction(|tx| -> Result<Order, LifecycleError> {
            let mut order: Order = load_order(tx, order_id)?;

            // Permission to dispatch does not depend on how far the order got.
            let mut confirmed: Order = order.clone();
            confirmed.status = OrderStatus::Confirmed;
            confirmed.repartidor_id = None;
            policy_for(actor.role).authorize(&confirmed, OrderStatus::Assigned, actor)?;

            let agent: UserData = tx.get_user(agent_id)?.ok_or_else(|| {
                LifecycleError::not_found("User", format!("user {agent_id} does not exist"))
            })?;
            if !agent.role.can_carry_orders() {
                return Err(LifecycleError::validation(
                    "repartidor_id",
                    format!("user {agent_id} is a {} and cannot carry orders", agent.role),
                ));
            }

            if let Some(current) = order.repartidor_id {
                return Err(LifecycleError::conflict(format!(
                    "order {order_id} is already assigned to {current}"
                )));
            }
            order.status.validate_transition(OrderStatus::Assigned)?;

            if !tx.assign_repartidor(order_id, agent_id, now)? {
                return Err(LifecycleError::conflict(format!(
                    "order {order_id} was assigned concurrently"
                )));
            }
            tx.append_history(
                order_id,
                Some(OrderStatus::Confirmed),
                OrderStatus::Assigned,
                actor.id,
                now,
            )?;

            order.assign(agent_id, now)?;
            Ok(order)
        })?;

        info!(
            order_id = order_id.value(),
            actor_id = actor.id.value(),
            repartidor_id = agent_id.value(),
            "Delivery agent assigned"
        );

        let event = NotificationEvent::RepartidorAssigned {
            order_id,
            repartidor_id: agent_id,
        };
        self.notifier.publish(vec![
            Notification::to_user(order.client_id, event.clone()),
            Notification::to_user(agent_id, event.clone()),
            Notification::to_role(Role::Admin, event),
        ]);
        Ok(order)
    }

    /// Records when an order is expected to arrive.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidTransition` unless the order is assigned or
    /// in transit, `Forbidden` unless the actor is the assigned agent or an
    /// administrator, and `Validation` for an instant not in the future.
    pub fn set_estimated_arrival(
        &self,
        persistence: &mut Persistence,
        actor: &Actor,
        order_id: OrderId,
        estimated_arrival: OffsetDateTime,
    ) -> Result<Order, LifecycleError> {
        let now: OffsetDateTime = self.clock.now();

        let order: Order = persistence.transaction(|tx| -> Result<Order, LifecycleError> {
            let mut order: Order = load_order(tx, order_id)?;
            if !matches!(order.status, OrderStatus::Assigned | OrderStatus::InTransit) {
                return Err(LifecycleError::InvalidTransition {
                    message: format!(
                        "an arrival estimate needs an assigned or in-transit order; order {order_id} is {}",
                        order.status
                    ),
                });
            }
            authorize_estimated_arrival(&order, actor)?;
            if estimated_arrival <= now {
                return Err(LifecycleError::validation(
                    "estimated_arrival",
                    "estimated arrival must be in the future",
                ));
            }

            if !tx.set_estimated_arrival(order_id, estimated_arrival)? {
                return Err(LifecycleError::conflict(format!(
                    "order {order_id} left delivery while the estimate was recorded"
                )));
            }
            order.estimated_arrival = Some(estimated_arrival);
            Ok(order)
        })?;

        info!(
            order_id = order_id.value(),
            actor_id = actor.id.value(),
            "Estimated arrival recorded"
        );

        self.notifier.publish(vec![Notification::to_user(
            order.client_id,
            NotificationEvent::EstimatedArrivalSet {
                order_id,
                estimated_arrival,
            },
        )]);
        Ok(order)
    }

    /// Unclaimed orders within `radius_km` of `centre`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for clients and `Validation` for a radius that is
    /// not a positive finite number.
    pub fn find_nearby(
        &self,
        persistence: &mut Persistence,
        actor: &Actor,
        centre: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<NearbyOrder>, LifecycleError> {
        authorize_proximity_search(actor)?;
        let radius_km: f64 = validate_radius(radius_km)?;

        let (min_latitude, max_latitude) = centre.latitude_band(radius_km);
        let candidates: Vec<Order> =
            persistence.find_unclaimed_in_latitude_band(min_latitude, max_latitude)?;
        let scanned: usize = candidates.len();

        let mut hits: Vec<NearbyOrder> = candidates
            .into_iter()
            .filter_map(|order| {
                let distance_km: f64 = centre.distance_km(&order.location);
                (distance_km <= radius_km).then_some(NearbyOrder { order, distance_km })
            })
            .collect();
        hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        debug!(
            actor_id = actor.id.value(),
            radius_km,
            scanned,
            matched = hits.len(),
            "Proximity search"
        );
        Ok(hits)
    }

    /// Loads an order the actor may read.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Forbidden`.
    pub fn get_order(
        &self,
        persistence: &mut Persistence,
        actor: &Actor,
        order_id: OrderId,
    ) -> Result<Order, LifecycleError> {
        let order: Order = persistence.get_order(order_id)?.ok_or_else(|| missing(order_id))?;
        if !can_read(&order, actor) {
            return Err(LifecycleError::forbidden(format!(
                "order {order_id} is not visible to this {}",
                actor.role
            )));
        }
        Ok(order)
    }

    /// Orders relevant to the actor, newest first.
    ///
    /// Clients see their own orders, delivery agents the orders assigned to
    /// them, administrators everything.
    ///
    /// # Errors
    ///
    /// Returns `Infrastructure` if storage fails.
    pub fn list_orders(
        &self,
        persistence: &mut Persistence,
        actor: &Actor,
    ) -> Result<Vec<Order>, LifecycleError> {
        let scope: OrderScope = match actor.role {
            Role::Client => OrderScope::Client(actor.id),
            Role::DeliveryAgent => OrderScope::Repartidor(actor.id),
            Role::Admin => OrderScope::All,
        };
        Ok(persistence.list_orders(scope)?)
    }

    /// The status history of an order the actor may read, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Forbidden`.
    pub fn order_history(
        &self,
        persistence: &mut Persistence,
        actor: &Actor,
        order_id: OrderId,
    ) -> Result<Vec<StatusHistoryEntry>, LifecycleError> {
        self.get_order(persistence, actor, order_id)?;
        Ok(persistence.order_history(order_id)?)
    }
}

fn missing(order_id: OrderId) -> LifecycleError {
    LifecycleError::not_found("Order", format!("order {order_id} does not exist"))
}

fn load_order(tx: &mut OrderTransaction<'_>, order_id: OrderId) -> Result<Order, LifecycleError> {
    tx.get_order(order_id)?.ok_or_else(|| missing(order_id))
}
