// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order endpoint handlers.
//!
//! Handlers authenticate, parse, lock storage, call the lifecycle service and
//! shape the result. They hold no rules of their own.

use axum::{
    Json,
    extract::{
        Path, Query, State as AxumState,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use reparto_api::{
    AssignRequest, CreateOrderRequest, EtaRequest, HistoryResponse, NearbyOrderResponse,
    NearbyQuery, OrderResponse, UpdateStatusRequest,
};
use reparto_domain::{NewOrder, OrderId, OrderStatus, UserId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::AppState;
use crate::error::HttpError;
use crate::session::SessionActor;

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub live_connections: usize,
}

fn parse_order_id(raw: &str) -> Result<OrderId, HttpError> {
    Ok(raw.parse::<OrderId>()?)
}

/// Handler for POST `/orders`.
pub async fn handle_create_order(
    AxumState(state): AxumState<AppState>,
    SessionActor(session): SessionActor,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), HttpError> {
    let Json(req) = payload?;
    info!(
        actor_id = session.user_id().value(),
        items = req.items.len(),
        "Handling create_order request"
    );
    let command: NewOrder = req.into_command()?;

    let mut persistence = state.persistence.lock().await;
    let order = state
        .service
        .create_order(&mut persistence, &session.actor, command)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// Handler for GET `/orders`.
pub async fn handle_list_orders(
    AxumState(state): AxumState<AppState>,
    SessionActor(session): SessionActor,
) -> Result<Json<Vec<OrderResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let orders = state.service.list_orders(&mut persistence, &session.actor)?;
    drop(persistence);

    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// Handler for GET `/orders/nearby`.
pub async fn handle_find_nearby(
    AxumState(state): AxumState<AppState>,
    SessionActor(session): SessionActor,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<Vec<NearbyOrderResponse>>, HttpError> {
    let Query(query) = query?;
    let (centre, radius_km) = query.parse()?;

    let mut persistence = state.persistence.lock().await;
    let hits = state
        .service
        .find_nearby(&mut persistence, &session.actor, centre, radius_km)?;
    drop(persistence);

    Ok(Json(hits.iter().map(NearbyOrderResponse::from).collect()))
}

/// Handler for GET `/orders/{id}`.
pub async fn handle_get_order(
    AxumState(state): AxumState<AppState>,
    SessionActor(session): SessionActor,
    Path(raw_id): Path<String>,
) -> Result<Json<OrderResponse>, HttpError> {
    let order_id: OrderId = parse_order_id(&raw_id)?;

    let mut persistence = state.persistence.lock().await;
    let order = state
        .service
        .get_order(&mut persistence, &session.actor, order_id)?;
    drop(persistence);

    Ok(Json(OrderResponse::from(&order)))
}

/// Handler for GET `/orders/{id}/history`.
pub async fn handle_order_history(
    AxumState(state): AxumState<AppState>,
    SessionActor(session): SessionActor,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<HistoryResponse>>, HttpError> {
    let order_id: OrderId = parse_order_id(&raw_id)?;

    let mut persistence = state.persistence.lock().await;
    let history = state
        .service
        .order_history(&mut persistence, &session.actor, order_id)?;
    drop(persistence);

    Ok(Json(history.iter().map(HistoryResponse::from).collect()))
}

/// Handler for POST `/orders/{id}/status`.
pub async fn handle_update_status(
    AxumState(state): AxumState<AppState>,
    SessionActor(session): SessionActor,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, HttpError> {
    let order_id: OrderId = parse_order_id(&raw_id)?;
    let Json(req) = payload?;
    let target: OrderStatus = req.target()?;
    info!(
        actor_id = session.user_id().value(),
        order_id = order_id.value(),
        target = target.as_str(),
        "Handling update_status request"
    );

    let mut persistence = state.persistence.lock().await;
    let order = state
        .service
        .update_status(&mut persistence, &session.actor, order_id, target)?;
    drop(persistence);

    Ok(Json(OrderResponse::from(&order)))
}

/// Handler for POST `/orders/{id}/assign`.
pub async fn handle_assign(
    AxumState(state): AxumState<AppState>,
    SessionActor(session): SessionActor,
    Path(raw_id): Path<String>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, HttpError> {
    let order_id: OrderId = parse_order_id(&raw_id)?;
    let Json(req) = payload?;
    let agent: UserId = req.agent()?;

    let mut persistence = state.persistence.lock().await;
    let order = state
        .service
        .assign_repartidor(&mut persistence, &session.actor, order_id, agent)?;
    drop(persistence);

    Ok(Json(OrderResponse::from(&order)))
}

/// Handler for POST `/orders/{id}/eta`.
pub async fn handle_set_eta(
    AxumState(state): AxumState<AppState>,
    SessionActor(session): SessionActor,
    Path(raw_id): Path<String>,
    payload: Result<Json<EtaRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, HttpError> {
    let order_id: OrderId = parse_order_id(&raw_id)?;
    let Json(req) = payload?;
    let estimated_arrival: OffsetDateTime = req.instant()?;

    let mut persistence = state.persistence.lock().await;
    let order = state.service.set_estimated_arrival(
        &mut persistence,
        &session.actor,
        order_id,
        estimated_arrival,
    )?;
    drop(persistence);

    Ok(Json(OrderResponse::from(&order)))
}

/// Handler for GET `/health`.
pub async fn handle_health(AxumState(state): AxumState<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
        live_connections: state.hub.connection_count().await,
    })
}
