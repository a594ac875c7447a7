// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Service layer of the Reparto delivery service.
//!
//! [`LifecycleService`] owns every order operation: creation, status moves,
//! agent assignment, arrival estimates, proximity search and reads. It is
//! transport-agnostic; callers pass an authenticated [`Actor`] obtained from
//! [`AuthenticationService::validate_token`] and a [`Persistence`] handle.
//!
//! [`Actor`]: reparto_domain::Actor
//! [`Persistence`]: reparto_persistence::Persistence

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod clock;
mod error;
mod lifecycle;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AuthError, LifecycleError};
pub use lifecycle::{LifecycleService, NearbyOrder};
pub use request_response::{
    AssignRequest, CreateOrderRequest, EtaRequest, HistoryResponse, LineItemResponse,
    NearbyOrderResponse, NearbyQuery, OrderItemRequest, OrderResponse, RequestError,
    UpdateStatusRequest,
};
