// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod business_hours;
mod error;
mod geo;
mod ids;
mod money;
mod order;
mod permission;
mod role;
mod status;

#[cfg(test)]
mod tests;

pub use business_hours::BusinessHours;
pub use error::DomainError;
pub use geo::{EARTH_RADIUS_KM, GeoPoint, validate_radius};
pub use ids::{OrderId, ProductId, UserId};
pub use money::Money;
pub use order::{ItemRequest, LineItem, NewOrder, Order, OrderDraft, PricedItem};
pub use permission::{
    AdminPolicy, ClientPolicy, DeliveryAgentPolicy, TransitionPolicy, authorize_estimated_arrival,
    authorize_proximity_search, authorize_transition, can_read, policy_for,
};
pub use role::{Actor, Role};
pub use status::OrderStatus;
