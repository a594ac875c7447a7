// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live order notifications.
//!
//! The [`NotificationHub`] tracks every open live connection by identity and
//! by role and pushes [`NotificationEvent`]s to the matching ones. Producers
//! hand notifications over through the [`NotificationSink`] trait and never
//! wait for delivery.

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

mod error;
mod event;
mod hub;

#[cfg(test)]
mod tests;

pub use error::HubError;
pub use event::{Audience, Notification, NotificationEvent};
pub use hub::{
    ConnectionId, DeliveryReport, HubConfig, NotificationDispatcher, NotificationHub,
    NotificationSink,
};
