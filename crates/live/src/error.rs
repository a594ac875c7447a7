// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;
use thiserror::Error;

use crate::hub::ConnectionId;

/// Hub errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The connection's queue stayed full for the whole delivery timeout.
    #[error("connection {connection_id} did not accept an event within {timeout:?}")]
    DeliveryTimedOut {
        connection_id: ConnectionId,
        timeout: Duration,
    },

    /// The connection's worker has gone away.
    #[error("connection {connection_id} is closed")]
    ConnectionClosed { connection_id: ConnectionId },

    /// The hub has been shut down and accepts no new connections.
    #[error("notification hub is shut down")]
    ShutDown,
}
