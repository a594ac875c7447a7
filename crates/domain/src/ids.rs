// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Opaque entity identifiers.
//!
//! Identifiers wrap the storage row id. Caller-supplied text or numbers only
//! become identifiers through `FromStr` or `TryFrom<i64>`, both of which reject
//! malformed and non-positive values with `DomainError::InvalidIdentifier`.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a row id read back from storage.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw row id.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                if value <= 0 {
                    return Err(DomainError::InvalidIdentifier {
                        kind: $kind,
                        value: value.to_string(),
                    });
                }
                Ok(Self(value))
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw: i64 = s.trim().parse().map_err(|_| DomainError::InvalidIdentifier {
                    kind: $kind,
                    value: s.to_string(),
                })?;
                Self::try_from(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies an order.
    OrderId,
    "order_id"
);

entity_id!(
    /// Identifies a user: a client, a delivery agent, or an administrator.
    UserId,
    "user_id"
);

entity_id!(
    /// Identifies a catalog product.
    ProductId,
    "product_id"
);
