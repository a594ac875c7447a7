// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `catalog` — products
//! - `orders` — orders with their line items, proximity candidates, history
//! - `users` — identities and sessions

pub mod catalog;
pub mod orders;
pub mod users;
