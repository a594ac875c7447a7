// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Lifecycle updates are conditional writes: each one re-states the status
//! it expects to find and reports whether a row actually changed. A `false`
//! result means another writer got there first.

pub mod catalog;
pub mod orders;
pub mod users;
