// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for Reparto.
//!
//! A single `SQLite` connection, managed through Diesel, stores users and
//! sessions (written by the credential issuer), the product catalog, orders
//! with their line items, and the status history of every order.
//!
//! ## Storage conventions
//!
//! - Money is stored as integer cents
//! - Timestamps are stored as UTC RFC 3339 text
//! - Order totals are never stored; they are derived from line items
//!
//! ## Atomicity
//!
//! Multi-row changes go through [`Persistence::transaction`], which runs the
//! closure inside `BEGIN IMMEDIATE`. Lifecycle updates inside it are
//! conditional writes, so a concurrent writer that changed the row first
//! makes the update report `false` instead of silently overwriting.
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives every caller its own named in-memory
//! database, so tests never share state.

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

use diesel::SqliteConnection;
use reparto_domain::{Money, Order, OrderId, ProductId, Role, UserId};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::warn;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod transaction;

#[cfg(test)]
mod tests;

pub use data_models::{ProductData, SessionData, StatusHistoryEntry, UserData};
pub use error::PersistenceError;
pub use queries::orders::OrderScope;
pub use transaction::OrderTransaction;

use transaction::TransactionFailure;

/// Sequence for unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over one `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates an adapter over a fresh, private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:reparto_mem_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates an adapter over a file-backed database in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Runs `f` inside one immediate transaction.
    ///
    /// The transaction commits if `f` returns `Ok` and rolls back otherwise.
    /// Database failures, including a failed commit, are converted into `E`.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or the converted database error.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut OrderTransaction<'_>) -> Result<T, E>,
        E: From<PersistenceError>,
    {
        let outcome: Result<T, TransactionFailure<E>> =
            self.conn.immediate_transaction(|conn| {
                let mut tx = OrderTransaction { conn };
                f(&mut tx).map_err(TransactionFailure::Aborted)
            });

        match outcome {
            Ok(value) => Ok(value),
            Err(TransactionFailure::Aborted(err)) => Err(err),
            Err(TransactionFailure::Database(err)) => {
                warn!(error = %err, "Transaction failed");
                Err(E::from(PersistenceError::from(err)))
            }
        }
    }

    // ========================================================================
    // Users & Sessions
    // ========================================================================

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_user(
        &mut self,
        display_name: &str,
        role: Role,
        created_at: OffsetDateTime,
    ) -> Result<UserId, PersistenceError> {
        mutations::users::create_user(&mut self.conn, display_name, role, created_at)
    }

    /// Retrieves a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&mut self, user_id: UserId) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user(&mut self.conn, user_id)
    }

    /// Creates a session token for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: UserId,
        expires_at: OffsetDateTime,
        created_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(
            &mut self.conn,
            session_token,
            user_id,
            expires_at,
            created_at,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<bool, PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Adds an active product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_product(
        &mut self,
        name: &str,
        price: Money,
        stock: i64,
    ) -> Result<ProductId, PersistenceError> {
        mutations::catalog::create_product(&mut self.conn, name, price, stock)
    }

    /// Retrieves a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_product(
        &mut self,
        product_id: ProductId,
    ) -> Result<Option<ProductData>, PersistenceError> {
        queries::catalog::get_product(&mut self.conn, product_id)
    }

    /// Activates or deactivates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the update fails.
    pub fn set_product_active(
        &mut self,
        product_id: ProductId,
        is_active: bool,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::set_product_active(&mut self.conn, product_id, is_active)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Retrieves an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_order(&mut self, order_id: OrderId) -> Result<Option<Order>, PersistenceError> {
        queries::orders::get_order(&mut self.conn, order_id)
    }

    /// Lists orders in a scope, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_orders(&mut self, scope: OrderScope) -> Result<Vec<Order>, PersistenceError> {
        queries::orders::list_orders(&mut self.conn, scope)
    }

    /// Unclaimed orders inside a latitude band.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_unclaimed_in_latitude_band(
        &mut self,
        min_latitude: f64,
        max_latitude: f64,
    ) -> Result<Vec<Order>, PersistenceError> {
        queries::orders::find_unclaimed_in_latitude_band(
            &mut self.conn,
            min_latitude,
            max_latitude,
        )
    }

    /// The status history of an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn order_history(
        &mut self,
        order_id: OrderId,
    ) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
        queries::orders::order_history(&mut self.conn, order_id)
    }
}
