// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write transactions.
//!
//! Every multi-row change runs inside one `BEGIN IMMEDIATE` transaction so
//! the write lock is taken up front. Returning `Err` from the closure rolls
//! everything back, including stock adjustments.

use diesel::SqliteConnection;
use reparto_domain::{Order, OrderDraft, OrderId, OrderStatus, ProductId, UserId};
use time::OffsetDateTime;

use crate::data_models::{ProductData, UserData};
use crate::error::PersistenceError;
use crate::{mutations, queries};

/// Either the caller aborted or the database itself failed.
pub(crate) enum TransactionFailure<E> {
    Aborted(E),
    Database(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TransactionFailure<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

/// The operations available inside a write transaction.
pub struct OrderTransaction<'a> {
    pub(crate) conn: &'a mut SqliteConnection,
}

impl OrderTransaction<'_> {
    /// Loads an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_order(&mut self, order_id: OrderId) -> Result<Option<Order>, PersistenceError> {
        queries::orders::get_order(self.conn, order_id)
    }

    /// Loads a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&mut self, user_id: UserId) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user(self.conn, user_id)
    }

    /// Loads a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_product(
        &mut self,
        product_id: ProductId,
    ) -> Result<Option<ProductData>, PersistenceError> {
        queries::catalog::get_product(self.conn, product_id)
    }

    /// Takes stock if enough remains; `false` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn decrement_stock(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, PersistenceError> {
        mutations::catalog::decrement_stock(self.conn, product_id, quantity)
    }

    /// Returns stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the update fails.
    pub fn restore_stock(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::restore_stock(self.conn, product_id, quantity)
    }

    /// Inserts an order and its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails.
    pub fn insert_order(
        &mut self,
        draft: &OrderDraft,
        status: OrderStatus,
        created_at: OffsetDateTime,
    ) -> Result<OrderId, PersistenceError> {
        mutations::orders::insert_order(self.conn, draft, status, created_at)
    }

    /// Appends a status history row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn append_history(
        &mut self,
        order_id: OrderId,
        previous_status: Option<OrderStatus>,
        new_status: OrderStatus,
        changed_by: UserId,
        changed_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::orders::append_history(
            self.conn,
            order_id,
            previous_status,
            new_status,
            changed_by,
            changed_at,
        )
    }

    /// Conditionally moves an order between statuses.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn transition_status(
        &mut self,
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        at: OffsetDateTime,
    ) -> Result<bool, PersistenceError> {
        mutations::orders::transition_status(self.conn, order_id, from, to, at)
    }

    /// Conditionally assigns an agent to a confirmed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn assign_repartidor(
        &mut self,
        order_id: OrderId,
        repartidor_id: UserId,
        at: OffsetDateTime,
    ) -> Result<bool, PersistenceError> {
        mutations::orders::assign_repartidor(self.conn, order_id, repartidor_id, at)
    }

    /// Records an estimated arrival.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_estimated_arrival(
        &mut self,
        order_id: OrderId,
        estimated_arrival: OffsetDateTime,
    ) -> Result<bool, PersistenceError> {
        mutations::orders::set_estimated_arrival(self.conn, order_id, estimated_arrival)
    }
}
