// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog mutations, including the stock adjustments made by order
//! creation and cancellation.

use diesel::SqliteConnection;
use diesel::prelude::*;
use reparto_domain::{Money, ProductId};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::products;
use crate::error::PersistenceError;

/// Adds a product to the catalog.
///
/// # Errors
///
/// Returns an error if the insert fails or violates a constraint.
pub fn create_product(
    conn: &mut SqliteConnection,
    name: &str,
    price: Money,
    stock: i64,
) -> Result<ProductId, PersistenceError> {
    diesel::insert_into(products::table)
        .values((
            products::name.eq(name),
            products::price_cents.eq(price.cents()),
            products::is_active.eq(1),
            products::stock.eq(stock),
        ))
        .execute(conn)?;

    let product_id: i64 = get_last_insert_rowid(conn)?;
    info!(product_id, name, "Created product");
    Ok(ProductId::new(product_id))
}

/// Marks a product as active or inactive.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the product does not exist.
pub fn set_product_active(
    conn: &mut SqliteConnection,
    product_id: ProductId,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(products::table)
        .filter(products::product_id.eq(product_id.value()))
        .set(products::is_active.eq(i32::from(is_active)))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("product {product_id}")));
    }
    Ok(())
}

/// Takes `quantity` units out of stock if enough remain.
///
/// Returns `false` without changing anything when stock is insufficient.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn decrement_stock(
    conn: &mut SqliteConnection,
    product_id: ProductId,
    quantity: u32,
) -> Result<bool, PersistenceError> {
    let quantity: i64 = i64::from(quantity);
    let updated: usize = diesel::update(products::table)
        .filter(products::product_id.eq(product_id.value()))
        .filter(products::stock.ge(quantity))
        .set(products::stock.eq(products::stock - quantity))
        .execute(conn)?;

    debug!(
        product_id = product_id.value(),
        quantity,
        applied = updated == 1,
        "Stock decrement"
    );
    Ok(updated == 1)
}

/// Returns `quantity` units to stock.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the product does not exist.
pub fn restore_stock(
    conn: &mut SqliteConnection,
    product_id: ProductId,
    quantity: u32,
) -> Result<(), PersistenceError> {
    let quantity: i64 = i64::from(quantity);
    let updated: usize = diesel::update(products::table)
        .filter(products::product_id.eq(product_id.value()))
        .set(products::stock.eq(products::stock + quantity))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("product {product_id}")));
    }
    debug!(product_id = product_id.value(), quantity, "Stock restored");
    Ok(())
}
