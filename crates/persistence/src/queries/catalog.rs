// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Product catalog queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use reparto_domain::{Money, ProductId};

use crate::data_models::ProductData;
use crate::diesel_schema::products;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = products)]
struct ProductRow {
    product_id: i64,
    name: String,
    price_cents: i64,
    is_active: i32,
    stock: i64,
}

/// Retrieves a product by id, active or not.
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if the product does not exist.
pub fn get_product(
    conn: &mut SqliteConnection,
    product_id: ProductId,
) -> Result<Option<ProductData>, PersistenceError> {
    let row: Option<ProductRow> = products::table
        .filter(products::product_id.eq(product_id.value()))
        .select(ProductRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(|row| ProductData {
        product_id: ProductId::new(row.product_id),
        name: row.name,
        price: Money::from_cents(row.price_cents),
        is_active: row.is_active != 0,
        stock: row.stock,
    }))
}
