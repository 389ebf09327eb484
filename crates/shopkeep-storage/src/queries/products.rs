// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog product queries.
//!
//! Prices are stored as TEXT with exactly two decimal places so they round-trip
//! through [`Decimal`] without floating point loss. Listings sort numerically.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;
use shopkeep_core::{CatalogEntry, NewCatalogEntry, ShopError};

use crate::database::{Database, map_tr_err};
use crate::queries::{now_timestamp, parse_timestamp};

const SELECT_COLUMNS: &str =
    "SELECT id, product_id, name, price, description, image, created_at FROM products";

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Canonical two-decimal text form of a price.
pub(crate) fn price_to_sql(price: &Decimal) -> String {
    let mut p = price.round_dp(2);
    p.rescale(2);
    p.to_string()
}

fn row_to_entry(row: &Row<'_>) -> Result<CatalogEntry, rusqlite::Error> {
    let price: String = row.get(3)?;
    let created_at: String = row.get(6)?;
    Ok(CatalogEntry {
        id: row.get(0)?,
        product_id: row.get(1)?,
        name: row.get(2)?,
        price: Decimal::from_str(&price)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        description: row.get(4)?,
        image: row.get(5)?,
        created_at: parse_timestamp(6, &created_at)?,
    })
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub async fn get_by_product_id(
    db: &Database,
    product_id: &str,
) -> Result<Option<CatalogEntry>, ShopError> {
    let product_id = product_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<CatalogEntry>, rusqlite::Error> {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE product_id = ?1"),
                params![product_id],
                row_to_entry,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Inserts a product and returns the stored row.
pub async fn insert_product(
    db: &Database,
    entry: NewCatalogEntry,
) -> Result<CatalogEntry, ShopError> {
    let price = price_to_sql(&entry.price);
    let created_at = now_timestamp();
    let product_id = entry.product_id.clone();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<Option<CatalogEntry>, rusqlite::Error> {
            let outcome = conn.execute(
                "INSERT INTO products (product_id, name, price, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.product_id,
                    entry.name,
                    price,
                    entry.description,
                    created_at
                ],
            );
            match outcome {
                Err(e) if is_unique_violation(&e) => return Ok(None),
                other => other?,
            };
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_entry,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)?;

    inserted.ok_or_else(|| ShopError::Conflict(format!("Product {product_id} already exists")))
}

/// Overwrites name, price and description. Returns `None` if no row matched.
pub async fn update_product(
    db: &Database,
    entry: NewCatalogEntry,
) -> Result<Option<CatalogEntry>, ShopError> {
    let price = price_to_sql(&entry.price);
    db.connection()
        .call(move |conn| -> Result<Option<CatalogEntry>, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE products SET name = ?2, price = ?3, description = ?4
                 WHERE product_id = ?1",
                params![entry.product_id, entry.name, price, entry.description],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE product_id = ?1"),
                params![entry.product_id],
                row_to_entry,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Sets the image URL. Returns false if no row matched.
pub async fn set_image(db: &Database, product_id: &str, image_url: &str) -> Result<bool, ShopError> {
    let product_id = product_id.to_string();
    let image_url = image_url.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE products SET image = ?2 WHERE product_id = ?1",
                params![product_id, image_url],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All products, cheapest first.
pub async fn list_products(db: &Database) -> Result<Vec<CatalogEntry>, ShopError> {
    db.connection()
        .call(|conn| -> Result<Vec<CatalogEntry>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY CAST(price AS REAL), id"))?;
            let rows = stmt.query_map([], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Products whose name contains `text`, ignoring ASCII case, cheapest first.
pub async fn filter_by_name(db: &Database, text: &str) -> Result<Vec<CatalogEntry>, ShopError> {
    let pattern = like_pattern(text);
    db.connection()
        .call(move |conn| -> Result<Vec<CatalogEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE name LIKE ?1 ESCAPE '\\' ORDER BY CAST(price AS REAL), id"
            ))?;
            let rows = stmt.query_map(params![pattern], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn new_entry(product_id: &str, name: &str, price: &str) -> NewCatalogEntry {
        NewCatalogEntry {
            product_id: product_id.to_string(),
            name: name.to_string(),
            price: Decimal::from_str(price).unwrap(),
            description: None,
        }
    }

    #[test]
    fn price_text_has_two_decimals() {
        assert_eq!(price_to_sql(&Decimal::from_str("25.5").unwrap()), "25.50");
        assert_eq!(price_to_sql(&Decimal::from(3)), "3.00");
        assert_eq!(price_to_sql(&Decimal::from_str("1.005").unwrap()), "1.00");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn insert_and_get() {
        let (db, _dir) = setup_db().await;
        let mut entry = new_entry("lamp-1", "Lamp", "25.5");
        entry.description = Some("desk lamp".into());
        let stored = insert_product(&db, entry).await.unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.price.to_string(), "25.50");

        let found = get_by_product_id(&db, "lamp-1").await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.description.as_deref(), Some("desk lamp"));
        assert!(found.image.is_none());

        assert!(get_by_product_id(&db, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_product_id_is_rejected() {
        let (db, _dir) = setup_db().await;
        insert_product(&db, new_entry("dup", "A", "1")).await.unwrap();
        let err = insert_product(&db, new_entry("dup", "B", "2")).await;
        assert!(matches!(err, Err(ShopError::Conflict(_))), "{err:?}");
        assert_eq!(list_products(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_overwrites_in_place() {
        let (db, _dir) = setup_db().await;
        let original = insert_product(&db, new_entry("p1", "Lamp", "25.50"))
            .await
            .unwrap();
        let updated = update_product(&db, new_entry("p1", "Lamp", "30.00"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.price.to_string(), "30.00");

        assert!(
            update_product(&db, new_entry("nope", "X", "1"))
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(list_products(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_orders_by_numeric_price() {
        let (db, _dir) = setup_db().await;
        insert_product(&db, new_entry("a", "Ten", "10.00")).await.unwrap();
        insert_product(&db, new_entry("b", "Nine", "9.00")).await.unwrap();
        insert_product(&db, new_entry("c", "Hundred", "100.00")).await.unwrap();

        let names: Vec<String> = list_products(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Nine", "Ten", "Hundred"]);
    }

    #[tokio::test]
    async fn filter_is_case_insensitive_substring() {
        let (db, _dir) = setup_db().await;
        insert_product(&db, new_entry("a", "Desk Lamp", "20")).await.unwrap();
        insert_product(&db, new_entry("b", "Floor LAMP", "40")).await.unwrap();
        insert_product(&db, new_entry("c", "Chair", "60")).await.unwrap();

        let found = filter_by_name(&db, "lamp").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Desk Lamp");

        assert!(filter_by_name(&db, "%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_image_records_url() {
        let (db, _dir) = setup_db().await;
        insert_product(&db, new_entry("p1", "Lamp", "5")).await.unwrap();
        assert!(set_image(&db, "p1", "/media/products/p1.png").await.unwrap());
        assert!(!set_image(&db, "p2", "/media/products/p2.png").await.unwrap());
        let found = get_by_product_id(&db, "p1").await.unwrap().unwrap();
        assert_eq!(found.image.as_deref(), Some("/media/products/p1.png"));
    }
}
