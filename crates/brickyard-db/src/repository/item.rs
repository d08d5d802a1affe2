//! # Item Repository
//!
//! CRUD, filtered listing, stock overwrite, and low-stock queries for
//! inventory items.
//!
//! Stock is also mutated by the sale engine (decrement on create, restore
//! on delete); those writes live in the sale repository's transactions, not
//! here. `update_stock` is the manual overwrite used for stock corrections.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use brickyard_core::{Item, ItemView, Money, DEFAULT_ITEM_UNIT};

use crate::error::{DbError, DbResult};

const ITEM_VIEW_COLUMNS: &str = r#"
    i.id, i.name, i.description, i.category_id, c.name AS category_name,
    i.size, i.price, i.stock_quantity, i.unit, i.take_down_charge_per_unit,
    i.is_active, i.created_at, i.updated_at
"#;

/// Fields accepted when creating or updating an item.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
    pub size: Option<String>,
    pub price: Money,
    pub stock_quantity: i64,
    pub unit: Option<String>,
    pub take_down_charge_per_unit: Option<Money>,
    pub is_active: bool,
}

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists items with optional category and active filters, joined with
    /// their category names.
    pub async fn list(
        &self,
        category_id: Option<&str>,
        is_active: Option<bool>,
    ) -> DbResult<Vec<ItemView>> {
        let sql = format!(
            r#"
            SELECT {ITEM_VIEW_COLUMNS}
            FROM items i
            INNER JOIN categories c ON c.id = i.category_id
            WHERE (?1 IS NULL OR i.category_id = ?1)
              AND (?2 IS NULL OR i.is_active = ?2)
            ORDER BY i.name
            "#
        );

        let items = sqlx::query_as::<_, ItemView>(&sql)
            .bind(category_id)
            .bind(is_active)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets an item by ID with its category name.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ItemView>> {
        let sql = format!(
            r#"
            SELECT {ITEM_VIEW_COLUMNS}
            FROM items i
            INNER JOIN categories c ON c.id = i.category_id
            WHERE i.id = ?1
            "#
        );

        let item = sqlx::query_as::<_, ItemView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Creates a new item. The referenced category must exist.
    pub async fn insert(&self, input: ItemInput) -> DbResult<ItemView> {
        let category_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?1")
                .bind(&input.category_id)
                .fetch_one(&self.pool)
                .await?;
        if category_count == 0 {
            return Err(DbError::restricted("Category does not exist"));
        }

        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            category_id: input.category_id,
            size: input.size,
            price: input.price,
            stock_quantity: input.stock_quantity,
            unit: input.unit.unwrap_or_else(|| DEFAULT_ITEM_UNIT.to_string()),
            take_down_charge_per_unit: input.take_down_charge_per_unit,
            is_active: input.is_active,
            created_at: Utc::now(),
            updated_at: None,
        };

        debug!(id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, description, category_id, size,
                price, stock_quantity, unit, take_down_charge_per_unit,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category_id)
        .bind(&item.size)
        .bind(item.price)
        .bind(item.stock_quantity)
        .bind(&item.unit)
        .bind(item.take_down_charge_per_unit)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        // Re-read through the join to resolve the category name.
        self.get_by_id(&item.id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", &item.id))
    }

    /// Updates an item's details. The referenced category must exist.
    pub async fn update(&self, id: &str, input: ItemInput) -> DbResult<()> {
        let category_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?1")
                .bind(&input.category_id)
                .fetch_one(&self.pool)
                .await?;
        if category_count == 0 {
            return Err(DbError::restricted("Category does not exist"));
        }

        let now = Utc::now();
        let unit = input.unit.unwrap_or_else(|| DEFAULT_ITEM_UNIT.to_string());

        let result = sqlx::query(
            r#"
            UPDATE items SET
                name = ?2,
                description = ?3,
                category_id = ?4,
                size = ?5,
                price = ?6,
                stock_quantity = ?7,
                unit = ?8,
                take_down_charge_per_unit = ?9,
                is_active = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.category_id)
        .bind(&input.size)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(&unit)
        .bind(input.take_down_charge_per_unit)
        .bind(input.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Overwrites an item's stock quantity (manual stock correction).
    pub async fn update_stock(&self, id: &str, new_stock_quantity: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE items SET stock_quantity = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(new_stock_quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        debug!(id = %id, stock = new_stock_quantity, "Stock overwritten");
        Ok(())
    }

    /// Deletes an item. Rejected while any sale line references it, so
    /// price history stays intact.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let sale_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE item_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if sale_count > 0 {
            return Err(DbError::restricted(
                "Cannot delete item that has sales records",
            ));
        }

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        debug!(id = %id, "Item deleted");
        Ok(())
    }

    /// Lists active items whose stock is at or below the threshold
    /// (dashboard low-stock alerts).
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<ItemView>> {
        let sql = format!(
            r#"
            SELECT {ITEM_VIEW_COLUMNS}
            FROM items i
            INNER JOIN categories c ON c.id = i.category_id
            WHERE i.stock_quantity <= ?1 AND i.is_active = 1
            ORDER BY i.stock_quantity, i.name
            "#
        );

        let items = sqlx::query_as::<_, ItemView>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}
