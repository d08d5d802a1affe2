//! # Sale Repository
//!
//! The sale transaction engine's atomic apply step.
//!
//! ## Sale Creation
//! ```text
//!   create(request)
//!        │
//!        ▼
//!   BEGIN TRANSACTION
//!     ├── load snapshots of every referenced item
//!     ├── pricing::price_sale()      ← pure pass: all checks, all totals
//!     ├── guarded stock decrements   (stock_quantity >= ? in the WHERE)
//!     ├── sale number from MAX(seq)+1 (inside the txn, UNIQUE column)
//!     └── INSERT sale, sale_items, transport_log
//!   COMMIT                           ← everything lands, or nothing does
//! ```
//!
//! ## Concurrency
//! Writes are fail-fast, not blocking. SQLite serializes writing
//! transactions; should a conflicting decrement still slip between snapshot
//! and update, the guarded UPDATE matches zero rows and the whole
//! transaction aborts with `Conflict` for the caller to retry. A
//! sale-number collision hits the UNIQUE index and the engine retries the
//! whole transaction a bounded number of times; the number is never
//! computed outside the transaction boundary.
//!
//! ## Snapshot Pattern
//! Unit price and take-down charge are copied onto each sale line at
//! creation. Sale history stays accurate even when item prices change
//! later.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use brickyard_core::{
    Item, PricedSale, Sale, SaleDetail, SaleLineView, SaleRequest, TransportLog,
    SALE_NUMBER_PREFIX, SALE_NUMBER_SEQ_WIDTH,
};

use crate::error::{DbError, DbResult};

/// Attempts before giving up on a sale-number collision.
const SALE_NUMBER_RETRIES: u32 = 3;

const SALE_COLUMNS: &str = r#"
    id, sale_number, customer_name, customer_phone, customer_address,
    sale_date, sub_total, take_down_charges, delivery_charges, total_amount,
    transport_cost, net_profit, delivery_required, delivery_address, notes,
    created_at
"#;

/// Date-range and paging filter for sale listings.
#[derive(Debug, Clone)]
pub struct SaleListFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: i64,
    pub page_size: i64,
}

impl Default for SaleListFilter {
    fn default() -> Self {
        SaleListFilter {
            start_date: None,
            end_date: None,
            page: 1,
            page_size: 20,
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a sale as a single all-or-nothing unit of work: validates
    /// every line, decrements stock, computes all derived totals, persists
    /// the sale graph, and returns the fully resolved result.
    ///
    /// Any validation or storage failure aborts before anything becomes
    /// visible; no partial sale or partially decremented stock can persist.
    pub async fn create(&self, request: &SaleRequest) -> DbResult<SaleDetail> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create(request).await {
                Err(err)
                    if err.is_unique_violation_on("sale_number")
                        && attempt < SALE_NUMBER_RETRIES =>
                {
                    debug!(attempt, "Sale number collision, retrying transaction");
                    continue;
                }
                other => return other,
            }
        }
    }

    async fn try_create(&self, request: &SaleRequest) -> DbResult<SaleDetail> {
        let mut tx = self.pool.begin().await?;

        let items = load_item_snapshots(&mut tx, request).await?;

        // Pure pass: every check and every derived total, before any write.
        let priced: PricedSale = brickyard_core::price_sale(request, &items)?;

        let now = Utc::now();

        apply_stock_decrements(&mut tx, &priced, now).await?;

        let sale_number = next_sale_number(&mut tx, now).await?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number,
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: request.customer_phone.clone(),
            customer_address: request.customer_address.clone(),
            sale_date: request.sale_date,
            sub_total: priced.sub_total,
            take_down_charges: priced.take_down_charges,
            delivery_charges: priced.delivery_charges,
            total_amount: priced.total_amount,
            transport_cost: priced.transport_cost,
            net_profit: priced.net_profit,
            delivery_required: request.delivery_required,
            delivery_address: request.delivery_address.clone(),
            notes: request.notes.clone(),
            created_at: now,
        };

        insert_sale(&mut tx, &sale).await?;
        insert_sale_items(&mut tx, &sale.id, &priced).await?;
        if let Some(log) = &request.transport_log {
            insert_transport_log(&mut tx, &sale.id, log, now).await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            total = %sale.total_amount,
            lines = priced.lines.len(),
            "Sale created"
        );

        self.get_by_id(&sale.id)
            .await?
            .ok_or_else(|| DbError::Internal("created sale vanished".to_string()))
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes a sale and restores each referenced item's stock by the
    /// corresponding line quantity, atomically. The dependent sale items
    /// and transport log are removed by FK cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Sale", id));
        }

        let lines: Vec<(String, i64)> =
            sqlx::query_as("SELECT item_id, quantity FROM sale_items WHERE sale_id = ?1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let now = Utc::now();
        for (item_id, quantity) in &lines {
            sqlx::query(
                r#"
                UPDATE items SET stock_quantity = stock_quantity + ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(item_id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(sale_id = %id, restored_lines = lines.len(), "Sale deleted, stock restored");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a sale with its resolved lines and optional transport log.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleDetail>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        Ok(Some(self.load_detail(sale).await?))
    }

    /// Lists sales in a date range, newest first, with paging. Returns the
    /// page and the total match count (for the `X-Total-Count` header).
    /// `page` is floored at 1 and `page_size` clamped to 1..=100 here, for
    /// every caller.
    pub async fn list(&self, filter: &SaleListFilter) -> DbResult<(Vec<SaleDetail>, i64)> {
        let page = filter.page.max(1);
        let page_size = filter.page_size.clamp(1, 100);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sales
            WHERE (?1 IS NULL OR sale_date >= ?1)
              AND (?2 IS NULL OR sale_date <= ?2)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS} FROM sales
            WHERE (?1 IS NULL OR sale_date >= ?1)
              AND (?2 IS NULL OR sale_date <= ?2)
            ORDER BY sale_date DESC
            LIMIT ?3 OFFSET ?4
            "#
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(page_size)
            .bind((page - 1) * page_size)
            .fetch_all(&self.pool)
            .await?;

        let mut details = Vec::with_capacity(sales.len());
        for sale in sales {
            details.push(self.load_detail(sale).await?);
        }

        Ok((details, total))
    }

    async fn load_detail(&self, sale: Sale) -> DbResult<SaleDetail> {
        let sale_items = sqlx::query_as::<_, SaleLineView>(
            r#"
            SELECT
                si.id, si.sale_id, si.item_id, i.name AS item_name,
                si.quantity, si.unit_price, si.take_down_charge_per_unit,
                si.total_price, si.total_take_down_charges
            FROM sale_items si
            INNER JOIN items i ON i.id = si.item_id
            WHERE si.sale_id = ?1
            ORDER BY si.rowid
            "#,
        )
        .bind(&sale.id)
        .fetch_all(&self.pool)
        .await?;

        let transport_log = sqlx::query_as::<_, TransportLog>(
            r#"
            SELECT
                id, sale_id, vehicle_type, vehicle_number, driver_name,
                driver_phone, hire_cost, delivery_date, pickup_location,
                delivery_location, notes, created_at
            FROM transport_logs
            WHERE sale_id = ?1
            "#,
        )
        .bind(&sale.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(SaleDetail {
            sale,
            sale_items,
            transport_log,
        })
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Loads the current state of every item the request references, inside the
/// transaction. Items that don't exist are simply absent from the map; the
/// pricing pass reports them.
async fn load_item_snapshots(
    tx: &mut Transaction<'_, Sqlite>,
    request: &SaleRequest,
) -> DbResult<HashMap<String, Item>> {
    let mut items = HashMap::new();

    for line in &request.sale_items {
        if items.contains_key(&line.item_id) {
            continue;
        }

        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT
                id, name, description, category_id, size, price,
                stock_quantity, unit, take_down_charge_per_unit, is_active,
                created_at, updated_at
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(&line.item_id)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(item) = item {
            items.insert(item.id.clone(), item);
        }
    }

    Ok(items)
}

/// Applies the priced stock decrements. The `stock_quantity >= ?` guard
/// makes a lost-update race observable: zero rows affected means another
/// writer got there first, and the transaction aborts with `Conflict`.
async fn apply_stock_decrements(
    tx: &mut Transaction<'_, Sqlite>,
    priced: &PricedSale,
    now: DateTime<Utc>,
) -> DbResult<()> {
    for decrement in &priced.decrements {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET stock_quantity = stock_quantity - ?2, updated_at = ?3
            WHERE id = ?1 AND stock_quantity >= ?2
            "#,
        )
        .bind(&decrement.item_id)
        .bind(decrement.quantity)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::Conflict(format!(
                "stock for item {} changed during sale creation",
                decrement.item_id
            )));
        }
    }

    Ok(())
}

/// Generates the next sale number: `SALE-<YYYYMMDD>-<seq, zero-padded>`.
///
/// The sequence is the highest suffix ever issued plus one. A row count
/// would shrink when a sale is deleted and re-issue a number that still
/// exists; the maximum only ever grows.
///
/// Runs inside the creating transaction; the UNIQUE index on `sale_number`
/// catches the remaining race between concurrent creators, which the caller
/// resolves by retrying the whole transaction. The competitor's committed
/// row raises the maximum, so a retry always produces a fresh number.
async fn next_sale_number(tx: &mut Transaction<'_, Sqlite>, now: DateTime<Utc>) -> DbResult<String> {
    // The numeric suffix starts after "<PREFIX>-YYYYMMDD-" (substr is
    // 1-based).
    let suffix_start = SALE_NUMBER_PREFIX.len() + 11;
    let sql =
        format!("SELECT MAX(CAST(substr(sale_number, {suffix_start}) AS INTEGER)) FROM sales");
    let max_seq: Option<i64> = sqlx::query_scalar(&sql).fetch_one(&mut **tx).await?;

    let seq = max_seq.unwrap_or(0) + 1;
    Ok(format!(
        "{}-{}-{:0width$}",
        SALE_NUMBER_PREFIX,
        now.format("%Y%m%d"),
        seq,
        width = SALE_NUMBER_SEQ_WIDTH
    ))
}

async fn insert_sale(tx: &mut Transaction<'_, Sqlite>, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, sale_number, customer_name, customer_phone, customer_address,
            sale_date, sub_total, take_down_charges, delivery_charges,
            total_amount, transport_cost, net_profit, delivery_required,
            delivery_address, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.sale_number)
    .bind(&sale.customer_name)
    .bind(&sale.customer_phone)
    .bind(&sale.customer_address)
    .bind(sale.sale_date)
    .bind(sale.sub_total)
    .bind(sale.take_down_charges)
    .bind(sale.delivery_charges)
    .bind(sale.total_amount)
    .bind(sale.transport_cost)
    .bind(sale.net_profit)
    .bind(sale.delivery_required)
    .bind(&sale.delivery_address)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_sale_items(
    tx: &mut Transaction<'_, Sqlite>,
    sale_id: &str,
    priced: &PricedSale,
) -> DbResult<()> {
    for line in &priced.lines {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, item_id, quantity, unit_price,
                take_down_charge_per_unit, total_price, total_take_down_charges
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(sale_id)
        .bind(&line.item_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.take_down_charge_per_unit)
        .bind(line.total_price)
        .bind(line.total_take_down_charges)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn insert_transport_log(
    tx: &mut Transaction<'_, Sqlite>,
    sale_id: &str,
    log: &brickyard_core::TransportLogRequest,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transport_logs (
            id, sale_id, vehicle_type, vehicle_number, driver_name,
            driver_phone, hire_cost, delivery_date, pickup_location,
            delivery_location, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(sale_id)
    .bind(log.vehicle_type.trim())
    .bind(&log.vehicle_number)
    .bind(&log.driver_name)
    .bind(&log.driver_phone)
    .bind(log.hire_cost)
    .bind(log.delivery_date)
    .bind(&log.pickup_location)
    .bind(&log.delivery_location)
    .bind(&log.notes)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
