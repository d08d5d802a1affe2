//! # Report Repository
//!
//! Read-side aggregation over committed sales. Pure grouping and summation;
//! no invariants of its own beyond correct grouping.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use brickyard_core::{CategorySales, DailySales, IncomeReport, Money, SalesSummary};

use crate::error::{DbError, DbResult};

/// Repository for summary and income-report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales summary over a date range: overall totals plus a per-day
    /// breakdown ordered by date.
    pub async fn summary(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> DbResult<SalesSummary> {
        let (total_sales, total_profit, total_transport_cost, total_orders): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COALESCE(SUM(total_amount), 0),
                    COALESCE(SUM(net_profit), 0),
                    COALESCE(SUM(transport_cost), 0),
                    COUNT(*)
                FROM sales
                WHERE (?1 IS NULL OR sale_date >= ?1)
                  AND (?2 IS NULL OR sale_date <= ?2)
                "#,
            )
            .bind(start_date)
            .bind(end_date)
            .fetch_one(&self.pool)
            .await?;

        let daily_rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                date(sale_date) AS day,
                SUM(total_amount),
                SUM(net_profit),
                COUNT(*)
            FROM sales
            WHERE (?1 IS NULL OR sale_date >= ?1)
              AND (?2 IS NULL OR sale_date <= ?2)
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        let daily_sales = daily_rows
            .into_iter()
            .map(|(day, sales, profit, orders)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| DbError::Internal(format!("bad day group '{day}': {e}")))?;
                Ok(DailySales {
                    date,
                    sales: Money::from_cents(sales),
                    profit: Money::from_cents(profit),
                    orders,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(SalesSummary {
            total_sales: Money::from_cents(total_sales),
            total_profit: Money::from_cents(total_profit),
            total_transport_cost: Money::from_cents(total_transport_cost),
            total_orders,
            daily_sales,
        })
    }

    /// Income report: overall totals plus revenue per category, where a
    /// category's revenue is `Σ(total_price + total_take_down_charges)` of
    /// its sold lines. `period` is a client-chosen label echoed back.
    pub async fn income_report(
        &self,
        period: &str,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> DbResult<IncomeReport> {
        let (total_revenue, total_profit, total_transport_cost, total_sales): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COALESCE(SUM(total_amount), 0),
                    COALESCE(SUM(net_profit), 0),
                    COALESCE(SUM(transport_cost), 0),
                    COUNT(*)
                FROM sales
                WHERE (?1 IS NULL OR sale_date >= ?1)
                  AND (?2 IS NULL OR sale_date <= ?2)
                "#,
            )
            .bind(start_date)
            .bind(end_date)
            .fetch_one(&self.pool)
            .await?;

        let breakdown_rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                c.name,
                SUM(si.total_price + si.total_take_down_charges) AS revenue,
                SUM(si.quantity)
            FROM sale_items si
            INNER JOIN items i ON i.id = si.item_id
            INNER JOIN categories c ON c.id = i.category_id
            INNER JOIN sales s ON s.id = si.sale_id
            WHERE (?1 IS NULL OR s.sale_date >= ?1)
              AND (?2 IS NULL OR s.sale_date <= ?2)
            GROUP BY c.name
            ORDER BY revenue DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        let category_breakdown = breakdown_rows
            .into_iter()
            .map(|(category_name, revenue, quantity_sold)| CategorySales {
                category_name,
                revenue: Money::from_cents(revenue),
                quantity_sold,
            })
            .collect();

        Ok(IncomeReport {
            period: period.to_string(),
            total_revenue: Money::from_cents(total_revenue),
            total_profit: Money::from_cents(total_profit),
            total_transport_cost: Money::from_cents(total_transport_cost),
            total_sales,
            category_breakdown,
        })
    }
}
