//! # Domain Types
//!
//! Core domain types for the brickyard inventory/sales system.
//!
//! ## Entity Graph
//! ```text
//!   Category ──< Item ──< SaleItem >── Sale ──? TransportLog
//!
//!   Category owns Items (delete restricted while items exist)
//!   Sale owns its SaleItems and optional TransportLog (cascade on delete)
//!   Item is referenced by SaleItems (delete restricted while history exists)
//! ```
//!
//! Relationships are plain foreign-key id fields resolved by explicit
//! lookups, never embedded back-references. This keeps every entity a plain
//! record with no cyclic ownership.
//!
//! ## Dual-Key Identity Pattern
//! Entities carry an `id` (UUID v4, immutable, used for relations). A Sale
//! additionally carries a human-readable business identifier, the
//! `sale_number` (`SALE-YYYYMMDD-NNNN`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Inventory Entities
// =============================================================================

/// A product category (bricks, blocks, cylinders, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique across categories.
    pub name: String,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// An inventory item belonging to exactly one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    /// Owning category (required foreign key).
    pub category_id: String,

    /// Optional size label ("9 inch", "6x4", ...).
    pub size: Option<String>,

    /// Unit price. Never negative.
    pub price: Money,

    /// Current stock. Never goes negative; mutated only by the sale engine
    /// and the explicit stock-overwrite operation.
    pub stock_quantity: i64,

    /// Unit of measure label.
    pub unit: String,

    /// Optional per-unit take-down (handling) charge.
    pub take_down_charge_per_unit: Option<Money>,

    /// Soft-delete flag.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    /// Set whenever stock or details change.
    pub updated_at: Option<DateTime<Utc>>,
}

/// An item joined with its category name, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
    pub category_name: String,
    pub size: Option<String>,
    pub price: Money,
    pub stock_quantity: i64,
    pub unit: String,
    pub take_down_charge_per_unit: Option<Money>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Sale Entities
// =============================================================================

/// A committed sale with all derived monetary totals.
///
/// Invariants (enforced by the pricing pass, never client-settable):
/// - `total_amount = sub_total + take_down_charges + delivery_charges`
/// - `net_profit = total_amount - transport_cost`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable business identifier: `SALE-YYYYMMDD-NNNN`.
    pub sale_number: String,

    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,

    pub sale_date: DateTime<Utc>,

    /// Sum of line totals (unit price × quantity).
    pub sub_total: Money,

    /// Sum of per-line take-down charges.
    pub take_down_charges: Money,

    /// Delivery charge billed to the customer.
    pub delivery_charges: Money,

    /// `sub_total + take_down_charges + delivery_charges`.
    pub total_amount: Money,

    /// The business's own vehicle-hire cost (0 without a transport log).
    pub transport_cost: Money,

    /// `total_amount - transport_cost`.
    pub net_profit: Money,

    pub delivery_required: bool,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// A sale line. Price and take-down charge are captured at sale time and
/// never re-read from the item afterwards (price history stays frozen).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub item_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub take_down_charge_per_unit: Money,
    /// `unit_price * quantity`.
    pub total_price: Money,
    /// `take_down_charge_per_unit * quantity`.
    pub total_take_down_charges: Money,
}

/// A sale line joined with its item name, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleLineView {
    pub id: String,
    pub sale_id: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub take_down_charge_per_unit: Money,
    pub total_price: Money,
    pub total_take_down_charges: Money,
}

/// Optional 1:1 transport record for a delivered sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TransportLog {
    pub id: String,
    pub sale_id: String,
    pub vehicle_type: String,
    pub vehicle_number: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    /// Feeds the sale's `transport_cost`.
    pub hire_cost: Money,
    pub delivery_date: DateTime<Utc>,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A sale with its resolved line items and optional transport log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub sale_items: Vec<SaleLineView>,
    pub transport_log: Option<TransportLog>,
}

// =============================================================================
// Request Descriptors
// =============================================================================

/// A sale-creation request as submitted by the client. Only inputs; every
/// derived total is computed by the pricing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    pub sale_date: DateTime<Utc>,
    #[serde(default)]
    pub delivery_required: bool,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub delivery_charges: Money,
    #[serde(default)]
    pub notes: Option<String>,
    pub sale_items: Vec<SaleLineRequest>,
    #[serde(default)]
    pub transport_log: Option<TransportLogRequest>,
}

/// One requested sale line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub item_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    #[serde(default)]
    pub take_down_charge_per_unit: Money,
}

/// Requested transport record accompanying a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportLogRequest {
    pub vehicle_type: String,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_phone: Option<String>,
    pub hire_cost: Money,
    pub delivery_date: DateTime<Utc>,
    #[serde(default)]
    pub pickup_location: Option<String>,
    #[serde(default)]
    pub delivery_location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Report Views
// =============================================================================

/// Aggregate summary over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales: Money,
    pub total_profit: Money,
    pub total_transport_cost: Money,
    pub total_orders: i64,
    pub daily_sales: Vec<DailySales>,
}

/// One calendar day's totals within a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: Money,
    pub profit: Money,
    pub orders: i64,
}

/// Income report with per-category revenue breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReport {
    pub period: String,
    pub total_revenue: Money,
    pub total_profit: Money,
    pub total_transport_cost: Money,
    pub total_sales: i64,
    pub category_breakdown: Vec<CategorySales>,
}

/// Revenue attributed to one category: `Σ(total_price + total_take_down)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category_name: String,
    pub revenue: Money,
    pub quantity_sold: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_request_fills_defaults() {
        let json = serde_json::json!({
            "customerName": "Ali",
            "saleDate": "2025-01-15T09:00:00Z",
            "saleItems": [
                { "itemId": "item-1", "quantity": 10, "unitPrice": 12.0 }
            ]
        });
        let req: SaleRequest = serde_json::from_value(json).unwrap();
        assert!(!req.delivery_required);
        assert!(req.delivery_charges.is_zero());
        assert!(req.transport_log.is_none());
        assert!(req.sale_items[0].take_down_charge_per_unit.is_zero());
    }

    #[test]
    fn sale_detail_flattens_sale_fields() {
        let sale = Sale {
            id: "s-1".into(),
            sale_number: "SALE-20250115-0001".into(),
            customer_name: "Ali".into(),
            customer_phone: None,
            customer_address: None,
            sale_date: Utc::now(),
            sub_total: Money::from_cents(12000),
            take_down_charges: Money::from_cents(2000),
            delivery_charges: Money::from_cents(5000),
            total_amount: Money::from_cents(19000),
            transport_cost: Money::zero(),
            net_profit: Money::from_cents(19000),
            delivery_required: false,
            delivery_address: None,
            notes: None,
            created_at: Utc::now(),
        };
        let detail = SaleDetail {
            sale,
            sale_items: vec![],
            transport_log: None,
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["saleNumber"], "SALE-20250115-0001");
        assert_eq!(value["totalAmount"], 190.0);
        assert!(value["saleItems"].is_array());
    }
}
