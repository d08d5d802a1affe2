//! # Sale Pricing Pass
//!
//! The computation half of the sale transaction engine.
//!
//! ## All Checks First, Mutate Second
//! ```text
//!   SaleRequest + item snapshots
//!        │
//!        ▼
//!   price_sale()            ← THIS MODULE (pure, no I/O)
//!        │
//!        ├── validates every field and every line
//!        ├── checks stock for every line (tracking stock claimed by
//!        │   earlier lines of the same request)
//!        └── computes every derived total
//!        │
//!        ▼
//!   PricedSale { lines, totals, stock decrements }
//!        │
//!        ▼
//!   SaleRepository::create   ← applies everything in ONE transaction
//! ```
//!
//! Because no mutation happens until validation has fully succeeded, a
//! failure partway through never needs partial rollback: the repository
//! either applies the whole `PricedSale` or nothing.
//!
//! ## Derived totals (invariants)
//! - per line: `total_price = unit_price × quantity`,
//!   `total_take_down_charges = take_down_charge_per_unit × quantity`
//! - `sub_total = Σ total_price`, `take_down_charges = Σ total_take_down`
//! - `total_amount = sub_total + take_down_charges + delivery_charges`
//! - `transport_cost = hire_cost` of the transport log, else 0
//! - `net_profit = total_amount - transport_cost`

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Item, SaleRequest};
use crate::validation::{
    quantity_within_limit, validate_non_negative, validate_optional_text, validate_quantity,
    validate_required_name,
};
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// Output Types
// =============================================================================

/// One fully priced sale line with its captured unit prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub take_down_charge_per_unit: Money,
    pub total_price: Money,
    pub total_take_down_charges: Money,
}

/// Stock to remove from one item, aggregated across all lines referencing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDecrement {
    pub item_id: String,
    pub quantity: i64,
}

/// The complete intended effect of a sale creation: priced lines, derived
/// totals, and the stock decrements to apply.
#[derive(Debug, Clone)]
pub struct PricedSale {
    pub lines: Vec<PricedLine>,
    /// One entry per distinct item, in order of first reference.
    pub decrements: Vec<StockDecrement>,
    pub sub_total: Money,
    pub take_down_charges: Money,
    pub delivery_charges: Money,
    pub total_amount: Money,
    pub transport_cost: Money,
    pub net_profit: Money,
}

// =============================================================================
// Pricing
// =============================================================================

/// Validates a sale request against item snapshots and computes every
/// derived field.
///
/// `items` maps item id to its current state (the caller loads exactly the
/// items the request references, inside the transaction that will apply the
/// result).
///
/// ## Failure semantics
/// Returns the first failure encountered, in input-line order; the caller
/// must not have mutated anything yet, so there is nothing to undo.
pub fn price_sale(request: &SaleRequest, items: &HashMap<String, Item>) -> CoreResult<PricedSale> {
    validate_required_name("customerName", &request.customer_name)?;
    validate_optional_text("customerAddress", request.customer_address.as_deref())?;
    validate_optional_text("deliveryAddress", request.delivery_address.as_deref())?;
    validate_optional_text("notes", request.notes.as_deref())?;
    validate_non_negative("deliveryCharges", request.delivery_charges)?;

    if request.sale_items.is_empty() {
        return Err(CoreError::EmptySale);
    }

    let transport_cost = match &request.transport_log {
        Some(log) => {
            validate_required_name("vehicleType", &log.vehicle_type)?;
            validate_optional_text("pickupLocation", log.pickup_location.as_deref())?;
            validate_optional_text("deliveryLocation", log.delivery_location.as_deref())?;
            validate_non_negative("hireCost", log.hire_cost)?
        }
        None => Money::zero(),
    };

    // Stock remaining per item as lines claim it, so duplicate-item lines
    // are checked against what earlier lines left over.
    let mut remaining: HashMap<&str, i64> = HashMap::new();
    let mut decrement_order: Vec<String> = Vec::new();
    let mut decrements: HashMap<String, i64> = HashMap::new();

    let mut lines = Vec::with_capacity(request.sale_items.len());
    let mut sub_total = Money::zero();
    let mut take_down_charges = Money::zero();

    for line in &request.sale_items {
        validate_quantity("quantity", line.quantity)?;
        if !quantity_within_limit(line.quantity) {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        validate_non_negative("unitPrice", line.unit_price)?;
        validate_non_negative("takeDownChargePerUnit", line.take_down_charge_per_unit)?;

        let item = items
            .get(&line.item_id)
            .ok_or_else(|| CoreError::ItemNotFound(line.item_id.clone()))?;

        let available = *remaining
            .entry(item.id.as_str())
            .or_insert(item.stock_quantity);
        if available < line.quantity {
            return Err(CoreError::InsufficientStock {
                name: item.name.clone(),
                available,
                requested: line.quantity,
            });
        }
        remaining.insert(item.id.as_str(), available - line.quantity);

        if !decrements.contains_key(&line.item_id) {
            decrement_order.push(line.item_id.clone());
        }
        *decrements.entry(line.item_id.clone()).or_insert(0) += line.quantity;

        let total_price = line
            .unit_price
            .checked_multiply_quantity(line.quantity)
            .ok_or(CoreError::AmountTooLarge)?;
        let total_take_down = line
            .take_down_charge_per_unit
            .checked_multiply_quantity(line.quantity)
            .ok_or(CoreError::AmountTooLarge)?;

        sub_total = sub_total
            .checked_add(total_price)
            .ok_or(CoreError::AmountTooLarge)?;
        take_down_charges = take_down_charges
            .checked_add(total_take_down)
            .ok_or(CoreError::AmountTooLarge)?;

        lines.push(PricedLine {
            item_id: line.item_id.clone(),
            item_name: item.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            take_down_charge_per_unit: line.take_down_charge_per_unit,
            total_price,
            total_take_down_charges: total_take_down,
        });
    }

    let total_amount = sub_total
        .checked_add(take_down_charges)
        .and_then(|amount| amount.checked_add(request.delivery_charges))
        .ok_or(CoreError::AmountTooLarge)?;
    // Both operands are non-negative and in range, so this cannot wrap.
    let net_profit = total_amount - transport_cost;

    let decrements = decrement_order
        .into_iter()
        .map(|item_id| {
            let quantity = decrements[&item_id];
            StockDecrement { item_id, quantity }
        })
        .collect();

    Ok(PricedSale {
        lines,
        decrements,
        sub_total,
        take_down_charges,
        delivery_charges: request.delivery_charges,
        total_amount,
        transport_cost,
        net_profit,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SaleLineRequest, TransportLogRequest};
    use chrono::Utc;

    fn item(id: &str, name: &str, price_cents: i64, stock: i64) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            category_id: "cat-1".to_string(),
            size: None,
            price: Money::from_cents(price_cents),
            stock_quantity: stock,
            unit: "pieces".to_string(),
            take_down_charge_per_unit: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn items(list: Vec<Item>) -> HashMap<String, Item> {
        list.into_iter().map(|i| (i.id.clone(), i)).collect()
    }

    fn line(item_id: &str, quantity: i64, price_cents: i64, charge_cents: i64) -> SaleLineRequest {
        SaleLineRequest {
            item_id: item_id.to_string(),
            quantity,
            unit_price: Money::from_cents(price_cents),
            take_down_charge_per_unit: Money::from_cents(charge_cents),
        }
    }

    fn request(lines: Vec<SaleLineRequest>) -> SaleRequest {
        SaleRequest {
            customer_name: "Ali".to_string(),
            customer_phone: None,
            customer_address: None,
            sale_date: Utc::now(),
            delivery_required: false,
            delivery_address: None,
            delivery_charges: Money::zero(),
            notes: None,
            sale_items: lines,
            transport_log: None,
        }
    }

    #[test]
    fn prices_the_reference_sale() {
        // Item at 12.00 with stock 1000; one line of 10 at 12.00 with a
        // 2.00 take-down charge and 50.00 delivery.
        let store = items(vec![item("item-1", "Red Brick", 1200, 1000)]);
        let mut req = request(vec![line("item-1", 10, 1200, 200)]);
        req.delivery_charges = Money::from_cents(5000);

        let priced = price_sale(&req, &store).unwrap();

        assert_eq!(priced.sub_total.cents(), 12000); // 120.00
        assert_eq!(priced.take_down_charges.cents(), 2000); // 20.00
        assert_eq!(priced.total_amount.cents(), 19000); // 190.00
        assert_eq!(priced.transport_cost.cents(), 0);
        assert_eq!(priced.net_profit.cents(), 19000); // 190.00
        assert_eq!(
            priced.decrements,
            vec![StockDecrement {
                item_id: "item-1".to_string(),
                quantity: 10
            }]
        );
    }

    #[test]
    fn totals_obey_the_invariants() {
        let store = items(vec![
            item("a", "Brick", 1200, 100),
            item("b", "Block", 4500, 50),
        ]);
        let mut req = request(vec![line("a", 3, 1200, 150), line("b", 2, 4500, 0)]);
        req.delivery_charges = Money::from_cents(2500);
        req.transport_log = Some(TransportLogRequest {
            vehicle_type: "Truck".to_string(),
            vehicle_number: None,
            driver_name: None,
            driver_phone: None,
            hire_cost: Money::from_cents(3000),
            delivery_date: Utc::now(),
            pickup_location: None,
            delivery_location: None,
            notes: None,
        });

        let priced = price_sale(&req, &store).unwrap();

        assert_eq!(
            priced.total_amount,
            priced.sub_total + priced.take_down_charges + priced.delivery_charges
        );
        assert_eq!(priced.net_profit, priced.total_amount - priced.transport_cost);
        assert_eq!(priced.sub_total.cents(), 3 * 1200 + 2 * 4500);
        assert_eq!(priced.take_down_charges.cents(), 3 * 150);
        assert_eq!(priced.transport_cost.cents(), 3000);
    }

    #[test]
    fn rejects_unknown_item() {
        let store = items(vec![item("a", "Brick", 1200, 100)]);
        let req = request(vec![line("a", 1, 1200, 0), line("ghost", 1, 100, 0)]);

        let err = price_sale(&req, &store).unwrap_err();
        assert!(matches!(err, CoreError::ItemNotFound(ref id) if id == "ghost"));
    }

    #[test]
    fn rejects_insufficient_stock_for_any_line() {
        // A has 5, B has 10; requesting 3 of A and 100 of B fails as a whole.
        let store = items(vec![
            item("a", "Brick A", 1200, 5),
            item("b", "Brick B", 1200, 10),
        ]);
        let req = request(vec![line("a", 3, 1200, 0), line("b", 100, 1200, 0)]);

        let err = price_sale(&req, &store).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                name,
                available,
                requested,
            } => {
                assert_eq!(name, "Brick B");
                assert_eq!(available, 10);
                assert_eq!(requested, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_lines_cannot_jointly_overdraw() {
        // Stock 10; 7 + 7 across two lines must fail on the second line
        // with only 3 remaining.
        let store = items(vec![item("a", "Brick", 1200, 10)]);
        let req = request(vec![line("a", 7, 1200, 0), line("a", 7, 1200, 0)]);

        let err = price_sale(&req, &store).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 3);
                assert_eq!(requested, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_lines_aggregate_into_one_decrement() {
        let store = items(vec![item("a", "Brick", 1200, 10)]);
        let req = request(vec![line("a", 4, 1200, 0), line("a", 3, 1100, 0)]);

        let priced = price_sale(&req, &store).unwrap();
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(
            priced.decrements,
            vec![StockDecrement {
                item_id: "a".to_string(),
                quantity: 7
            }]
        );
    }

    #[test]
    fn rejects_empty_line_list() {
        let store = items(vec![]);
        let req = request(vec![]);
        assert!(matches!(
            price_sale(&req, &store),
            Err(CoreError::EmptySale)
        ));
    }

    #[test]
    fn rejects_non_positive_quantity_and_negative_amounts() {
        let store = items(vec![item("a", "Brick", 1200, 100)]);

        let req = request(vec![line("a", 0, 1200, 0)]);
        assert!(matches!(
            price_sale(&req, &store),
            Err(CoreError::Validation(_))
        ));

        let req = request(vec![line("a", 1, -100, 0)]);
        assert!(matches!(
            price_sale(&req, &store),
            Err(CoreError::Validation(_))
        ));

        let req = request(vec![line("a", 1, 100, -50)]);
        assert!(matches!(
            price_sale(&req, &store),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_amounts_that_would_overflow() {
        let store = items(vec![item("a", "Brick", 1200, 2000)]);

        // A single line whose total cannot be represented.
        let req = request(vec![line("a", 1000, i64::MAX / 2, 0)]);
        assert!(matches!(
            price_sale(&req, &store),
            Err(CoreError::AmountTooLarge)
        ));

        // Lines that are fine alone but overflow when summed.
        let req = request(vec![
            line("a", 1, i64::MAX - 1, 0),
            line("a", 1, i64::MAX - 1, 0),
        ]);
        assert!(matches!(
            price_sale(&req, &store),
            Err(CoreError::AmountTooLarge)
        ));
    }

    #[test]
    fn rejects_blank_customer_name() {
        let store = items(vec![item("a", "Brick", 1200, 100)]);
        let mut req = request(vec![line("a", 1, 1200, 0)]);
        req.customer_name = "  ".to_string();
        assert!(matches!(
            price_sale(&req, &store),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn transport_log_hire_cost_feeds_net_profit() {
        let store = items(vec![item("a", "Brick", 1200, 100)]);
        let mut req = request(vec![line("a", 10, 1200, 200)]);
        req.delivery_charges = Money::from_cents(5000);
        req.transport_log = Some(TransportLogRequest {
            vehicle_type: "Loader".to_string(),
            vehicle_number: Some("ABC-123".to_string()),
            driver_name: None,
            driver_phone: None,
            hire_cost: Money::from_cents(4000),
            delivery_date: Utc::now(),
            pickup_location: None,
            delivery_location: None,
            notes: None,
        });

        let priced = price_sale(&req, &store).unwrap();
        assert_eq!(priced.total_amount.cents(), 19000);
        assert_eq!(priced.transport_cost.cents(), 4000);
        assert_eq!(priced.net_profit.cents(), 15000);
    }
}
