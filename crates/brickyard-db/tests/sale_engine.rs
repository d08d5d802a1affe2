//! End-to-end tests for the sale transaction engine against in-memory
//! SQLite: stock consistency, derived totals, atomic rejection, reversal,
//! and the read-side queries.

use chrono::Utc;

use brickyard_core::{
    Money, SaleDetail, SaleLineRequest, SaleRequest, TransportLogRequest,
};
use brickyard_db::{Database, DbConfig, DbError, ItemInput, SaleListFilter};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

async fn seed_item(db: &Database, name: &str, price_cents: i64, stock: i64) -> String {
    seed_item_in(db, name, price_cents, stock, None).await
}

async fn seed_item_in(
    db: &Database,
    name: &str,
    price_cents: i64,
    stock: i64,
    category_id: Option<String>,
) -> String {
    let category_id = match category_id {
        Some(id) => id,
        None => {
            db.categories()
                .insert(&format!("{name} category"), None)
                .await
                .expect("category")
                .id
        }
    };

    db.items()
        .insert(ItemInput {
            name: name.to_string(),
            description: None,
            category_id,
            size: None,
            price: Money::from_cents(price_cents),
            stock_quantity: stock,
            unit: None,
            take_down_charge_per_unit: None,
            is_active: true,
        })
        .await
        .expect("item")
        .id
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
        customer_name: "Ali Khan".to_string(),
        customer_phone: Some("0300-1234567".to_string()),
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

async fn stock_of(db: &Database, item_id: &str) -> i64 {
    db.items()
        .get_by_id(item_id)
        .await
        .expect("item query")
        .expect("item exists")
        .stock_quantity
}

// =============================================================================
// Setup
// =============================================================================

#[tokio::test]
async fn migrations_apply_on_connect() {
    let db = test_db().await;
    let (total, applied) = brickyard_db::migrations::migration_status(db.pool())
        .await
        .expect("migration status");
    assert!(total >= 1);
    assert_eq!(applied, total);
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn create_sale_computes_reference_totals() {
    let db = test_db().await;
    let item_id = seed_item(&db, "Red Brick", 1200, 1000).await;

    let mut req = request(vec![line(&item_id, 10, 1200, 200)]);
    req.delivery_charges = Money::from_cents(5000);

    let detail: SaleDetail = db.sales().create(&req).await.expect("sale created");

    assert_eq!(detail.sale.sub_total.cents(), 12000); // 120.00
    assert_eq!(detail.sale.take_down_charges.cents(), 2000); // 20.00
    assert_eq!(detail.sale.delivery_charges.cents(), 5000); // 50.00
    assert_eq!(detail.sale.total_amount.cents(), 19000); // 190.00
    assert_eq!(detail.sale.transport_cost.cents(), 0);
    assert_eq!(detail.sale.net_profit.cents(), 19000); // 190.00

    assert_eq!(detail.sale_items.len(), 1);
    assert_eq!(detail.sale_items[0].item_name, "Red Brick");
    assert_eq!(detail.sale_items[0].total_price.cents(), 12000);
    assert_eq!(detail.sale_items[0].total_take_down_charges.cents(), 2000);
    assert!(detail.transport_log.is_none());

    assert_eq!(stock_of(&db, &item_id).await, 990);

    let expected_number = format!("SALE-{}-0001", Utc::now().format("%Y%m%d"));
    assert_eq!(detail.sale.sale_number, expected_number);
}

#[tokio::test]
async fn totals_always_obey_invariants() {
    let db = test_db().await;
    let a = seed_item(&db, "Brick", 1200, 100).await;
    let b = seed_item(&db, "Block", 4500, 50).await;

    let mut req = request(vec![line(&a, 3, 1200, 150), line(&b, 2, 4500, 0)]);
    req.delivery_charges = Money::from_cents(2500);
    req.transport_log = Some(TransportLogRequest {
        vehicle_type: "Truck".to_string(),
        vehicle_number: Some("LEB-1234".to_string()),
        driver_name: Some("Bashir".to_string()),
        driver_phone: None,
        hire_cost: Money::from_cents(3000),
        delivery_date: Utc::now(),
        pickup_location: Some("Yard".to_string()),
        delivery_location: Some("Site 7".to_string()),
        notes: None,
    });

    let detail = db.sales().create(&req).await.expect("sale created");
    let sale = &detail.sale;

    assert_eq!(
        sale.total_amount,
        sale.sub_total + sale.take_down_charges + sale.delivery_charges
    );
    assert_eq!(sale.net_profit, sale.total_amount - sale.transport_cost);

    let log = detail.transport_log.as_ref().expect("transport log saved");
    assert_eq!(log.vehicle_type, "Truck");
    assert_eq!(log.hire_cost.cents(), 3000);
    assert_eq!(sale.transport_cost.cents(), 3000);
}

#[tokio::test]
async fn sale_numbers_increment_sequentially() {
    let db = test_db().await;
    let item_id = seed_item(&db, "Brick", 1000, 100).await;

    let day = Utc::now().format("%Y%m%d").to_string();
    for expected_seq in 1..=3 {
        let detail = db
            .sales()
            .create(&request(vec![line(&item_id, 1, 1000, 0)]))
            .await
            .expect("sale created");
        assert_eq!(
            detail.sale.sale_number,
            format!("SALE-{day}-{expected_seq:04}")
        );
    }
}

#[tokio::test]
async fn sale_numbers_are_never_reissued_after_a_delete() {
    let db = test_db().await;
    let item_id = seed_item(&db, "Brick", 1000, 100).await;
    let day = Utc::now().format("%Y%m%d").to_string();

    let first = db
        .sales()
        .create(&request(vec![line(&item_id, 1, 1000, 0)]))
        .await
        .expect("first sale");
    let second = db
        .sales()
        .create(&request(vec![line(&item_id, 1, 1000, 0)]))
        .await
        .expect("second sale");
    assert_eq!(second.sale.sale_number, format!("SALE-{day}-0002"));

    // Deleting an earlier sale must not shrink the sequence; the next
    // number would collide with one that still exists.
    db.sales().delete(&first.sale.id).await.expect("deleted");

    let third = db
        .sales()
        .create(&request(vec![line(&item_id, 1, 1000, 0)]))
        .await
        .expect("create after delete");
    assert_eq!(third.sale.sale_number, format!("SALE-{day}-0003"));
}

#[tokio::test]
async fn line_prices_are_snapshots_not_live_references() {
    let db = test_db().await;
    let item_id = seed_item(&db, "Brick", 1200, 100).await;

    // Sell at a negotiated price below the list price.
    let detail = db
        .sales()
        .create(&request(vec![line(&item_id, 5, 1100, 0)]))
        .await
        .expect("sale created");
    assert_eq!(detail.sale_items[0].unit_price.cents(), 1100);

    // Raising the item's price afterwards must not touch the sale.
    let item = db.items().get_by_id(&item_id).await.unwrap().unwrap();
    db.items()
        .update(
            &item_id,
            ItemInput {
                name: item.name.clone(),
                description: None,
                category_id: item.category_id.clone(),
                size: None,
                price: Money::from_cents(9999),
                stock_quantity: item.stock_quantity,
                unit: Some(item.unit.clone()),
                take_down_charge_per_unit: None,
                is_active: true,
            },
        )
        .await
        .expect("price update");

    let reloaded = db
        .sales()
        .get_by_id(&detail.sale.id)
        .await
        .unwrap()
        .expect("sale still there");
    assert_eq!(reloaded.sale_items[0].unit_price.cents(), 1100);
    assert_eq!(reloaded.sale.sub_total.cents(), 5500);
}

// =============================================================================
// Rejection (atomicity)
// =============================================================================

#[tokio::test]
async fn insufficient_stock_rejects_whole_sale_without_partial_decrement() {
    let db = test_db().await;
    let a = seed_item(&db, "Brick A", 1200, 5).await;
    let b = seed_item(&db, "Brick B", 1200, 10).await;

    // 3 of A would succeed alone; 100 of B cannot. The whole sale fails.
    let err = db
        .sales()
        .create(&request(vec![line(&a, 3, 1200, 0), line(&b, 100, 1200, 0)]))
        .await
        .expect_err("must be rejected");

    assert_eq!(
        err.to_string(),
        "Insufficient stock for item Brick B. Available: 10, Requested: 100"
    );

    assert_eq!(stock_of(&db, &a).await, 5);
    assert_eq!(stock_of(&db, &b).await, 10);

    let (sales, total) = db.sales().list(&SaleListFilter::default()).await.unwrap();
    assert!(sales.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn unknown_item_rejects_whole_sale_without_any_mutation() {
    let db = test_db().await;
    let a = seed_item(&db, "Brick", 1200, 50).await;

    let err = db
        .sales()
        .create(&request(vec![
            line(&a, 3, 1200, 0),
            line("no-such-item", 1, 100, 0),
        ]))
        .await
        .expect_err("must be rejected");

    assert_eq!(err.to_string(), "Item with ID no-such-item not found");
    assert_eq!(stock_of(&db, &a).await, 50);
}

// =============================================================================
// Deletion (reversal)
// =============================================================================

#[tokio::test]
async fn deleting_a_sale_restores_stock_exactly() {
    let db = test_db().await;
    let a = seed_item(&db, "Brick", 1200, 1000).await;
    let b = seed_item(&db, "Block", 4500, 200).await;

    let detail = db
        .sales()
        .create(&request(vec![line(&a, 10, 1200, 200), line(&b, 7, 4500, 0)]))
        .await
        .expect("sale created");

    assert_eq!(stock_of(&db, &a).await, 990);
    assert_eq!(stock_of(&db, &b).await, 193);

    db.sales().delete(&detail.sale.id).await.expect("deleted");

    assert_eq!(stock_of(&db, &a).await, 1000);
    assert_eq!(stock_of(&db, &b).await, 200);
    assert!(db.sales().get_by_id(&detail.sale.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_sale_cascades_to_lines_and_transport_log() {
    let db = test_db().await;
    let item_id = seed_item(&db, "Brick", 1200, 100).await;

    let mut req = request(vec![line(&item_id, 2, 1200, 0)]);
    req.transport_log = Some(TransportLogRequest {
        vehicle_type: "Pickup".to_string(),
        vehicle_number: None,
        driver_name: None,
        driver_phone: None,
        hire_cost: Money::from_cents(1500),
        delivery_date: Utc::now(),
        pickup_location: None,
        delivery_location: None,
        notes: None,
    });

    let detail = db.sales().create(&req).await.expect("sale created");
    db.sales().delete(&detail.sale.id).await.expect("deleted");

    let line_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
        .fetch_one(db.pool())
        .await
        .unwrap();
    let log_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transport_logs")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(line_count, 0);
    assert_eq!(log_count, 0);
}

#[tokio::test]
async fn deleting_missing_sale_is_not_found() {
    let db = test_db().await;
    let err = db.sales().delete("no-such-sale").await.expect_err("404");
    assert!(matches!(err, DbError::NotFound { .. }));
}

// =============================================================================
// Referential guards
// =============================================================================

#[tokio::test]
async fn item_with_sale_history_cannot_be_deleted() {
    let db = test_db().await;
    let item_id = seed_item(&db, "Brick", 1200, 100).await;

    db.sales()
        .create(&request(vec![line(&item_id, 1, 1200, 0)]))
        .await
        .expect("sale created");

    let err = db.items().delete(&item_id).await.expect_err("restricted");
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
}

#[tokio::test]
async fn category_with_items_cannot_be_deleted() {
    let db = test_db().await;
    let category = db.categories().insert("Bricks", None).await.unwrap();
    seed_item_in(&db, "Brick", 1200, 10, Some(category.id.clone())).await;

    let err = db
        .categories()
        .delete(&category.id)
        .await
        .expect_err("restricted");
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn list_pages_and_reports_total_count() {
    let db = test_db().await;
    let item_id = seed_item(&db, "Brick", 1000, 1000).await;

    for _ in 0..5 {
        db.sales()
            .create(&request(vec![line(&item_id, 1, 1000, 0)]))
            .await
            .expect("sale created");
    }

    let filter = SaleListFilter {
        page: 1,
        page_size: 2,
        ..Default::default()
    };
    let (page, total) = db.sales().list(&filter).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(total, 5);

    let filter = SaleListFilter {
        page: 3,
        page_size: 2,
        ..Default::default()
    };
    let (page, total) = db.sales().list(&filter).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(total, 5);

    // Out-of-range paging inputs are bounded by the repository itself.
    let filter = SaleListFilter {
        page: 0,
        page_size: 0,
        ..Default::default()
    };
    let (page, total) = db.sales().list(&filter).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(total, 5);
}

#[tokio::test]
async fn summary_aggregates_committed_sales() {
    let db = test_db().await;
    let item_id = seed_item(&db, "Brick", 1000, 1000).await;

    let mut req = request(vec![line(&item_id, 10, 1000, 0)]);
    req.delivery_charges = Money::from_cents(500);
    db.sales().create(&req).await.expect("first sale");

    let mut req = request(vec![line(&item_id, 5, 1000, 100)]);
    req.transport_log = Some(TransportLogRequest {
        vehicle_type: "Truck".to_string(),
        vehicle_number: None,
        driver_name: None,
        driver_phone: None,
        hire_cost: Money::from_cents(2000),
        delivery_date: Utc::now(),
        pickup_location: None,
        delivery_location: None,
        notes: None,
    });
    db.sales().create(&req).await.expect("second sale");

    let summary = db.reports().summary(None, None).await.unwrap();

    // Sale 1: total 105.00, profit 105.00. Sale 2: total 55.00, profit 35.00.
    assert_eq!(summary.total_orders, 2);
    assert_eq!(summary.total_sales.cents(), 10500 + 5500);
    assert_eq!(summary.total_profit.cents(), 10500 + 3500);
    assert_eq!(summary.total_transport_cost.cents(), 2000);
    assert_eq!(summary.daily_sales.len(), 1);
    assert_eq!(summary.daily_sales[0].orders, 2);
    assert_eq!(summary.daily_sales[0].sales.cents(), 16000);
}

#[tokio::test]
async fn income_report_breaks_revenue_down_by_category() {
    let db = test_db().await;
    let bricks = db.categories().insert("Bricks", None).await.unwrap();
    let blocks = db.categories().insert("Blocks", None).await.unwrap();
    let brick = seed_item_in(&db, "Red Brick", 1200, 1000, Some(bricks.id.clone())).await;
    let block = seed_item_in(&db, "Hollow Block", 4500, 500, Some(blocks.id.clone())).await;

    db.sales()
        .create(&request(vec![
            line(&brick, 10, 1200, 200),
            line(&block, 2, 4500, 0),
        ]))
        .await
        .expect("sale created");

    let report = db.reports().income_report("monthly", None, None).await.unwrap();

    assert_eq!(report.period, "monthly");
    assert_eq!(report.total_sales, 1);
    assert_eq!(report.category_breakdown.len(), 2);

    // Bricks revenue 120.00 + 20.00 take-down; Blocks revenue 90.00.
    let bricks_row = report
        .category_breakdown
        .iter()
        .find(|c| c.category_name == "Bricks")
        .expect("bricks row");
    assert_eq!(bricks_row.revenue.cents(), 14000);
    assert_eq!(bricks_row.quantity_sold, 10);

    let blocks_row = report
        .category_breakdown
        .iter()
        .find(|c| c.category_name == "Blocks")
        .expect("blocks row");
    assert_eq!(blocks_row.revenue.cents(), 9000);
    assert_eq!(blocks_row.quantity_sold, 2);
}

#[tokio::test]
async fn low_stock_lists_items_at_or_below_threshold() {
    let db = test_db().await;
    let category = db.categories().insert("Bricks", None).await.unwrap();
    seed_item_in(&db, "Scarce", 1200, 3, Some(category.id.clone())).await;
    seed_item_in(&db, "Exactly", 1200, 10, Some(category.id.clone())).await;
    seed_item_in(&db, "Plenty", 1200, 500, Some(category.id.clone())).await;

    let low = db.items().low_stock(10).await.unwrap();
    let names: Vec<&str> = low.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Scarce", "Exactly"]);
}
