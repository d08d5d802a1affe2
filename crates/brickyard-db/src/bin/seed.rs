//! # Seed Data Generator
//!
//! Populates the database with development data: the three product
//! categories and a handful of items each.
//!
//! ## Usage
//! ```bash
//! cargo run -p brickyard-db --bin seed
//! cargo run -p brickyard-db --bin seed -- --db ./data/brickyard.db
//! ```

use std::env;

use brickyard_core::Money;
use brickyard_db::{Database, DbConfig, ItemInput};

/// name, (item name, size, price cents, stock, take-down cents)
const CATALOG: &[(&str, &[(&str, &str, i64, i64, i64)])] = &[
    (
        "Bricks",
        &[
            ("Red Clay Brick", "9 inch", 1200, 5000, 200),
            ("Fly Ash Brick", "9 inch", 900, 3000, 200),
            ("Fire Brick", "9 inch", 2500, 400, 300),
        ],
    ),
    (
        "Blocks",
        &[
            ("Hollow Block", "6x8x16", 4500, 1200, 500),
            ("Solid Block", "6x8x16", 5200, 800, 500),
            ("Paving Block", "8x4", 3000, 2000, 250),
        ],
    ),
    (
        "Cylinders",
        &[
            ("Concrete Cylinder", "12 inch", 15000, 150, 1000),
            ("Test Cylinder", "6 inch", 8000, 60, 0),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = parse_db_arg().unwrap_or_else(|| "brickyard.db".to_string());
    println!("Seeding {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let mut item_count = 0;
    for (category_name, items) in CATALOG {
        let category = db.categories().insert(category_name, None).await?;
        println!("  category {category_name} ({})", category.id);

        for (name, size, price_cents, stock, take_down_cents) in *items {
            db.items()
                .insert(ItemInput {
                    name: name.to_string(),
                    description: None,
                    category_id: category.id.clone(),
                    size: Some(size.to_string()),
                    price: Money::from_cents(*price_cents),
                    stock_quantity: *stock,
                    unit: None,
                    take_down_charge_per_unit: if *take_down_cents > 0 {
                        Some(Money::from_cents(*take_down_cents))
                    } else {
                        None
                    },
                    is_active: true,
                })
                .await?;
            item_count += 1;
        }
    }

    println!("Seeded {} categories, {item_count} items", CATALOG.len());
    Ok(())
}

fn parse_db_arg() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
