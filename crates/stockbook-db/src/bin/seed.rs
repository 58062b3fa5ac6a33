//! # Seed Data Generator
//!
//! Populates a development database with stock items and sample sales.
//!
//! ## Usage
//! ```bash
//! # 60 items, 40 sales (default)
//! cargo run -p stockbook-db --bin seed
//!
//! # Custom amounts
//! cargo run -p stockbook-db --bin seed -- --items 200 --sales 500
//!
//! # Specify database path
//! cargo run -p stockbook-db --bin seed -- --db ./data/stockbook.db
//! ```
//!
//! Sales go through the regular sale processor, so stock levels and the
//! ledger stay consistent with each other.

use std::env;
use stockbook_core::{NewItem, SaleRequest};
use stockbook_db::{Database, DbConfig, DbError};

/// Item families for realistic test data
const FAMILIES: &[(&str, &[&str])] = &[
    (
        "Apparel",
        &[
            "Cotton Shirt",
            "Linen Shirt",
            "Denim Jeans",
            "Chinos",
            "Polo",
            "Hoodie",
            "Track Pants",
            "Socks",
            "Cap",
            "Scarf",
        ],
    ),
    (
        "Stationery",
        &[
            "Notebook",
            "Ball Pen",
            "Gel Pen",
            "Pencil Box",
            "Eraser",
            "Stapler",
            "Sticky Notes",
            "Marker",
            "Ruler",
            "File Folder",
        ],
    ),
    (
        "Grocery",
        &[
            "Basmati Rice",
            "Wheat Flour",
            "Sugar",
            "Tea",
            "Coffee",
            "Lentils",
            "Cooking Oil",
            "Salt",
            "Biscuits",
            "Honey",
        ],
    ),
];

/// Size variants with a price multiplier in percent
const SIZES: &[(&str, i64)] = &[("S", 100), ("M", 110), ("L", 125)];

/// Sample customers (name, contact)
const CUSTOMERS: &[(&str, &str)] = &[
    ("Asha Rao", "9876543210"),
    ("Ravi Kumar", "9123456780"),
    ("Meera Nair", "9988776655"),
    ("John Mathew", "9001122334"),
    ("Fatima Khan", "9812345670"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut item_count: usize = 60;
    let mut sale_count: usize = 40;
    let mut db_path = String::from("./stockbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--items" | "-i" => {
                if i + 1 < args.len() {
                    item_count = args[i + 1].parse().unwrap_or(item_count);
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sale_count = args[i + 1].parse().unwrap_or(sale_count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -i, --items <N>    Number of items to generate (default: 60)");
                println!("  -s, --sales <N>    Number of sales to record (default: 40)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockbook Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Items:    {}", item_count);
    println!("Sales:    {}", sale_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.inventory().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Items
    println!();
    println!("Generating items...");

    let start = std::time::Instant::now();
    let mut items = Vec::with_capacity(item_count);

    'outer: for (family_idx, (_, names)) in FAMILIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, multiplier)) in SIZES.iter().enumerate() {
                if items.len() >= item_count {
                    break 'outer;
                }

                let seed = family_idx * 1000 + name_idx * 20 + size_idx;
                let new_item = generate_item(name, size, *multiplier, seed);

                match db.inventory().add(&new_item).await {
                    Ok(item) => items.push(item),
                    Err(e) => eprintln!("Failed to insert {}: {}", new_item.name, e),
                }
            }
        }
    }

    println!("✓ Generated {} items in {:?}", items.len(), start.elapsed());

    // Sales
    println!();
    println!("Recording sales...");

    let mut recorded = 0;
    let mut skipped = 0;

    for n in 0..sale_count {
        if items.is_empty() {
            break;
        }

        let item = &items[(n * 7) % items.len()];
        let (name, contact) = CUSTOMERS[n % CUSTOMERS.len()];
        let quantity = 1 + (n % 3) as i64;
        let discount = [0.0, 0.0, 5.0, 10.0][n % 4];

        let request = SaleRequest::for_item(item, quantity, discount, name, contact);
        match db.sales().process_sale(&request).await {
            Ok(_) => recorded += 1,
            Err(DbError::Domain(_)) => skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }

    println!("✓ Recorded {} sales ({} skipped: out of stock)", recorded, skipped);

    let summary = db.reports().summary().await?;
    println!();
    println!("  Revenue:   {:.2}", summary.total_revenue);
    println!("  Discounts: {:.2}", summary.total_discount);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single item with deterministic data.
fn generate_item(name: &str, size: &str, multiplier: i64, seed: usize) -> NewItem {
    // Base price 20.00 - 519.00, scaled by size
    let base = 20 + ((seed * 37) % 500) as i64;
    let price = (base * multiplier) as f64 / 100.0;

    // Cost at 55-80% of price
    let cost_pct = 55 + (seed % 26) as i64;
    let cost_price = (price * cost_pct as f64 / 100.0 * 100.0).round() / 100.0;

    // Stock 0 - 40
    let quantity = (seed % 41) as i64;

    NewItem::new(format!("{} ({})", name, size), quantity, price, cost_price)
        .with_barcode(format!("890{:010}", seed))
}
