//! # Seed Data Generator
//!
//! Populates the database with test inventory for development.
//!
//! ## Usage
//! ```bash
//! # Generate the default catalog
//! cargo run -p lelca-db --bin seed
//!
//! # Specify database path
//! cargo run -p lelca-db --bin seed -- --db ./data/lelca.db
//! ```
//!
//! Items are named in the "Base (variant)" pattern so the grouped
//! inventory view has something to group, and quantities span every
//! stock-alert bucket (out of stock through well stocked).

use std::env;

use lelca_core::NewInventoryItem;
use lelca_db::{Database, DbConfig};

/// (name, material, quantity, price_cents)
const CATALOG: &[(&str, &str, i64, i64)] = &[
    ("Coke (350ml)", "Glass bottle", 48, 450),
    ("Coke (500ml)", "PET bottle", 24, 700),
    ("Coke (1L)", "PET bottle", 9, 1200),
    ("Fanta (350ml)", "Glass bottle", 2, 450),
    ("Sprite (350ml)", "Glass bottle", 0, 450),
    ("Hammer (Claw)", "Fibreglass handle", 7, 2500),
    ("Hammer (Sledge)", "Hickory handle", 3, 6500),
    ("Nails (2 inch)", "Galvanized steel, 1kg box", 35, 800),
    ("Nails (4 inch)", "Galvanized steel, 1kg box", 12, 950),
    ("Paint Brush (2 inch)", "Synthetic bristle", 15, 600),
    ("Paint Brush (4 inch)", "Synthetic bristle", 5, 900),
    ("Padlock", "Brass, 40mm", 18, 1500),
    ("Extension Cord (5m)", "13A, surge protected", 6, 3200),
    ("Light Bulb (E27 9W)", "LED, warm white", 60, 550),
    ("Light Bulb (E27 12W)", "LED, cool white", 1, 750),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./lelca_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("LELCA POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./lelca_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("LELCA POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
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

    let rows: Vec<NewInventoryItem> = CATALOG
        .iter()
        .map(|(name, material, quantity, price_cents)| NewInventoryItem {
            item_name: (*name).to_string(),
            material_details: (*material).to_string(),
            quantity: *quantity,
            price_cents: *price_cents,
            qr_code: None,
            image: None,
        })
        .collect();

    let items = db.inventory().insert_many(rows, None).await?;

    println!();
    println!("✓ Seeded {} inventory items", items.len());

    Ok(())
}
