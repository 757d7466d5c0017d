//! # Default Menu Seeder
//!
//! Creates (or migrates) a kiosk database and writes the default menu.
//!
//! ## Usage
//! ```bash
//! # Seed ./kiosk.db (or $KIOSK_DB_PATH)
//! cargo run -p kiosk-db --bin seed
//!
//! # Specify database path
//! cargo run -p kiosk-db --bin seed -- --db ./data/kiosk.db
//! ```

use std::env;

use kiosk_db::{seed_default_menu, Database, DbConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("KIOSK_DB_PATH").unwrap_or_else(|_| String::from("./kiosk.db"));

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
                println!("Coffee Kiosk Menu Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kiosk.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Coffee Kiosk Menu Seeder");
    println!("========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let report = seed_default_menu(&db).await?;
    println!(
        "✓ Seeded {} coffees, {} sizes, {} sweeteners, {} creamers",
        report.coffees, report.sizes, report.sweeteners, report.creamers
    );

    db.close().await;
    Ok(())
}
