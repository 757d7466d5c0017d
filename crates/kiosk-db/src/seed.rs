//! # Default Menu
//!
//! The menu a fresh kiosk starts with. Seeding is an upsert keyed by
//! name/label, so running it twice leaves one copy of every row and resets
//! prices to these values.

use serde::Serialize;
use tracing::info;

use kiosk_core::Money;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::catalog::{upsert_coffee, upsert_creamer, upsert_size, upsert_sweetener};

/// (name, description, base price in cents)
pub const DEFAULT_COFFEES: &[(&str, &str, i64)] = &[
    ("Espresso", "A concentrated shot of coffee", 250),
    ("Latte", "Espresso with steamed milk", 340),
    ("Cappuccino", "Espresso with steamed milk and foam", 375),
    ("Mocha", "Espresso with chocolate and steamed milk", 395),
];

/// (label, ounces, price modifier in cents)
pub const DEFAULT_SIZES: &[(&str, i64, i64)] = &[
    ("Small", 8, 0),
    ("Medium", 12, 75),
    ("Large", 16, 125),
];

/// (name, additional cost in cents)
pub const DEFAULT_SWEETENERS: &[(&str, i64)] = &[
    ("Sugar", 10),
    ("Honey", 25),
    ("Stevia", 20),
    ("Maple Syrup", 35),
];

/// (name, is flavored, additional cost in cents)
pub const DEFAULT_CREAMERS: &[(&str, bool, i64)] = &[
    ("Half & Half", false, 20),
    ("Vanilla Creamer", true, 35),
    ("Hazelnut Creamer", true, 35),
    ("Caramel Creamer", true, 40),
];

/// Row counts written by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub coffees: usize,
    pub sizes: usize,
    pub sweeteners: usize,
    pub creamers: usize,
}

/// Writes the default menu in a single transaction.
pub async fn seed_default_menu(db: &Database) -> DbResult<SeedReport> {
    let mut tx = db.pool().begin().await?;
    let mut report = SeedReport::default();

    for (name, description, cents) in DEFAULT_COFFEES {
        upsert_coffee(&mut tx, name, Some(*description), Money::from_cents(*cents)).await?;
        report.coffees += 1;
    }
    for (label, ounces, cents) in DEFAULT_SIZES {
        upsert_size(&mut tx, label, *ounces, Money::from_cents(*cents)).await?;
        report.sizes += 1;
    }
    for (name, cents) in DEFAULT_SWEETENERS {
        upsert_sweetener(&mut tx, name, Money::from_cents(*cents)).await?;
        report.sweeteners += 1;
    }
    for (name, flavored, cents) in DEFAULT_CREAMERS {
        upsert_creamer(&mut tx, name, *flavored, Money::from_cents(*cents)).await?;
        report.creamers += 1;
    }

    tx.commit().await?;

    info!(
        coffees = report.coffees,
        sizes = report.sizes,
        sweeteners = report.sweeteners,
        creamers = report.creamers,
        "Default menu seeded"
    );
    Ok(report)
}
