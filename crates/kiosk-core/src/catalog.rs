//! # Catalog Lookup
//!
//! An immutable, id-indexed snapshot of the menu.
//!
//! ## How Lookups Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kiosk-db reads the four tables in ONE transaction                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Catalog::new(coffees, sizes, sweeteners, creamers)                     │
//! │       │  sort lists (name; sizes by ounces)                             │
//! │       │  build id → position maps once                                  │
//! │       ▼                                                                 │
//! │  ┌───────────────┐        ┌──────────────────────────┐                  │
//! │  │ coffee_index  │ 3 ───► │ coffees[1] = Latte $3.40 │   O(1) per id    │
//! │  └───────────────┘        └──────────────────────────┘                  │
//! │                                                                         │
//! │  Pricing, cart summaries and checkout all read the same snapshot.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::Collection;
use crate::types::{Coffee, Creamer, Size, Sweetener};

// =============================================================================
// Snapshot (wire shape)
// =============================================================================

/// The catalog as sent to the kiosk front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogSnapshot {
    pub coffees: Vec<Coffee>,
    pub sizes: Vec<Size>,
    pub sweeteners: Vec<Sweetener>,
    pub creamers: Vec<Creamer>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Read-only menu with constant-time lookups by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    snapshot: CatalogSnapshot,
    coffee_index: HashMap<i64, usize>,
    size_index: HashMap<i64, usize>,
    sweetener_index: HashMap<i64, usize>,
    creamer_index: HashMap<i64, usize>,
}

fn index_by<T>(rows: &[T], id: impl Fn(&T) -> i64) -> HashMap<i64, usize> {
    rows.iter()
        .enumerate()
        .map(|(position, row)| (id(row), position))
        .collect()
}

impl Catalog {
    /// Builds a catalog, ordering every list the way the menu displays it.
    pub fn new(
        mut coffees: Vec<Coffee>,
        mut sizes: Vec<Size>,
        mut sweeteners: Vec<Sweetener>,
        mut creamers: Vec<Creamer>,
    ) -> Self {
        coffees.sort_by(|a, b| a.name.cmp(&b.name));
        sizes.sort_by(|a, b| a.ounces.cmp(&b.ounces).then_with(|| a.label.cmp(&b.label)));
        sweeteners.sort_by(|a, b| a.name.cmp(&b.name));
        creamers.sort_by(|a, b| a.name.cmp(&b.name));

        Catalog {
            coffee_index: index_by(&coffees, |c| c.id),
            size_index: index_by(&sizes, |s| s.id),
            sweetener_index: index_by(&sweeteners, |s| s.id),
            creamer_index: index_by(&creamers, |c| c.id),
            snapshot: CatalogSnapshot {
                coffees,
                sizes,
                sweeteners,
                creamers,
            },
        }
    }

    /// The whole menu, in display order.
    pub fn all(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    pub fn coffees(&self) -> &[Coffee] {
        &self.snapshot.coffees
    }

    pub fn sizes(&self) -> &[Size] {
        &self.snapshot.sizes
    }

    pub fn sweeteners(&self) -> &[Sweetener] {
        &self.snapshot.sweeteners
    }

    pub fn creamers(&self) -> &[Creamer] {
        &self.snapshot.creamers
    }

    pub fn coffee(&self, id: i64) -> Option<&Coffee> {
        self.coffee_index.get(&id).map(|&i| &self.snapshot.coffees[i])
    }

    pub fn size(&self, id: i64) -> Option<&Size> {
        self.size_index.get(&id).map(|&i| &self.snapshot.sizes[i])
    }

    pub fn sweetener(&self, id: i64) -> Option<&Sweetener> {
        self.sweetener_index
            .get(&id)
            .map(|&i| &self.snapshot.sweeteners[i])
    }

    pub fn creamer(&self, id: i64) -> Option<&Creamer> {
        self.creamer_index.get(&id).map(|&i| &self.snapshot.creamers[i])
    }

    /// Whether `id` exists in the given collection.
    pub fn contains(&self, collection: Collection, id: i64) -> bool {
        let index = match collection {
            Collection::Coffees => &self.coffee_index,
            Collection::Sizes => &self.size_index,
            Collection::Sweeteners => &self.sweetener_index,
            Collection::Creamers => &self.creamer_index,
        };
        index.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.coffees.is_empty() && self.snapshot.sizes.is_empty()
    }
}

impl From<CatalogSnapshot> for Catalog {
    fn from(snapshot: CatalogSnapshot) -> Self {
        Catalog::new(
            snapshot.coffees,
            snapshot.sizes,
            snapshot.sweeteners,
            snapshot.creamers,
        )
    }
}

// =============================================================================
// Test Fixture
// =============================================================================

/// The default kiosk menu with ids 1..=4 in seeding order.
///
/// Shared by the unit tests of pricing, cart and checkout.
#[cfg(test)]
pub(crate) fn sample_catalog() -> Catalog {
    use crate::money::Money;

    let coffee = |id, name: &str, cents| Coffee {
        id,
        name: name.to_string(),
        description: None,
        base_price: Money::from_cents(cents),
    };
    let size = |id, label: &str, ounces, cents| Size {
        id,
        label: label.to_string(),
        ounces,
        price_modifier: Money::from_cents(cents),
    };
    let sweetener = |id, name: &str, cents| Sweetener {
        id,
        name: name.to_string(),
        additional_cost: Money::from_cents(cents),
    };
    let creamer = |id, name: &str, is_flavored, cents| Creamer {
        id,
        name: name.to_string(),
        is_flavored,
        additional_cost: Money::from_cents(cents),
    };

    Catalog::new(
        vec![
            coffee(1, "Espresso", 250),
            coffee(2, "Latte", 340),
            coffee(3, "Cappuccino", 375),
            coffee(4, "Mocha", 395),
        ],
        vec![
            size(1, "Small", 8, 0),
            size(2, "Medium", 12, 75),
            size(3, "Large", 16, 125),
        ],
        vec![
            sweetener(1, "Sugar", 10),
            sweetener(2, "Honey", 25),
            sweetener(3, "Stevia", 20),
            sweetener(4, "Maple Syrup", 35),
        ],
        vec![
            creamer(1, "Half & Half", false, 20),
            creamer(2, "Vanilla Creamer", true, 35),
            creamer(3, "Hazelnut Creamer", true, 35),
            creamer(4, "Caramel Creamer", true, 40),
        ],
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_in_menu_order() {
        let catalog = sample_catalog();

        let coffees: Vec<_> = catalog.coffees().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(coffees, ["Cappuccino", "Espresso", "Latte", "Mocha"]);

        let sizes: Vec<_> = catalog.sizes().iter().map(|s| s.ounces).collect();
        assert_eq!(sizes, [8, 12, 16]);
    }

    #[test]
    fn test_lookup_by_id_survives_sorting() {
        let catalog = sample_catalog();

        assert_eq!(catalog.coffee(1).map(|c| c.name.as_str()), Some("Espresso"));
        assert_eq!(catalog.coffee(3).map(|c| c.name.as_str()), Some("Cappuccino"));
        assert_eq!(catalog.size(2).map(|s| s.label.as_str()), Some("Medium"));
        assert_eq!(catalog.sweetener(4).map(|s| s.name.as_str()), Some("Maple Syrup"));
        assert!(catalog.creamer(4).is_some_and(|c| c.is_flavored));
    }

    #[test]
    fn test_missing_ids() {
        let catalog = sample_catalog();

        assert!(catalog.coffee(99).is_none());
        assert!(!catalog.contains(Collection::Sizes, 0));
        assert!(catalog.contains(Collection::Creamers, 1));
    }

    #[test]
    fn test_snapshot_round_trip_keeps_index() {
        let catalog = sample_catalog();
        let rebuilt = Catalog::from(catalog.all().clone());
        assert_eq!(rebuilt.all(), catalog.all());
        assert_eq!(rebuilt.size(3).map(|s| s.ounces), Some(16));
    }

    #[test]
    fn test_empty_catalog() {
        assert!(Catalog::default().is_empty());
        assert!(!sample_catalog().is_empty());
    }
}
