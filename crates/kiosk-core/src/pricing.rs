//! # Pricing Engine
//!
//! Turns a [`LineItemRequest`] plus the [`Catalog`] into a priced line.
//! Both the cart and the checkout flow price through [`price`], so a drink
//! costs the same no matter how it is ordered.
//!
//! ## The Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  base_price   = coffee.base_price + size.price_modifier                 │
//! │  unit_price   = base_price + Σ addon.additional_cost  (each addon once)  │
//! │  extras_total = Σ addon.additional_cost × quantity                      │
//! │  line_total   = unit_price × quantity                                   │
//! │                                                                         │
//! │  Espresso ($2.50) + Small (+$0.00) + Sugar ($0.10), qty 2               │
//! │    unit_price   = $2.60                                                 │
//! │    extras_total = $0.20                                                 │
//! │    line_total   = $5.20                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Forgiving Inputs
//! - quantity is already clamped to `1..=12` by [`Quantity`]
//! - duplicate addon ids collapse (the request stores sets)
//! - unknown addon ids are dropped, not reported
//! - unknown coffee or size ids are an [`CoreError::InvalidReference`]

use serde::Serialize;
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::{Collection, CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Addon, Creamer, LineItemRequest, Quantity, Sweetener};

// =============================================================================
// Priced Line Item
// =============================================================================

/// A line item with every money figure resolved. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PricedLineItem {
    #[ts(type = "number")]
    pub coffee_id: i64,
    pub coffee: String,
    #[ts(type = "number")]
    pub size_id: i64,
    pub size: String,
    pub quantity: Quantity,

    /// Coffee plus size, per drink.
    pub base_price: Money,
    pub unit_price: Money,
    pub extras_total: Money,
    pub line_total: Money,

    pub sweeteners: Vec<Sweetener>,
    pub creamers: Vec<Creamer>,
}

impl PricedLineItem {
    /// Sum of per-drink addon costs.
    pub fn addons_per_unit(&self) -> Money {
        self.unit_price - self.base_price
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices one line item against a catalog snapshot.
///
/// ## Example
/// ```rust,ignore
/// let request = LineItemRequest::new(1, 1, 2).with_sweeteners([1]);
/// let line = pricing::price(&request, &catalog)?;
///
/// assert_eq!(line.unit_price.cents(), 260);
/// assert_eq!(line.extras_total.cents(), 20);
/// assert_eq!(line.line_total.cents(), 520);
/// ```
pub fn price(request: &LineItemRequest, catalog: &Catalog) -> CoreResult<PricedLineItem> {
    let coffee = request
        .coffee_id
        .and_then(|id| catalog.coffee(id))
        .ok_or(CoreError::InvalidReference {
            collection: Collection::Coffees,
            id: request.coffee_id,
        })?;

    let size = request
        .size_id
        .and_then(|id| catalog.size(id))
        .ok_or(CoreError::InvalidReference {
            collection: Collection::Sizes,
            id: request.size_id,
        })?;

    let sweeteners: Vec<Sweetener> = request
        .sweetener_ids
        .iter()
        .filter_map(|&id| catalog.sweetener(id))
        .cloned()
        .collect();
    let creamers: Vec<Creamer> = request
        .creamer_ids
        .iter()
        .filter_map(|&id| catalog.creamer(id))
        .cloned()
        .collect();

    let addons_per_unit = addon_cost(&sweeteners) + addon_cost(&creamers);
    let base_price = coffee.base_price + size.price_modifier;
    let unit_price = base_price + addons_per_unit;
    let quantity = request.quantity.get();

    Ok(PricedLineItem {
        coffee_id: coffee.id,
        coffee: coffee.name.clone(),
        size_id: size.id,
        size: size.label.clone(),
        quantity: request.quantity,
        base_price,
        unit_price,
        extras_total: addons_per_unit.multiply_quantity(quantity),
        line_total: unit_price.multiply_quantity(quantity),
        sweeteners,
        creamers,
    })
}

fn addon_cost<A: Addon>(addons: &[A]) -> Money {
    addons.iter().map(Addon::additional_cost).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_catalog;

    #[test]
    fn test_espresso_with_sugar() {
        let catalog = sample_catalog();
        let request = LineItemRequest::new(1, 1, 2).with_sweeteners([1]);

        let line = price(&request, &catalog).unwrap();

        assert_eq!(line.coffee, "Espresso");
        assert_eq!(line.size, "Small");
        assert_eq!(line.base_price.cents(), 250);
        assert_eq!(line.unit_price.cents(), 260);
        assert_eq!(line.extras_total.cents(), 20);
        assert_eq!(line.line_total.cents(), 520);
    }

    #[test]
    fn test_size_and_both_addon_kinds() {
        let catalog = sample_catalog();
        // Latte 3.40 + Large 1.25 + Honey 0.25 + Caramel 0.40 = 5.30
        let request = LineItemRequest::new(2, 3, 3)
            .with_sweeteners([2])
            .with_creamers([4]);

        let line = price(&request, &catalog).unwrap();

        assert_eq!(line.base_price.cents(), 465);
        assert_eq!(line.unit_price.cents(), 530);
        assert_eq!(line.addons_per_unit().cents(), 65);
        assert_eq!(line.extras_total.cents(), 195);
        assert_eq!(line.line_total.cents(), 1590);
    }

    #[test]
    fn test_out_of_range_quantity_prices_as_nearest_bound() {
        let catalog = sample_catalog();

        let zero = price(&LineItemRequest::new(4, 2, 0), &catalog).unwrap();
        let one = price(&LineItemRequest::new(4, 2, 1), &catalog).unwrap();
        assert_eq!(zero, one);

        let huge = price(&LineItemRequest::new(4, 2, 99), &catalog).unwrap();
        let twelve = price(&LineItemRequest::new(4, 2, 12), &catalog).unwrap();
        assert_eq!(huge, twelve);
        assert_eq!(huge.quantity.get(), 12);
    }

    #[test]
    fn test_every_quantity_in_range_is_exact() {
        let catalog = sample_catalog();
        for q in 1..=12 {
            let line = price(&LineItemRequest::new(3, 2, q).with_creamers([2]), &catalog).unwrap();
            assert_eq!(line.quantity.get(), q);
            assert_eq!(line.line_total.cents(), line.unit_price.cents() * q);
        }
    }

    #[test]
    fn test_duplicate_addons_counted_once() {
        let catalog = sample_catalog();
        let duplicated = LineItemRequest::new(1, 1, 1).with_sweeteners([3, 3, 4]);
        let unique = LineItemRequest::new(1, 1, 1).with_sweeteners([3, 4]);

        assert_eq!(
            price(&duplicated, &catalog).unwrap(),
            price(&unique, &catalog).unwrap()
        );
    }

    #[test]
    fn test_unknown_addons_ignored() {
        let catalog = sample_catalog();
        let unknown = LineItemRequest::new(1, 1, 1)
            .with_sweeteners([999])
            .with_creamers([404]);
        let plain = LineItemRequest::new(1, 1, 1);

        let priced = price(&unknown, &catalog).unwrap();
        assert_eq!(priced, price(&plain, &catalog).unwrap());
        assert!(priced.sweeteners.is_empty());
    }

    #[test]
    fn test_unknown_coffee_or_size_is_invalid_reference() {
        let catalog = sample_catalog();

        let err = price(&LineItemRequest::new(42, 1, 1), &catalog).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidReference { collection: Collection::Coffees, id: Some(42) }
        ));

        let err = price(&LineItemRequest::new(1, 9, 1), &catalog).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidReference { collection: Collection::Sizes, id: Some(9) }
        ));

    }

    #[test]
    fn test_missing_coffee_or_size_is_invalid_reference() {
        let catalog = sample_catalog();

        let err = price(&LineItemRequest::default(), &catalog).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidReference { collection: Collection::Coffees, id: None }
        ));
        assert_eq!(err.to_string(), "No coffee given");

        let no_size = LineItemRequest {
            size_id: None,
            ..LineItemRequest::new(1, 1, 1)
        };
        let err = price(&no_size, &catalog).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidReference { collection: Collection::Sizes, id: None }
        ));
    }
}
