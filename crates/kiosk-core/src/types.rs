//! # Domain Types
//!
//! Catalog rows and line-item requests used throughout the kiosk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog rows (immutable, read from kiosk-db)                           │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │   Coffee     │ │    Size      │ │  Sweetener   │ │   Creamer    │   │
//! │  │ base_price   │ │ ounces       │ │ additional_  │ │ is_flavored  │   │
//! │  │              │ │ price_modif. │ │   cost       │ │ additional_  │   │
//! │  └──────────────┘ └──────────────┘ └──────┬───────┘ └──────┬───────┘   │
//! │                                           └──── Addon ─────┘           │
//! │                                                                         │
//! │  User-authored                                                          │
//! │  ┌──────────────────────────────────────────────┐                      │
//! │  │ LineItemRequest                               │                      │
//! │  │ coffee_id, size_id, quantity (1..=12),        │                      │
//! │  │ sweetener_ids {set}, creamer_ids {set}        │                      │
//! │  └──────────────────────────────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog ids are SQLite integer primary keys.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY};

// =============================================================================
// Catalog Rows
// =============================================================================

/// A coffee drink on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coffee {
    #[ts(type = "number")]
    pub id: i64,

    /// Display name ("Latte").
    pub name: String,

    pub description: Option<String>,

    /// Price of the drink before size and addons.
    pub base_price: Money,
}

/// A cup size. The modifier is added to the coffee's base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Size {
    #[ts(type = "number")]
    pub id: i64,

    /// Display label ("Medium").
    pub label: String,

    #[ts(type = "number")]
    pub ounces: i64,

    /// May be zero (the smallest size usually is).
    pub price_modifier: Money,
}

/// A sweetener addon, charged per drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sweetener {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
    pub additional_cost: Money,
}

/// A creamer addon, charged per drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Creamer {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,

    /// Flavored creamers are marked as such on the order summary.
    pub is_flavored: bool,

    pub additional_cost: Money,
}

// =============================================================================
// Addons
// =============================================================================

/// Anything priced per unit on top of a drink.
///
/// Sweeteners and creamers are interchangeable for pricing; only the order
/// summary cares that creamers can be flavored.
pub trait Addon {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn additional_cost(&self) -> Money;

    /// Name as printed on the order summary.
    fn summary_name(&self) -> String {
        self.name().to_string()
    }
}

impl Addon for Sweetener {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn additional_cost(&self) -> Money {
        self.additional_cost
    }
}

impl Addon for Creamer {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn additional_cost(&self) -> Money {
        self.additional_cost
    }

    fn summary_name(&self) -> String {
        if self.is_flavored {
            format!("{} (flavored)", self.name)
        } else {
            self.name.clone()
        }
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// A drink count that is always within `1..=12`.
///
/// ## Why Clamp Instead of Reject?
/// The kiosk stepper can send 0 or an overshoot when tapped quickly.
/// Cart operations quietly correct the value instead of bouncing the
/// request. Checkout validates the upper bound before building one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(from = "i64", into = "i64")]
#[ts(export)]
pub struct Quantity(#[ts(type = "number")] i64);

impl Quantity {
    /// Clamps any integer into the allowed range.
    ///
    /// ## Example
    /// ```rust
    /// use kiosk_core::Quantity;
    ///
    /// assert_eq!(Quantity::clamped(0).get(), 1);
    /// assert_eq!(Quantity::clamped(5).get(), 5);
    /// assert_eq!(Quantity::clamped(99).get(), 12);
    /// ```
    pub const fn clamped(value: i64) -> Self {
        if value < MIN_ITEM_QUANTITY {
            Quantity(MIN_ITEM_QUANTITY)
        } else if value > MAX_ITEM_QUANTITY {
            Quantity(MAX_ITEM_QUANTITY)
        } else {
            Quantity(value)
        }
    }

    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity(MIN_ITEM_QUANTITY)
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Quantity::clamped(value)
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Line Item Request
// =============================================================================

/// What a customer asked for: one drink configuration and a count.
///
/// Addon ids are sets, so `[3, 3, 5]` and `[5, 3]` are the same request.
/// Coffee and size ids are optional so a half-filled form can still be
/// deserialized and reported as "Select a coffee." rather than a parse
/// error.
///
/// ## Example
/// ```rust
/// use kiosk_core::LineItemRequest;
///
/// let request: LineItemRequest = serde_json::from_str(
///     r#"{"coffee_id": 1, "size_id": 2, "quantity": 40, "sweetener_ids": [3, 3, 5]}"#,
/// ).unwrap();
///
/// assert_eq!(request.quantity.get(), 12);
/// assert_eq!(request.sweetener_ids.len(), 2);
/// assert!(request.creamer_ids.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemRequest {
    #[ts(type = "number | null")]
    pub coffee_id: Option<i64>,

    #[ts(type = "number | null")]
    pub size_id: Option<i64>,

    #[serde(default)]
    pub quantity: Quantity,

    #[serde(default, alias = "sweeteners")]
    #[ts(type = "Array<number>")]
    pub sweetener_ids: BTreeSet<i64>,

    #[serde(default, alias = "creamers")]
    #[ts(type = "Array<number>")]
    pub creamer_ids: BTreeSet<i64>,
}

impl LineItemRequest {
    /// Creates a request for a coffee and size with no addons.
    pub fn new(coffee_id: i64, size_id: i64, quantity: i64) -> Self {
        LineItemRequest {
            coffee_id: Some(coffee_id),
            size_id: Some(size_id),
            quantity: Quantity::clamped(quantity),
            sweetener_ids: BTreeSet::new(),
            creamer_ids: BTreeSet::new(),
        }
    }

    /// Adds sweetener ids (duplicates collapse).
    pub fn with_sweeteners(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.sweetener_ids.extend(ids);
        self
    }

    /// Adds creamer ids (duplicates collapse).
    pub fn with_creamers(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.creamer_ids.extend(ids);
        self
    }
}

// =============================================================================
// Session Identity
// =============================================================================

/// Opaque key under which a visitor's cart is stored.
///
/// The web layer derives it from its own session mechanism; the core only
/// compares and hashes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_clamps_both_bounds() {
        assert_eq!(Quantity::clamped(-4).get(), 1);
        assert_eq!(Quantity::clamped(0).get(), 1);
        assert_eq!(Quantity::clamped(1).get(), 1);
        assert_eq!(Quantity::clamped(12).get(), 12);
        assert_eq!(Quantity::clamped(13).get(), 12);
    }

    #[test]
    fn test_flavored_creamer_summary_name() {
        let vanilla = Creamer {
            id: 2,
            name: "Vanilla Creamer".to_string(),
            is_flavored: true,
            additional_cost: Money::from_cents(35),
        };
        let half_and_half = Creamer {
            id: 1,
            name: "Half & Half".to_string(),
            is_flavored: false,
            additional_cost: Money::from_cents(20),
        };

        assert_eq!(vanilla.summary_name(), "Vanilla Creamer (flavored)");
        assert_eq!(half_and_half.summary_name(), "Half & Half");
    }

    #[test]
    fn test_request_accepts_legacy_addon_keys() {
        let request: LineItemRequest = serde_json::from_str(
            r#"{"coffee_id": 1, "size_id": 1, "sweeteners": [1], "creamers": [4, 4]}"#,
        )
        .unwrap();

        assert_eq!(request.quantity.get(), 1);
        assert_eq!(request.sweetener_ids, BTreeSet::from([1]));
        assert_eq!(request.creamer_ids, BTreeSet::from([4]));
    }

    #[test]
    fn test_request_with_missing_ids_still_parses() {
        let request: LineItemRequest = serde_json::from_str(r#"{"quantity": 2}"#).unwrap();
        assert_eq!(request.coffee_id, None);
        assert_eq!(request.size_id, None);
    }
}
