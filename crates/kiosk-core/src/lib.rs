//! # kiosk-core: Pure Ordering Logic for the Coffee Kiosk
//!
//! This crate holds the pricing, cart and checkout rules as pure code with
//! zero I/O dependencies. Storage is reached only through the
//! [`CartRepository`] and [`OrderSink`] traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosk Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Kiosk front end                              │   │
//! │  │    Menu ──► Customize drink ──► Cart drawer ──► Checkout        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kiosk-server (axum)                          │   │
//! │  │    sessions, write-token guard, routes                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kiosk-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │ catalog  │─►│ pricing  │◄─│   cart   │  │   checkout   │   │   │
//! │  │   │ id maps  │  │ price()  │◄─┼──────────┼──│  finalize()  │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kiosk-db (SQLite)                            │   │
//! │  │        catalog snapshots, transactional order writes            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Catalog rows, quantities, line-item requests
//! - [`catalog`] - Id-indexed menu snapshot
//! - [`pricing`] - The one pricing function
//! - [`cart`] - Session carts and their summaries
//! - [`checkout`] - Single-drink checkout and the order sink contract
//! - [`validation`] - Checkout field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kiosk_core::{pricing, Catalog, Coffee, LineItemRequest, Money, Size};
//!
//! let catalog = Catalog::new(
//!     vec![Coffee {
//!         id: 1,
//!         name: "Espresso".into(),
//!         description: None,
//!         base_price: Money::from_cents(250),
//!     }],
//!     vec![Size {
//!         id: 1,
//!         label: "Small".into(),
//!         ounces: 8,
//!         price_modifier: Money::zero(),
//!     }],
//!     vec![],
//!     vec![],
//! );
//!
//! let line = pricing::price(&LineItemRequest::new(1, 1, 3), &catalog).unwrap();
//! assert_eq!(line.line_total.cents(), 750);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartLineView, CartRepository, CartStore, CartSummary};
pub use catalog::{Catalog, CatalogSnapshot};
pub use checkout::{
    CheckoutRequest, CustomerInfo, NewOrder, OrderConfirmation, OrderLine,
    OrderSink, ValidatedCheckout,
};
pub use error::{Collection, CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::PricedLineItem;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest number of drinks on one line.
pub const MIN_ITEM_QUANTITY: i64 = 1;

/// Largest number of drinks on one line.
///
/// ## Business Reason
/// One barista batch. Larger orders go through the counter.
pub const MAX_ITEM_QUANTITY: i64 = 12;
