//! # Cart Store
//!
//! A visitor's cart: drink requests keyed by an opaque line id, priced on
//! every read.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Kiosk Action           CartStore              Stored Cart              │
//! │  ────────────           ─────────              ───────────              │
//! │                                                                         │
//! │  Add drink ───────────► add() ───────────────► lines.push(id, request) │
//! │                         (coffee/size checked)                           │
//! │                                                                         │
//! │  Change quantity ─────► update() ────────────► lines[id].qty = clamp(n)│
//! │                                                                         │
//! │  Remove drink ────────► remove() ────────────► lines.retain(≠ id)      │
//! │                                                                         │
//! │  View cart ───────────► summarize(catalog) ──► (read only, priced)     │
//! │                                                                         │
//! │  Every mutation is load → modify → save of the WHOLE cart,              │
//! │  done inside CartRepository::update.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are never stored in the cart. A summary always reflects the
//! catalog it is given, and a line whose coffee or size has since left the
//! menu is skipped rather than failing the whole summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{Collection, CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{self, PricedLineItem};
use crate::types::{Addon, LineItemRequest, Quantity, SessionId};

// =============================================================================
// Cart
// =============================================================================

/// One stored line: an id plus the request as the customer made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub request: LineItemRequest,
}

/// The stored cart for one session.
///
/// ## Invariants
/// - Line ids are unique within the cart
/// - Lines keep insertion order
/// - Every stored quantity is within `1..=12` (guaranteed by [`Quantity`])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was first touched in this session.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Stores a request under a fresh, unguessable line id.
    pub fn insert(&mut self, request: LineItemRequest) -> String {
        let mut id = new_line_id();
        while self.line(&id).is_some() {
            id = new_line_id();
        }

        self.lines.push(CartLine {
            id: id.clone(),
            request,
        });
        id
    }

    /// Overwrites a line's quantity (clamped).
    pub fn set_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;

        line.request.quantity = Quantity::clamped(quantity);
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove(&mut self, line_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != line_id);
        self.lines.len() != before
    }

    /// Total drinks stored, priced or not.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.request.quantity.get()).sum()
    }

    /// Prices every line against `catalog`.
    pub fn summarize(&self, catalog: &Catalog) -> CartSummary {
        let mut summary = CartSummary::default();

        for line in &self.lines {
            match pricing::price(&line.request, catalog) {
                Ok(priced) => {
                    summary.cart_total += priced.line_total;
                    summary.cart_count += priced.quantity.get();
                    summary.items.push(CartLineView::new(&line.id, priced));
                }
                Err(_) => summary.skipped.push(line.id.clone()),
            }
        }

        summary
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

fn new_line_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// =============================================================================
// Cart Summary (wire shape)
// =============================================================================

/// One priced cart line as shown in the cart drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CartLineView {
    pub id: String,
    #[ts(type = "number")]
    pub coffee_id: i64,
    pub coffee: String,
    #[ts(type = "number")]
    pub size_id: i64,
    pub size: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub sweeteners: Vec<String>,
    pub creamers: Vec<String>,
    pub extras_total: Money,
    pub line_total: Money,
}

impl CartLineView {
    fn new(id: &str, priced: PricedLineItem) -> Self {
        CartLineView {
            id: id.to_string(),
            coffee_id: priced.coffee_id,
            coffee: priced.coffee,
            size_id: priced.size_id,
            size: priced.size,
            quantity: priced.quantity,
            unit_price: priced.unit_price,
            sweeteners: priced.sweeteners.iter().map(|s| s.name().to_string()).collect(),
            creamers: priced.creamers.iter().map(|c| c.name().to_string()).collect(),
            extras_total: priced.extras_total,
            line_total: priced.line_total,
        }
    }
}

/// The priced cart returned after every cart operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub items: Vec<CartLineView>,
    pub cart_total: Money,
    #[ts(type = "number")]
    pub cart_count: i64,

    /// Line ids that could not be priced. Kept for logging only.
    #[serde(skip)]
    #[ts(skip)]
    pub skipped: Vec<String>,
}

// =============================================================================
// Cart Repository
// =============================================================================

/// Session-scoped cart storage.
///
/// The web layer maps its session mechanism onto a [`SessionId`]; the core
/// never sees cookies or session objects.
///
/// ## Implementing
/// `load` must return an empty cart for an unknown session. Implementations
/// backed by a lock should override [`update`](CartRepository::update) so
/// the whole read-modify-write happens under that lock.
pub trait CartRepository {
    fn load(&self, session: &SessionId) -> Cart;

    fn save(&self, session: &SessionId, cart: Cart);

    /// Loads, mutates and saves the session's cart as one step.
    fn update<F, R>(&self, session: &SessionId, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.load(session);
        let result = f(&mut cart);
        self.save(session, cart);
        result
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Cart operations for one session.
///
/// ## Usage
/// ```rust,ignore
/// let store = CartStore::new(&carts, session_id);
///
/// let line_id = store.add(request, &catalog)?;
/// store.update(&line_id, 3)?;
/// let summary = store.summarize(&catalog);
/// ```
pub struct CartStore<'r, R: CartRepository> {
    repo: &'r R,
    session: SessionId,
}

impl<'r, R: CartRepository> CartStore<'r, R> {
    pub fn new(repo: &'r R, session: SessionId) -> Self {
        CartStore { repo, session }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Adds a drink to the cart and returns its new line id.
    ///
    /// A missing or unknown coffee and size are reported together. The
    /// quantity was already clamped when the request was built.
    pub fn add(&self, request: LineItemRequest, catalog: &Catalog) -> CoreResult<String> {
        let mut errors = Vec::new();
        if !request
            .coffee_id
            .is_some_and(|id| catalog.contains(Collection::Coffees, id))
        {
            errors.push(ValidationError::NotSelected {
                collection: Collection::Coffees,
            });
        }
        if !request
            .size_id
            .is_some_and(|id| catalog.contains(Collection::Sizes, id))
        {
            errors.push(ValidationError::NotSelected {
                collection: Collection::Sizes,
            });
        }
        if !errors.is_empty() {
            return Err(CoreError::ValidationFailed(errors));
        }

        Ok(self.repo.update(&self.session, |cart| cart.insert(request)))
    }

    /// Sets a line's quantity, clamped to `1..=12`.
    pub fn update(&self, line_id: &str, quantity: i64) -> CoreResult<()> {
        self.repo
            .update(&self.session, |cart| cart.set_quantity(line_id, quantity))
    }

    /// Removes a line. Removing an unknown line is a no-op.
    pub fn remove(&self, line_id: &str) -> bool {
        self.repo.update(&self.session, |cart| cart.remove(line_id))
    }

    /// Prices the whole cart.
    pub fn summarize(&self, catalog: &Catalog) -> CartSummary {
        self.repo.load(&self.session).summarize(catalog)
    }

    /// Drinks in the cart, for the header badge. Needs no catalog.
    pub fn count(&self) -> i64 {
        self.repo.load(&self.session).total_quantity()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
