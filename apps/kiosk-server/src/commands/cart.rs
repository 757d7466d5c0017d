//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐                         │
//! │  │  Empty   │────►│ In Cart  │────►│ Session  │                         │
//! │  │  Cart    │     │          │     │ expires  │                         │
//! │  └──────────┘     └──────────┘     └──────────┘                         │
//! │                        │                                                │
//! │                   POST   /api/cart/lines                                │
//! │                   PATCH  /api/cart/lines/{id}                           │
//! │                   DELETE /api/cart/lines/{id}                           │
//! │                                                                         │
//! │  Every response carries the freshly priced cart.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, info, warn};

use kiosk_core::{CartStore, CartSummary, Catalog, LineItemRequest};
use kiosk_db::Database;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::guard;
use crate::state::SessionCarts;

/// Response to every cart mutation.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    pub cart: CartSummary,
}

/// Body of `PATCH /api/cart/lines/{line_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateLineRequest {
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct CartCountResponse {
    pub cart_count: i64,
}

fn priced(store: &CartStore<'_, SessionCarts>, catalog: &Catalog) -> CartSummary {
    let summary = store.summarize(catalog);
    if !summary.skipped.is_empty() {
        warn!(
            session = %store.session(),
            skipped = ?summary.skipped,
            "Cart lines no longer on the menu were left out"
        );
    }
    summary
}

/// `GET /api/cart`
pub async fn get_cart(
    State(db): State<Database>,
    State(carts): State<SessionCarts>,
    session: Session,
) -> Result<Json<CartSummary>, ApiError> {
    let catalog = db.catalog().load().await?;
    let store = CartStore::new(&carts, guard::cart_session(&session).await?);
    Ok(Json(priced(&store, &catalog)))
}

/// `GET /api/cart/count`
///
/// Drinks in the cart for the header badge. Reads no catalog.
pub async fn get_cart_count(
    State(carts): State<SessionCarts>,
    session: Session,
) -> Result<Json<CartCountResponse>, ApiError> {
    let store = CartStore::new(&carts, guard::cart_session(&session).await?);
    Ok(Json(CartCountResponse {
        cart_count: store.count(),
    }))
}

/// `POST /api/cart/lines`
pub async fn add_line(
    State(db): State<Database>,
    State(carts): State<SessionCarts>,
    session: Session,
    ApiJson(request): ApiJson<LineItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    debug!(
        coffee_id = ?request.coffee_id,
        size_id = ?request.size_id,
        quantity = %request.quantity,
        "add_line"
    );

    let catalog = db.catalog().load().await?;
    let store = CartStore::new(&carts, guard::cart_session(&session).await?);

    let line_id = store.add(request, &catalog)?;
    info!(session = %store.session(), line_id = %line_id, "Line added to cart");

    Ok(Json(CartResponse {
        message: "Added to cart.",
        line_id: Some(line_id),
        cart: priced(&store, &catalog),
    }))
}

/// `PATCH /api/cart/lines/{line_id}`
pub async fn update_line(
    State(db): State<Database>,
    State(carts): State<SessionCarts>,
    session: Session,
    Path(line_id): Path<String>,
    ApiJson(body): ApiJson<UpdateLineRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    debug!(line_id = %line_id, quantity = body.quantity, "update_line");

    let catalog = db.catalog().load().await?;
    let store = CartStore::new(&carts, guard::cart_session(&session).await?);

    store.update(&line_id, body.quantity)?;

    Ok(Json(CartResponse {
        message: "Cart updated.",
        line_id: None,
        cart: priced(&store, &catalog),
    }))
}

/// `DELETE /api/cart/lines/{line_id}`
///
/// Removing a line that is not there still succeeds.
pub async fn remove_line(
    State(db): State<Database>,
    State(carts): State<SessionCarts>,
    session: Session,
    Path(line_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    debug!(line_id = %line_id, "remove_line");

    let catalog = db.catalog().load().await?;
    let store = CartStore::new(&carts, guard::cart_session(&session).await?);

    if !store.remove(&line_id) {
        debug!(line_id = %line_id, "Line was already gone");
    }

    Ok(Json(CartResponse {
        message: "Item removed.",
        line_id: None,
        cart: priced(&store, &catalog),
    }))
}

