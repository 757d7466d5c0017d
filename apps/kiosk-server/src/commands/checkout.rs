//! # Checkout Command
//!
//! Places a single-drink order straight from the order form.
//!
//! ```text
//! POST /api/orders
//!      │
//!      ▼
//! CheckoutRequest ──validate──► ValidatedCheckout ──finalize──► OrderConfirmation
//!      │                                                 │
//!      └── 422 { errors: [...] }                         └── 500 (rolled back)
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};

use kiosk_core::checkout;
use kiosk_core::{CheckoutRequest, OrderConfirmation};
use kiosk_db::Database;

use crate::error::ApiError;
use crate::extract::ApiJson;

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: OrderConfirmation,
}

/// `POST /api/orders`
pub async fn place_order(
    State(db): State<Database>,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    debug!(coffee_id = ?request.coffee_id, size_id = ?request.size_id, "place_order");

    let catalog = db.catalog().load().await?;
    let order = checkout::finalize(request, &catalog, &db.orders()).await?;

    info!(order_id = order.order_id, total = %order.order_total, "Order placed");
    Ok((StatusCode::CREATED, Json(OrderResponse { order })))
}
