//! # Order Finalizer
//!
//! Single-drink checkout: validate the form, price the drink, hand the
//! order to an [`OrderSink`], and build the confirmation.
//!
//! ## Checkout State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   CheckoutRequest ──validate()──► ValidatedCheckout ──persist──► OrderConfirmation
//! │      (Draft)            │            (Validated)        │          (Persisted)
//! │                         │                               │                │
//! │                         ▼                               ▼                │
//! │              ValidationFailed(errors)          PersistenceFailed         │
//! │                  (Rejected)                  (rolled back by sink)       │
//! │                                                                         │
//! │   Persisted and Rejected are terminal. Nothing is retried.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The drink is priced by [`pricing::price`], the same function the cart
//! uses, so a drink costs the same through either flow.

use std::collections::BTreeSet;
use std::future::Future;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::{Collection, CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{self, PricedLineItem};
use crate::types::{Addon, LineItemRequest, Quantity};
use crate::validation::{
    validate_checkout_quantity, validate_customer_name, validate_email, validate_optional_text,
    MAX_PHONE_LEN, MAX_PICKUP_NOTE_LEN,
};

// =============================================================================
// Checkout Request (Draft)
// =============================================================================

/// The checkout form as submitted.
///
/// Every field defaults, so a half-empty form deserializes and is reported
/// through validation instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub pickup_note: Option<String>,

    #[ts(type = "number | null")]
    pub coffee_id: Option<i64>,

    #[ts(type = "number | null")]
    pub size_id: Option<i64>,

    #[ts(type = "number")]
    pub quantity: i64,

    #[serde(alias = "sweeteners")]
    #[ts(type = "Array<number>")]
    pub sweetener_ids: BTreeSet<i64>,

    #[serde(alias = "creamers")]
    #[ts(type = "Array<number>")]
    pub creamer_ids: BTreeSet<i64>,
}

impl CheckoutRequest {
    /// Normalizes and validates the form against the catalog.
    ///
    /// ## Rules
    /// - name: trimmed, required, at most 120 characters
    /// - email: trimmed, lowercased, well formed, at most 150 characters
    /// - phone / pickup note: trimmed, blank becomes absent, length-limited
    /// - coffee and size: must exist in `catalog`
    /// - quantity: below 1 becomes 1, above 12 is an error
    ///
    /// All problems are returned together in one
    /// [`CoreError::ValidationFailed`].
    pub fn validate(self, catalog: &Catalog) -> CoreResult<ValidatedCheckout> {
        let mut errors = Vec::new();

        let name = validate_customer_name(&self.customer_name)
            .map_err(|e| errors.push(e))
            .ok();
        let email = validate_email(&self.customer_email)
            .map_err(|e| errors.push(e))
            .ok();

        let coffee_id = self
            .coffee_id
            .filter(|&id| catalog.contains(Collection::Coffees, id));
        if coffee_id.is_none() {
            errors.push(ValidationError::NotSelected {
                collection: Collection::Coffees,
            });
        }
        let size_id = self
            .size_id
            .filter(|&id| catalog.contains(Collection::Sizes, id));
        if size_id.is_none() {
            errors.push(ValidationError::NotSelected {
                collection: Collection::Sizes,
            });
        }

        let quantity = validate_checkout_quantity(self.quantity)
            .map_err(|e| errors.push(e))
            .ok();

        let phone = validate_optional_text(
            self.customer_phone.as_deref(),
            "customer_phone",
            "Phone",
            MAX_PHONE_LEN,
        )
        .map_err(|e| errors.push(e))
        .ok();
        let pickup_note = validate_optional_text(
            self.pickup_note.as_deref(),
            "pickup_note",
            "Pickup note",
            MAX_PICKUP_NOTE_LEN,
        )
        .map_err(|e| errors.push(e))
        .ok();

        match (name, email, coffee_id, size_id, quantity, phone, pickup_note) {
            (
                Some(name),
                Some(email),
                Some(coffee_id),
                Some(size_id),
                Some(quantity),
                Some(phone),
                Some(pickup_note),
            ) if errors.is_empty() => Ok(ValidatedCheckout {
                customer: CustomerInfo { name, email, phone },
                pickup_note,
                line: LineItemRequest {
                    coffee_id: Some(coffee_id),
                    size_id: Some(size_id),
                    quantity,
                    sweetener_ids: self.sweetener_ids,
                    creamer_ids: self.creamer_ids,
                },
            }),
            _ => Err(CoreError::ValidationFailed(errors)),
        }
    }
}

// =============================================================================
// Validated Checkout
// =============================================================================

/// Customer details after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CustomerInfo {
    pub name: String,
    /// Lowercased; customers are identified by email.
    pub email: String,
    pub phone: Option<String>,
}

/// A checkout that passed validation. Only [`CheckoutRequest::validate`]
/// builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    customer: CustomerInfo,
    pickup_note: Option<String>,
    line: LineItemRequest,
}

impl ValidatedCheckout {
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    pub fn pickup_note(&self) -> Option<&str> {
        self.pickup_note.as_deref()
    }

    pub fn line(&self) -> &LineItemRequest {
        &self.line
    }

    /// Prices the drink and builds the order handed to the sink.
    pub fn prepare(&self, catalog: &Catalog) -> CoreResult<(NewOrder, PricedLineItem)> {
        let priced = pricing::price(&self.line, catalog)?;
        let order = NewOrder {
            customer: self.customer.clone(),
            pickup_note: self.pickup_note.clone(),
            order_total: priced.line_total,
            lines: vec![OrderLine::from(&priced)],
        };
        Ok((order, priced))
    }
}

// =============================================================================
// New Order (what the sink persists)
// =============================================================================

/// One addon as recorded against an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddonCharge {
    pub id: i64,
    pub additional_cost: Money,
}

impl AddonCharge {
    fn of<A: Addon>(addon: &A) -> Self {
        AddonCharge {
            id: addon.id(),
            additional_cost: addon.additional_cost(),
        }
    }
}

/// A priced line ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub coffee_id: i64,
    pub size_id: i64,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
    pub sweeteners: Vec<AddonCharge>,
    pub creamers: Vec<AddonCharge>,
}

impl From<&PricedLineItem> for OrderLine {
    fn from(priced: &PricedLineItem) -> Self {
        OrderLine {
            coffee_id: priced.coffee_id,
            size_id: priced.size_id,
            quantity: priced.quantity,
            unit_price: priced.unit_price,
            line_total: priced.line_total,
            sweeteners: priced.sweeteners.iter().map(AddonCharge::of).collect(),
            creamers: priced.creamers.iter().map(AddonCharge::of).collect(),
        }
    }
}

/// A complete order, priced and validated.
///
/// `order_total` is always the sum of the line totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer: CustomerInfo,
    pub pickup_note: Option<String>,
    pub lines: Vec<OrderLine>,
    pub order_total: Money,
}

// =============================================================================
// Order Sink
// =============================================================================

/// Durable storage for finished orders.
///
/// ## Contract
/// `persist` writes the whole order atomically and returns the new order
/// id. On any failure nothing of the order may remain.
pub trait OrderSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn persist(&self, order: &NewOrder) -> impl Future<Output = Result<i64, Self::Error>> + Send;
}

// =============================================================================
// Order Confirmation (Persisted)
// =============================================================================

/// The order summary shown after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct OrderConfirmation {
    #[ts(type = "number")]
    pub order_id: i64,
    pub customer: String,
    pub email: String,
    pub coffee: String,
    pub size: String,
    pub quantity: Quantity,
    pub sweeteners: Vec<String>,
    /// Flavored creamers carry a " (flavored)" suffix.
    pub creamers: Vec<String>,
    pub base_price: Money,
    pub unit_price: Money,
    pub line_total: Money,
    pub extras_total: Money,
    pub order_total: Money,
}

impl OrderConfirmation {
    fn new(order_id: i64, order: &NewOrder, priced: &PricedLineItem) -> Self {
        OrderConfirmation {
            order_id,
            customer: order.customer.name.clone(),
            email: order.customer.email.clone(),
            coffee: priced.coffee.clone(),
            size: priced.size.clone(),
            quantity: priced.quantity,
            sweeteners: priced.sweeteners.iter().map(Addon::summary_name).collect(),
            creamers: priced.creamers.iter().map(Addon::summary_name).collect(),
            base_price: priced.base_price,
            unit_price: priced.unit_price,
            line_total: priced.line_total,
            extras_total: priced.extras_total,
            order_total: order.order_total,
        }
    }
}

// =============================================================================
// Finalize
// =============================================================================

/// Runs a checkout from form to confirmation.
///
/// ## Errors
/// - [`CoreError::ValidationFailed`]: the form had problems; nothing written
/// - [`CoreError::PersistenceFailed`]: the sink failed and rolled back
///
/// ## Example
/// ```rust,ignore
/// let confirmation = checkout::finalize(request, &catalog, &db.orders()).await?;
/// println!("Order #{} total {}", confirmation.order_id, confirmation.order_total);
/// ```
pub async fn finalize<S: OrderSink>(
    request: CheckoutRequest,
    catalog: &Catalog,
    sink: &S,
) -> CoreResult<OrderConfirmation> {
    let validated = request.validate(catalog)?;
    let (order, priced) = validated.prepare(catalog)?;

    let order_id = sink.persist(&order).await.map_err(CoreError::persistence)?;

    Ok(OrderConfirmation::new(order_id, &order, &priced))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::catalog::sample_catalog;

    #[derive(Default)]
    struct RecordingSink {
        orders: Mutex<Vec<NewOrder>>,
    }

    impl OrderSink for RecordingSink {
        type Error = std::io::Error;

        async fn persist(&self, order: &NewOrder) -> Result<i64, Self::Error> {
            let mut orders = self.orders.lock().unwrap();
            orders.push(order.clone());
            Ok(orders.len() as i64)
        }
    }

    struct FailingSink;

    impl OrderSink for FailingSink {
        type Error = std::io::Error;

        async fn persist(&self, _order: &NewOrder) -> Result<i64, Self::Error> {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "FOREIGN KEY constraint failed",
            ))
        }
    }

    fn valid_request() -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "  Ada Lovelace ".to_string(),
            customer_email: " Ada@Example.com".to_string(),
            customer_phone: Some("".to_string()),
            pickup_note: Some(" extra hot ".to_string()),
            coffee_id: Some(2),
            size_id: Some(2),
            quantity: 2,
            sweetener_ids: BTreeSet::from([2]),
            creamer_ids: BTreeSet::from([1, 3]),
        }
    }

    fn messages(err: &CoreError) -> Vec<String> {
        err.validation_errors()
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_finalize_persists_and_confirms() {
        let catalog = sample_catalog();
        let sink = RecordingSink::default();

        let confirmation = finalize(valid_request(), &catalog, &sink).await.unwrap();

        // Latte 3.40 + Medium 0.75 = 4.15; Honey 0.25 + Half & Half 0.20 + Hazelnut 0.35 = 0.80
        assert_eq!(confirmation.order_id, 1);
        assert_eq!(confirmation.customer, "Ada Lovelace");
        assert_eq!(confirmation.email, "ada@example.com");
        assert_eq!(confirmation.coffee, "Latte");
        assert_eq!(confirmation.size, "Medium");
        assert_eq!(confirmation.base_price.cents(), 415);
        assert_eq!(confirmation.unit_price.cents(), 495);
        assert_eq!(confirmation.extras_total.cents(), 160);
        assert_eq!(confirmation.line_total.cents(), 990);
        assert_eq!(confirmation.order_total.cents(), 990);
        assert_eq!(confirmation.sweeteners, ["Honey"]);
        assert_eq!(
            confirmation.creamers,
            ["Half & Half", "Hazelnut Creamer (flavored)"]
        );

        let orders = sink.orders.lock().unwrap();
        let order = &orders[0];
        assert_eq!(order.customer.phone, None);
        assert_eq!(order.pickup_note.as_deref(), Some("extra hot"));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].creamers.len(), 2);
        assert_eq!(order.order_total, order.lines[0].line_total);
    }

    #[tokio::test]
    async fn test_name_and_email_errors_reported_together() {
        let catalog = sample_catalog();
        let sink = RecordingSink::default();
        let request = CheckoutRequest {
            customer_name: String::new(),
            customer_email: "not-an-email".to_string(),
            ..valid_request()
        };

        let err = finalize(request, &catalog, &sink).await.unwrap_err();

        assert_eq!(
            messages(&err),
            ["Customer name is required.", "A valid email is required."]
        );
        assert!(sink.orders.lock().unwrap().is_empty());
    }

    #[test]
    fn test_every_problem_is_collected() {
        let catalog = sample_catalog();
        let request = CheckoutRequest {
            coffee_id: Some(99),
            quantity: 13,
            customer_phone: Some("5".repeat(40)),
            ..CheckoutRequest::default()
        };

        let err = request.validate(&catalog).unwrap_err();

        assert_eq!(
            messages(&err),
            [
                "Customer name is required.",
                "A valid email is required.",
                "Select a coffee.",
                "Select a size.",
                "Quantity must be between 1 and 12.",
                "Phone must be at most 30 characters.",
            ]
        );
    }

    #[test]
    fn test_low_quantity_is_raised_to_one() {
        let catalog = sample_catalog();
        let request = CheckoutRequest {
            quantity: 0,
            ..valid_request()
        };

        let validated = request.validate(&catalog).unwrap();
        assert_eq!(validated.line().quantity.get(), 1);
    }

    #[tokio::test]
    async fn test_sink_failure_is_generic_persistence_error() {
        let catalog = sample_catalog();

        let err = finalize(valid_request(), &catalog, &FailingSink).await.unwrap_err();

        assert!(matches!(err, CoreError::PersistenceFailed(_)));
        assert_eq!(err.to_string(), "Could not save order");
    }

    #[test]
    fn test_checkout_uses_same_prices_as_cart() {
        let catalog = sample_catalog();
        let validated = valid_request().validate(&catalog).unwrap();
        let (order, priced) = validated.prepare(&catalog).unwrap();

        let cart_line = pricing::price(validated.line(), &catalog).unwrap();
        assert_eq!(priced, cart_line);
        assert_eq!(order.lines[0].unit_price, cart_line.unit_price);
    }

    #[test]
    fn test_form_json_with_legacy_keys() {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{"customer_name": "Bo", "customer_email": "bo@kiosk.test",
                "coffee_id": 1, "size_id": 1, "sweeteners": [1, 1]}"#,
        )
        .unwrap();

        assert_eq!(request.quantity, 0);
        assert_eq!(request.sweetener_ids.len(), 1);
        assert!(request.validate(&sample_catalog()).is_ok());
    }
}
