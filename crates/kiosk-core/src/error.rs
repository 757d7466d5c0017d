//! # Error Types
//!
//! Domain-specific error types for kiosk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kiosk-core errors (this file)                                         │
//! │  ├── CoreError        - Pricing, cart and checkout failures            │
//! │  └── ValidationError  - One user-facing input problem                  │
//! │                                                                         │
//! │  kiosk-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Server API errors (in app)                                            │
//! │  └── ApiError         - What the kiosk front end sees (JSON)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front end              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Validation errors accumulate; one request can report several
//! 3. Each `ValidationError` renders as the exact sentence shown to customers
//! 4. Storage failures keep their source but display generically

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Catalog Collections
// =============================================================================

/// The four catalog collections a reference can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Coffees,
    Sizes,
    Sweeteners,
    Creamers,
}

impl Collection {
    /// Singular noun used in messages ("coffee", "size", ...).
    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Coffees => "coffee",
            Collection::Sizes => "size",
            Collection::Sweeteners => "sweetener",
            Collection::Creamers => "creamer",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Coffees => "coffees",
            Collection::Sizes => "sizes",
            Collection::Sweeteners => "sweeteners",
            Collection::Creamers => "creamers",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// ## User Workflow
/// ```text
/// Add to cart / Checkout
///      │
///      ├── unknown coffee or size ─────► InvalidReference   (pricing)
///      ├── bad form fields ────────────► ValidationFailed   (all at once)
///      ├── stale cart line id ─────────► LineNotFound       (update only)
///      └── transaction rolled back ────► PersistenceFailed  ("Could not save order")
/// ```
#[derive(Debug, Error)]
pub enum CoreError {
    /// A coffee or size id is missing or does not resolve in the catalog
    /// snapshot.
    #[error("{}", reference_message(.collection, .id))]
    InvalidReference {
        collection: Collection,
        id: Option<i64>,
    },

    /// One or more input problems. Nothing was changed.
    #[error("Validation failed: {}", join_messages(.0))]
    ValidationFailed(Vec<ValidationError>),

    /// The cart has no line with this id.
    #[error("Item not found in cart: {0}")]
    LineNotFound(String),

    /// Writing the order failed and the transaction was rolled back.
    ///
    /// The source error is kept for logging only; the display text is
    /// safe to show to customers.
    #[error("Could not save order")]
    PersistenceFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// Wraps a storage error from an [`OrderSink`](crate::checkout::OrderSink).
    pub fn persistence<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CoreError::PersistenceFailed(Box::new(err))
    }

    /// The accumulated validation errors, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            CoreError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::ValidationFailed(vec![err])
    }
}

fn reference_message(collection: &Collection, id: &Option<i64>) -> String {
    match id {
        Some(id) => format!("Unknown {} id {id}", collection.singular()),
        None => format!("No {} given", collection.singular()),
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The display strings are the messages the kiosk shows next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    #[error("{label} is required.")]
    Required { field: &'static str, label: &'static str },

    /// The email address is not shaped like `local@domain.tld`.
    #[error("A valid email is required.")]
    InvalidEmail,

    /// A coffee or size choice is missing or unknown.
    #[error("Select a {}.", .collection.singular())]
    NotSelected { collection: Collection },

    /// Numeric value is out of range.
    #[error("{label} must be between {min} and {max}.")]
    OutOfRange {
        field: &'static str,
        label: &'static str,
        min: i64,
        max: i64,
    },

    /// Text field exceeds its column length.
    #[error("{label} must be at most {max} characters.")]
    TooLong {
        field: &'static str,
        label: &'static str,
        max: usize,
    },
}

impl ValidationError {
    /// Machine-readable name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::TooLong { field, .. } => field,
            ValidationError::InvalidEmail => "customer_email",
            ValidationError::NotSelected { collection } => match collection {
                Collection::Coffees => "coffee_id",
                Collection::Sizes => "size_id",
                Collection::Sweeteners => "sweetener_ids",
                Collection::Creamers => "creamer_ids",
            },
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
