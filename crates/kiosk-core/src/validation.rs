//! # Validation Module
//!
//! Field validators for the checkout form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Kiosk front end                                               │
//! │  ├── Required fields, stepper bounds                                    │
//! │  └── Immediate feedback                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: kiosk-core (THIS MODULE + checkout)                           │
//! │  ├── Normalization (trim, lowercase email)                              │
//! │  └── Every error collected, reported together                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK (quantity BETWEEN 1 AND 12)                                  │
//! │  ├── UNIQUE (customers.email)                                           │
//! │  └── Foreign keys to catalog rows                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each validator returns the cleaned value so callers never reuse the raw
//! input by accident.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Column Limits
// =============================================================================

pub const MAX_CUSTOMER_NAME_LEN: usize = 120;
pub const MAX_EMAIL_LEN: usize = 150;
pub const MAX_PHONE_LEN: usize = 30;
pub const MAX_PICKUP_NOTE_LEN: usize = 120;

// =============================================================================
// String Validators
// =============================================================================

/// Validates the customer's name.
///
/// ## Example
/// ```rust
/// use kiosk_core::validation::validate_customer_name;
///
/// assert_eq!(validate_customer_name("  Ada ").unwrap(), "Ada");
/// assert!(validate_customer_name("   ").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name",
            label: "Customer name",
        });
    }

    check_length(name, "customer_name", "Customer name", MAX_CUSTOMER_NAME_LEN)?;
    Ok(name.to_string())
}

/// Validates and normalizes an email address.
///
/// ## Rules
/// - Trimmed and lowercased before checking
/// - Exactly one `@`, with a non-empty local part and domain
/// - The domain contains a dot that is neither first nor last
/// - No whitespace anywhere
/// - At most 150 characters
///
/// ## Example
/// ```rust
/// use kiosk_core::validation::validate_email;
///
/// assert_eq!(validate_email(" Ada@Example.COM ").unwrap(), "ada@example.com");
/// assert!(validate_email("ada@localhost").is_err());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_lowercase();

    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::InvalidEmail);
    }

    let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidEmail)?;

    let well_formed = !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());

    if !well_formed {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(email)
}

/// Validates an optional free-text field.
///
/// Empty input (after trimming) becomes `None`.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &'static str,
    label: &'static str,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            check_length(text, field, label, max)?;
            Ok(Some(text.to_string()))
        }
    }
}

fn check_length(
    value: &str,
    field: &'static str,
    label: &'static str,
    max: usize,
) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, label, max });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a checkout quantity.
///
/// Checkout raises anything below 1 to 1 (an empty stepper) but rejects
/// counts above the maximum instead of silently shrinking the order.
///
/// ## Example
/// ```rust
/// use kiosk_core::validation::validate_checkout_quantity;
///
/// assert_eq!(validate_checkout_quantity(0).unwrap().get(), 1);
/// assert_eq!(validate_checkout_quantity(12).unwrap().get(), 12);
/// assert!(validate_checkout_quantity(13).is_err());
/// ```
pub fn validate_checkout_quantity(quantity: i64) -> ValidationResult<crate::Quantity> {
    let quantity = quantity.max(crate::MIN_ITEM_QUANTITY);

    if quantity > crate::MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            label: "Quantity",
            min: crate::MIN_ITEM_QUANTITY,
            max: crate::MAX_ITEM_QUANTITY,
        });
    }

    Ok(crate::Quantity::clamped(quantity))
}

// =============================================================================
// Unit Tests
// =============================================================================
