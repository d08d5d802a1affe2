//! # Validation Module
//!
//! Field-level validation rules, applied by the pricing pass and the API
//! layer before business logic runs.
//!
//! ## Validation Layers
//! ```text
//!   1. Deserialization (serde)   - types, presence of required fields
//!   2. THIS MODULE               - lengths, ranges, sign rules
//!   3. Database constraints      - NOT NULL, UNIQUE, FK, CHECK
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_LINE_QUANTITY, MAX_NAME_LEN, MAX_NOTES_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a required name field (customer name, category name, item name,
/// vehicle type). Must be non-empty after trimming and within length bounds.
pub fn validate_required_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field (addresses, notes, descriptions).
pub fn validate_optional_text(field: &str, value: Option<&str>) -> ValidationResult<()> {
    if let Some(value) = value {
        if value.len() > MAX_NOTES_LEN {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_NOTES_LEN,
            });
        }
    }
    Ok(())
}

/// Validates a line quantity: strictly positive.
///
/// The per-line maximum is checked separately by the pricing pass so it can
/// report the richer `QuantityTooLarge` error.
pub fn validate_quantity(field: &str, quantity: i64) -> ValidationResult<i64> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(quantity)
}

/// Validates that a monetary amount is not negative (prices, charges,
/// hire costs).
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<Money> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(amount)
}

/// Upper bound sanity check for quantities; callers map the failure to
/// `CoreError::QuantityTooLarge`.
pub fn quantity_within_limit(quantity: i64) -> bool {
    quantity <= MAX_LINE_QUANTITY
}
