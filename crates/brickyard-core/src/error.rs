//! # Error Types
//!
//! Domain-specific error types for brickyard-core.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item name, quantities, IDs)
//! 3. Errors are enum variants, never bare Strings
//!
//! The display strings of [`CoreError::ItemNotFound`] and
//! [`CoreError::InsufficientStock`] are the exact messages the HTTP layer
//! returns to clients, so changing them is an API change.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations raised by the pricing pass or
/// the sale engine before anything is written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale line references an item that does not exist.
    #[error("Item with ID {0} not found")]
    ItemNotFound(String),

    /// Requested quantity exceeds the stock remaining for an item.
    ///
    /// `available` reflects the stock left after earlier lines of the same
    /// request have claimed theirs, so two lines of one item cannot jointly
    /// overdraw.
    #[error("Insufficient stock for item {name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// A sale must contain at least one line item.
    #[error("Sale must contain at least one line item")]
    EmptySale,

    /// Line quantity exceeds the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A line total or sale total exceeds the representable amount range.
    #[error("Sale amounts exceed the supported range")]
    AmountTooLarge,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when a field fails its format/range rules, before business logic
/// runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparseable date or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
