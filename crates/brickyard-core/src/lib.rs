//! # brickyard-core: Pure Business Logic
//!
//! The heart of the brickyard inventory/sales system: money arithmetic,
//! domain types, the sale pricing pass, and validation rules. Zero I/O.
//!
//! ## Architecture Position
//! ```text
//!   apps/api (axum handlers)
//!        │
//!        ▼
//!   brickyard-db (SQLite repositories, transactions)
//!        │
//!        ▼
//!   ★ brickyard-core (THIS CRATE) ★
//!     NO I/O - NO DATABASE - NO NETWORK - PURE FUNCTIONS
//! ```
//!
//! ## Modules
//!
//! - [`money`] - integer-cents `Money` type (no floating point in totals)
//! - [`types`] - domain entities, request descriptors, report views
//! - [`pricing`] - the sale engine's validate-then-compute pass
//! - [`validation`] - field-level rules
//! - [`error`] - typed domain errors

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{price_sale, PricedLine, PricedSale, StockDecrement};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of generated sale numbers: `SALE-YYYYMMDD-NNNN`.
pub const SALE_NUMBER_PREFIX: &str = "SALE";

/// Width of the zero-padded sequence in a sale number.
pub const SALE_NUMBER_SEQ_WIDTH: usize = 4;

/// Default low-stock alert threshold (items at or below this are flagged).
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Default unit of measure for items.
pub const DEFAULT_ITEM_UNIT: &str = "pieces";

/// Maximum quantity accepted on a single sale line. Catches typo-sized
/// orders before they reach the stock check.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Maximum length for name-like fields.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length for free-text fields (addresses, notes).
pub const MAX_NOTES_LEN: usize = 500;
