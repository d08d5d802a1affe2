//! # brickyard-db: Database Layer
//!
//! SQLite storage for the brickyard system, built on sqlx.
//!
//! ## Module Organization
//!
//! - [`pool`] - connection pool creation and the [`Database`] façade
//! - [`migrations`] - embedded schema migrations
//! - [`error`] - database error types
//! - [`repository`] - repositories, including the sale transaction engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use brickyard_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("brickyard.db")).await?;
//! let detail = db.sales().create(&request).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::item::{ItemInput, ItemRepository};
pub use repository::report::ReportRepository;
pub use repository::sale::{SaleListFilter, SaleRepository};
