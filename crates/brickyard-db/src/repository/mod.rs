//! # Repository Module
//!
//! One repository per aggregate, each a thin handle over the shared pool:
//!
//! - [`category::CategoryRepository`] - category CRUD
//! - [`item::ItemRepository`] - item CRUD, stock overwrite, low-stock query
//! - [`sale::SaleRepository`] - the sale transaction engine (create/delete
//!   with stock consistency) plus sale reads
//! - [`report::ReportRepository`] - read-side aggregation

pub mod category;
pub mod item;
pub mod report;
pub mod sale;
