//! # Request Handlers
//!
//! One module per resource. Handlers deserialize the request, call the
//! matching repository, and map errors through [`crate::error::ApiError`].

pub mod categories;
pub mod items;
pub mod reports;
pub mod sales;
