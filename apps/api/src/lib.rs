//! # brickyard-api: HTTP API Server
//!
//! JSON API over the brickyard storage layer. Routes are grouped per
//! resource under `/api`; state is the cloneable [`Database`] handle.

pub mod error;
pub mod handlers;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use brickyard_db::Database;

/// Builds the full application router. Split out of `main` so tests can
/// drive it in-process.
pub fn router(db: Database) -> Router {
    Router::new()
        // Categories
        .route("/api/categories", get(handlers::categories::list))
        .route("/api/categories", post(handlers::categories::create))
        .route("/api/categories/:id", get(handlers::categories::get))
        .route("/api/categories/:id", put(handlers::categories::update))
        .route("/api/categories/:id", delete(handlers::categories::delete))
        // Items
        .route("/api/items", get(handlers::items::list))
        .route("/api/items", post(handlers::items::create))
        .route("/api/items/low-stock", get(handlers::items::low_stock))
        .route("/api/items/:id", get(handlers::items::get))
        .route("/api/items/:id", put(handlers::items::update))
        .route("/api/items/:id", delete(handlers::items::delete))
        .route("/api/items/:id/stock", patch(handlers::items::update_stock))
        // Sales
        .route("/api/sales", get(handlers::sales::list))
        .route("/api/sales", post(handlers::sales::create))
        .route("/api/sales/summary", get(handlers::reports::summary))
        .route("/api/sales/reports/income", get(handlers::reports::income))
        .route("/api/sales/:id", get(handlers::sales::get))
        .route("/api/sales/:id", delete(handlers::sales::delete))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}
