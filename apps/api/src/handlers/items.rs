//! Item endpoints: CRUD, manual stock overwrite, low-stock alert list.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use brickyard_core::{ItemView, Money, DEFAULT_LOW_STOCK_THRESHOLD};
use brickyard_db::{Database, DbError, ItemInput};

use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub size: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub take_down_charge_per_unit: Option<Money>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<ItemPayload> for ItemInput {
    fn from(p: ItemPayload) -> Self {
        ItemInput {
            name: p.name,
            description: p.description,
            category_id: p.category_id,
            size: p.size,
            price: p.price,
            stock_quantity: p.stock_quantity,
            unit: p.unit,
            take_down_charge_per_unit: p.take_down_charge_per_unit,
            is_active: p.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPayload {
    pub new_stock_quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    #[serde(default)]
    pub threshold: Option<i64>,
}

/// `GET /api/items`
pub async fn list(
    State(db): State<Database>,
    Query(query): Query<ItemListQuery>,
) -> ApiResult<Json<Vec<ItemView>>> {
    let items = db
        .items()
        .list(query.category_id.as_deref(), query.is_active)
        .await?;
    Ok(Json(items))
}

/// `GET /api/items/low-stock`
pub async fn low_stock(
    State(db): State<Database>,
    Query(query): Query<LowStockQuery>,
) -> ApiResult<Json<Vec<ItemView>>> {
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let items = db.items().low_stock(threshold).await?;
    Ok(Json(items))
}

/// `GET /api/items/:id`
pub async fn get(State(db): State<Database>, Path(id): Path<String>) -> ApiResult<Json<ItemView>> {
    let item = db
        .items()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| DbError::not_found("Item", &id))?;
    Ok(Json(item))
}

/// `POST /api/items`
pub async fn create(
    State(db): State<Database>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<(StatusCode, Json<ItemView>)> {
    let item = db.items().insert(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `PUT /api/items/:id`
pub async fn update(
    State(db): State<Database>,
    Path(id): Path<String>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<StatusCode> {
    db.items().update(&id, payload.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /api/items/:id/stock`
pub async fn update_stock(
    State(db): State<Database>,
    Path(id): Path<String>,
    Json(payload): Json<StockPayload>,
) -> ApiResult<StatusCode> {
    db.items()
        .update_stock(&id, payload.new_stock_quantity)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/items/:id`
pub async fn delete(State(db): State<Database>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    db.items().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
