//! Category endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use brickyard_core::Category;
use brickyard_db::{Database, DbError};

use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /api/categories`
pub async fn list(State(db): State<Database>) -> ApiResult<Json<Vec<Category>>> {
    let categories = db.categories().list().await?;
    Ok(Json(categories))
}

/// `GET /api/categories/:id`
pub async fn get(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    let category = db
        .categories()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| DbError::not_found("Category", &id))?;
    Ok(Json(category))
}

/// `POST /api/categories`
pub async fn create(
    State(db): State<Database>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = db
        .categories()
        .insert(&payload.name, payload.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /api/categories/:id`
pub async fn update(
    State(db): State<Database>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<StatusCode> {
    db.categories()
        .update(&id, &payload.name, payload.description.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/categories/:id`
pub async fn delete(State(db): State<Database>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    db.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
