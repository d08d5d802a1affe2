//! Sale endpoints.
//!
//! `create` and `delete` are the HTTP face of the sale transaction engine;
//! the engine itself lives in the database layer. The list endpoint reports
//! the unpaginated match count in an `X-Total-Count` header.

use axum::extract::{Path, Query, State};
use axum::http::header::HeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use brickyard_core::{SaleDetail, SaleRequest};
use brickyard_db::{Database, DbError, SaleListFilter};

use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleListQuery {
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

impl From<SaleListQuery> for SaleListFilter {
    fn from(q: SaleListQuery) -> Self {
        // Bounds are enforced by the repository, not here.
        let defaults = SaleListFilter::default();
        SaleListFilter {
            start_date: q.start_date,
            end_date: q.end_date,
            page: q.page.unwrap_or(defaults.page),
            page_size: q.page_size.unwrap_or(defaults.page_size),
        }
    }
}

/// `GET /api/sales`
pub async fn list(
    State(db): State<Database>,
    Query(query): Query<SaleListQuery>,
) -> ApiResult<Response> {
    let filter: SaleListFilter = query.into();
    let (sales, total) = db.sales().list(&filter).await?;

    let mut response = Json(sales).into_response();
    response
        .headers_mut()
        .insert("X-Total-Count", HeaderValue::from(total as u64));
    Ok(response)
}

/// `GET /api/sales/:id`
pub async fn get(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleDetail>> {
    let detail = db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", &id))?;
    Ok(Json(detail))
}

/// `POST /api/sales`
pub async fn create(
    State(db): State<Database>,
    Json(request): Json<SaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleDetail>)> {
    let detail = db.sales().create(&request).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `DELETE /api/sales/:id`
pub async fn delete(State(db): State<Database>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    db.sales().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
