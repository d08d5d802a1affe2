//! Report endpoints (read-side aggregation).

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use brickyard_core::{IncomeReport, SalesSummary};
use brickyard_db::Database;

use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeQuery {
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

fn default_period() -> String {
    "monthly".to_string()
}

/// `GET /api/sales/summary`
pub async fn summary(
    State(db): State<Database>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<SalesSummary>> {
    let summary = db
        .reports()
        .summary(query.start_date, query.end_date)
        .await?;
    Ok(Json(summary))
}

/// `GET /api/sales/reports/income`
pub async fn income(
    State(db): State<Database>,
    Query(query): Query<IncomeQuery>,
) -> ApiResult<Json<IncomeReport>> {
    let report = db
        .reports()
        .income_report(&query.period, query.start_date, query.end_date)
        .await?;
    Ok(Json(report))
}
