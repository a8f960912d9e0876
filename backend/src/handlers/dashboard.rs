//! HTTP handlers for the stock-level dashboard
//!
//! Both endpoints replay stat history snapshots into per-period series; the
//! heavy lifting lives in the shared aggregation functions.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use shared::{Granularity, ItemPeriodStatus, PeriodStatusCounts};

use crate::error::{AppError, AppResult};
use crate::services::HistoryService;
use crate::AppState;

/// Query parameters for history aggregation endpoints
#[derive(Debug, Deserialize)]
pub struct HistoryRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub granularity: String,
}

impl HistoryRangeQuery {
    fn granularity(&self) -> AppResult<Granularity> {
        Granularity::from_str(&self.granularity).map_err(|e| AppError::ValidationRange {
            field: "granularity".to_string(),
            message: e.to_string(),
        })
    }
}

/// Fleet-wide stock status counts per period
pub async fn item_status_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryRangeQuery>,
) -> AppResult<Json<Vec<PeriodStatusCounts>>> {
    let granularity = query.granularity()?;
    let service = HistoryService::new(state.db);
    let counts = service
        .aggregate_item_status_history(query.start_date, query.end_date, granularity)
        .await?;
    Ok(Json(counts))
}

/// Per-item stock level series with carry-forward
pub async fn item_history(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(query): Query<HistoryRangeQuery>,
) -> AppResult<Json<Vec<ItemPeriodStatus>>> {
    let granularity = query.granularity()?;
    let service = HistoryService::new(state.db);
    let series = service
        .aggregate_item_history_for_item(&item_id, query.start_date, query.end_date, granularity)
        .await?;
    Ok(Json(series))
}
