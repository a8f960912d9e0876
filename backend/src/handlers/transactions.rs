//! HTTP handlers for the transaction journal

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use shared::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::services::transaction::{
    Transaction, TransactionFilter, TransactionService, TransactionStats,
};
use crate::AppState;

/// Query parameters for the recent movements endpoint
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Query parameters for the movement stats endpoint
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// List journaled movements with filters
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Transaction>>> {
    let service = TransactionService::new(state.db);
    let transactions = service.list_transactions(&filter, &pagination).await?;
    Ok(Json(transactions))
}

/// Most recent movements
pub async fn recent_transactions(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    let service = TransactionService::new(state.db);
    let transactions = service.recent_transactions(query.limit.unwrap_or(10)).await?;
    Ok(Json(transactions))
}

/// Movement summary over an optional date range
pub async fn transaction_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<TransactionStats>> {
    let service = TransactionService::new(state.db);
    let stats = service
        .transaction_stats(query.start_date, query.end_date)
        .await?;
    Ok(Json(stats))
}

/// Get a single journaled movement
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> AppResult<Json<Transaction>> {
    let service = TransactionService::new(state.db);
    let transaction = service.get_transaction(&transaction_id).await?;
    Ok(Json(transaction))
}
