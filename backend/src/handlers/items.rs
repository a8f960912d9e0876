//! HTTP handlers for item catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use shared::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::services::history::ItemStatHistory;
use crate::services::item::{
    CreateItemInput, ItemFilter, ItemResponse, ItemService, ItemStats, ItemWithStats,
    UpdateItemInput,
};
use crate::services::HistoryService;
use crate::AppState;

fn item_service(state: &AppState) -> ItemService {
    ItemService::new(state.db.clone(), state.config.storage.clone())
}

/// Create a new item with its stat row
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItemInput>,
) -> AppResult<Json<ItemResponse>> {
    let item = item_service(&state).create_item(input).await?;
    Ok(Json(item))
}

/// List items with search and type filters
pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<ItemResponse>>> {
    let items = item_service(&state).list_items(&filter, &pagination).await?;
    Ok(Json(items))
}

/// Get an item together with its stat row and unit count
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<ItemWithStats>> {
    let item = item_service(&state).get_item_with_stats(&item_id).await?;
    Ok(Json(item))
}

/// Get an item's aggregate stat row
pub async fn get_item_stats(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<ItemStats>> {
    let stats = item_service(&state).get_stats(&item_id).await?;
    Ok(Json(stats))
}

/// Update an item; threshold changes re-run the stat aggregator
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<ItemResponse>> {
    let item = item_service(&state).update_item(&item_id, input).await?;
    Ok(Json(item))
}

/// Delete an item
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<()>> {
    item_service(&state).delete_item(&item_id).await?;
    Ok(Json(()))
}

/// Raw stat history rows for an item, newest first
pub async fn get_item_history(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<ItemStatHistory>>> {
    let service = HistoryService::new(state.db);
    let history = service.list_for_item(&item_id, &pagination).await?;
    Ok(Json(history))
}
