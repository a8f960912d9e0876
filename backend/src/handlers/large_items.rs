//! HTTP handlers for large item unit endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use shared::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::handlers::partitions::ActorQuery;
use crate::services::large_item::{
    CreateLargeItemInput, LargeItem, LargeItemFilter, LargeItemService, UpdateLargeItemInput,
};
use crate::AppState;

/// Register a new large item unit
pub async fn create_large_item(
    State(state): State<AppState>,
    Json(input): Json<CreateLargeItemInput>,
) -> AppResult<Json<LargeItem>> {
    let service = LargeItemService::new(state.db);
    let unit = service.create_large_item(input).await?;
    Ok(Json(unit))
}

/// List large item units with filters
pub async fn list_large_items(
    State(state): State<AppState>,
    Query(filter): Query<LargeItemFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<LargeItem>>> {
    let service = LargeItemService::new(state.db);
    let units = service.list_large_items(&filter, &pagination).await?;
    Ok(Json(units))
}

/// Get a large item unit
pub async fn get_large_item(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
) -> AppResult<Json<LargeItem>> {
    let service = LargeItemService::new(state.db);
    let unit = service.get_large_item(&unit_id).await?;
    Ok(Json(unit))
}

/// Resolve a large item unit by its RFID tag
pub async fn get_large_item_by_rfid(
    State(state): State<AppState>,
    Path(tag_id): Path<String>,
) -> AppResult<Json<LargeItem>> {
    let service = LargeItemService::new(state.db);
    let unit = service.get_by_rfid_tag(&tag_id).await?;
    Ok(Json(unit))
}

/// Update a large item unit
pub async fn update_large_item(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
    Json(input): Json<UpdateLargeItemInput>,
) -> AppResult<Json<LargeItem>> {
    let service = LargeItemService::new(state.db);
    let unit = service.update_large_item(&unit_id, input).await?;
    Ok(Json(unit))
}

/// Consume a large item unit
pub async fn delete_large_item(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> AppResult<Json<()>> {
    let service = LargeItemService::new(state.db);
    service
        .delete_large_item(&unit_id, actor.user_name.as_deref())
        .await?;
    Ok(Json(()))
}
