//! HTTP handlers for RFID tag endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use shared::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::services::rfid::{CreateRfidTagInput, RfidService, RfidTag};
use crate::AppState;

/// Query parameters for tag listings
#[derive(Debug, Default, Deserialize)]
pub struct TagListQuery {
    pub assigned: Option<bool>,
}

/// Register a new RFID tag
pub async fn create_rfid_tag(
    State(state): State<AppState>,
    Json(input): Json<CreateRfidTagInput>,
) -> AppResult<Json<RfidTag>> {
    let service = RfidService::new(state.db);
    let tag = service.create_tag(input).await?;
    Ok(Json(tag))
}

/// List RFID tags, optionally by assignment state
pub async fn list_rfid_tags(
    State(state): State<AppState>,
    Query(query): Query<TagListQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<RfidTag>>> {
    let service = RfidService::new(state.db);
    let tags = service.list_tags(query.assigned, &pagination).await?;
    Ok(Json(tags))
}

/// Get an RFID tag
pub async fn get_rfid_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<String>,
) -> AppResult<Json<RfidTag>> {
    let service = RfidService::new(state.db);
    let tag = service.get_tag(&tag_id).await?;
    Ok(Json(tag))
}

/// Delete an RFID tag
pub async fn delete_rfid_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<String>,
) -> AppResult<Json<()>> {
    let service = RfidService::new(state.db);
    service.delete_tag(&tag_id).await?;
    Ok(Json(()))
}
