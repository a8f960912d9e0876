//! HTTP handlers for storage section endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use shared::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::services::storage_section::{
    CreateSectionInput, SectionFilter, SectionService, StorageSectionView, UpdateSectionInput,
};
use crate::AppState;

/// Create a new storage section
pub async fn create_storage_section(
    State(state): State<AppState>,
    Json(input): Json<CreateSectionInput>,
) -> AppResult<Json<StorageSectionView>> {
    let service = SectionService::new(state.db);
    let section = service.create_section(input).await?;
    Ok(Json(section))
}

/// List storage sections with filters
pub async fn list_storage_sections(
    State(state): State<AppState>,
    Query(filter): Query<SectionFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<StorageSectionView>>> {
    let service = SectionService::new(state.db);
    let sections = service.list_sections(&filter, &pagination).await?;
    Ok(Json(sections))
}

/// Get a storage section
pub async fn get_storage_section(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
) -> AppResult<Json<StorageSectionView>> {
    let service = SectionService::new(state.db);
    let section = service.get_section(&section_id).await?;
    Ok(Json(section))
}

/// Update a storage section's capacity
pub async fn update_storage_section(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
    Json(input): Json<UpdateSectionInput>,
) -> AppResult<Json<StorageSectionView>> {
    let service = SectionService::new(state.db);
    let section = service.update_section(&section_id, input).await?;
    Ok(Json(section))
}

/// Delete a storage section
pub async fn delete_storage_section(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
) -> AppResult<Json<()>> {
    let service = SectionService::new(state.db);
    service.delete_section(&section_id).await?;
    Ok(Json(()))
}
