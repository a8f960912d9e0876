//! HTTP handlers for container unit endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use shared::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::handlers::partitions::ActorQuery;
use crate::services::container::{
    ContainerFilter, ContainerService, ContainerView, CreateContainerInput, UpdateContainerInput,
};
use crate::AppState;

/// Register a new container
pub async fn create_container(
    State(state): State<AppState>,
    Json(input): Json<CreateContainerInput>,
) -> AppResult<Json<ContainerView>> {
    let service = ContainerService::new(state.db);
    let container = service.create_container(input).await?;
    Ok(Json(container))
}

/// List containers with filters
pub async fn list_containers(
    State(state): State<AppState>,
    Query(filter): Query<ContainerFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<ContainerView>>> {
    let service = ContainerService::new(state.db);
    let containers = service.list_containers(&filter, &pagination).await?;
    Ok(Json(containers))
}

/// Get a container
pub async fn get_container(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
) -> AppResult<Json<ContainerView>> {
    let service = ContainerService::new(state.db);
    let container = service.get_container(&container_id).await?;
    Ok(Json(container))
}

/// Resolve a container by its RFID tag
pub async fn get_container_by_rfid(
    State(state): State<AppState>,
    Path(tag_id): Path<String>,
) -> AppResult<Json<ContainerView>> {
    let service = ContainerService::new(state.db);
    let container = service.get_by_rfid_tag(&tag_id).await?;
    Ok(Json(container))
}

/// Update a container
pub async fn update_container(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
    Json(input): Json<UpdateContainerInput>,
) -> AppResult<Json<ContainerView>> {
    let service = ContainerService::new(state.db);
    let container = service.update_container(&container_id, input).await?;
    Ok(Json(container))
}

/// Consume a container
pub async fn delete_container(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> AppResult<Json<()>> {
    let service = ContainerService::new(state.db);
    service
        .delete_container(&container_id, actor.user_name.as_deref())
        .await?;
    Ok(Json(()))
}
