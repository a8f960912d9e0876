//! HTTP handlers for partition unit endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use shared::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::services::partition::{
    CreatePartitionInput, Partition, PartitionFilter, PartitionService, UpdatePartitionInput,
};
use crate::AppState;

/// Query parameters naming the acting user
#[derive(Debug, Default, Deserialize)]
pub struct ActorQuery {
    pub user_name: Option<String>,
}

/// Register a new partition
pub async fn create_partition(
    State(state): State<AppState>,
    Json(input): Json<CreatePartitionInput>,
) -> AppResult<Json<Partition>> {
    let service = PartitionService::new(state.db);
    let partition = service.create_partition(input).await?;
    Ok(Json(partition))
}

/// List partitions with filters
pub async fn list_partitions(
    State(state): State<AppState>,
    Query(filter): Query<PartitionFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Partition>>> {
    let service = PartitionService::new(state.db);
    let partitions = service.list_partitions(&filter, &pagination).await?;
    Ok(Json(partitions))
}

/// Get a partition
pub async fn get_partition(
    State(state): State<AppState>,
    Path(partition_id): Path<String>,
) -> AppResult<Json<Partition>> {
    let service = PartitionService::new(state.db);
    let partition = service.get_partition(&partition_id).await?;
    Ok(Json(partition))
}

/// Resolve a partition by its RFID tag
pub async fn get_partition_by_rfid(
    State(state): State<AppState>,
    Path(tag_id): Path<String>,
) -> AppResult<Json<Partition>> {
    let service = PartitionService::new(state.db);
    let partition = service.get_by_rfid_tag(&tag_id).await?;
    Ok(Json(partition))
}

/// Update a partition
pub async fn update_partition(
    State(state): State<AppState>,
    Path(partition_id): Path<String>,
    Json(input): Json<UpdatePartitionInput>,
) -> AppResult<Json<Partition>> {
    let service = PartitionService::new(state.db);
    let partition = service.update_partition(&partition_id, input).await?;
    Ok(Json(partition))
}

/// Consume a partition
pub async fn delete_partition(
    State(state): State<AppState>,
    Path(partition_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> AppResult<Json<()>> {
    let service = PartitionService::new(state.db);
    service
        .delete_partition(&partition_id, actor.user_name.as_deref())
        .await?;
    Ok(Json(()))
}
