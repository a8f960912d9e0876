//! Partition unit lifecycle
//!
//! A partition is one RFID-tagged physical tray of a partition-type item.
//! Every mutation reserves or releases storage units, keeps the tag ledger in
//! step, recomputes the item's stat row in the same transaction, journals the
//! movement, and reports the recompute outcome so a history snapshot can be
//! recorded after commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{
    validate_quantity, ItemType, PaginatedResponse, Pagination, PaginationMeta, TransactionType,
    UnitStatus,
};

use crate::error::{AppError, AppResult};
use crate::services::history::HistoryService;
use crate::services::stats;
use crate::services::storage_section::{move_units, release_units, reserve_units};
use crate::services::transaction::{self, NewTransaction};
use crate::services::rfid::{assign_tag, reassign_tag, release_tag};

/// A partition unit row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Partition {
    pub id: String,
    pub item_id: String,
    pub storage_section_id: String,
    pub rfid_tag_id: String,
    pub quantity: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a partition
#[derive(Debug, Deserialize)]
pub struct CreatePartitionInput {
    pub item_id: String,
    pub storage_section_id: String,
    pub rfid_tag_id: String,
    pub quantity: i32,
    pub user_name: Option<String>,
}

/// Input for updating a partition
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePartitionInput {
    pub quantity: Option<i32>,
    pub status: Option<UnitStatus>,
    pub storage_section_id: Option<String>,
    pub rfid_tag_id: Option<String>,
    pub user_name: Option<String>,
}

/// Filters for partition listings
#[derive(Debug, Default, Deserialize)]
pub struct PartitionFilter {
    pub item_id: Option<String>,
    pub storage_section_id: Option<String>,
    pub status: Option<UnitStatus>,
    pub rfid_tag_id: Option<String>,
}

#[derive(Debug, FromRow)]
struct ItemRef {
    id: String,
    name: String,
    item_type: String,
    unit: i32,
}

const PARTITION_COLUMNS: &str =
    "id, item_id, storage_section_id, rfid_tag_id, quantity, status, created_at, updated_at";

/// Partition unit service
#[derive(Clone)]
pub struct PartitionService {
    db: PgPool,
}

impl PartitionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_item(&self, item_id: &str) -> AppResult<ItemRef> {
        let item = sqlx::query_as::<_, ItemRef>(
            "SELECT id, name, item_type, unit FROM items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item '{}'", item_id)))?;

        if item.item_type != ItemType::Partition.as_str() {
            return Err(AppError::TypeMismatch {
                field: "item_id".to_string(),
                message: format!(
                    "Item '{}' is a {} item, expected partition",
                    item_id, item.item_type
                ),
            });
        }
        Ok(item)
    }

    async fn partition_capacity(&self, item_id: &str) -> AppResult<i32> {
        let capacity = sqlx::query_scalar::<_, i32>(
            "SELECT partition_capacity FROM partition_stats WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;
        Ok(capacity)
    }

    /// Register a new partition on a shelf.
    pub async fn create_partition(&self, input: CreatePartitionInput) -> AppResult<Partition> {
        let item = self.fetch_item(&input.item_id).await?;
        let capacity = self.partition_capacity(&item.id).await?;

        validate_quantity(input.quantity, capacity).map_err(|e| AppError::Validation {
            field: "quantity".to_string(),
            message: e.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        reserve_units(&mut *tx, &input.storage_section_id, item.unit).await?;
        assign_tag(&mut *tx, &input.rfid_tag_id).await?;

        let partition = sqlx::query_as::<_, Partition>(&format!(
            r#"
            INSERT INTO partitions (id, item_id, storage_section_id, rfid_tag_id, quantity, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PARTITION_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&item.id)
        .bind(&input.storage_section_id)
        .bind(&input.rfid_tag_id)
        .bind(input.quantity)
        .bind(UnitStatus::Available.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let outcome = stats::recompute_partition_stat(&mut *tx, &item.id).await?;

        transaction::record(
            &mut *tx,
            NewTransaction {
                transaction_type: TransactionType::Register,
                item_type: ItemType::Partition,
                item_id: &item.id,
                item_name: &item.name,
                partition_id: Some(&partition.id),
                large_item_id: None,
                container_id: None,
                storage_section_id: &partition.storage_section_id,
                previous_quantity: Some(0),
                current_quantity: Some(partition.quantity),
                previous_weight: None,
                current_weight: None,
                user_name: input.user_name.as_deref(),
            },
        )
        .await?;

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, "Register Partition")
            .await;

        Ok(partition)
    }

    pub async fn get_partition(&self, id: &str) -> AppResult<Partition> {
        sqlx::query_as::<_, Partition>(&format!(
            "SELECT {} FROM partitions WHERE id = $1",
            PARTITION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Partition '{}'", id)))
    }

    pub async fn list_partitions(
        &self,
        filter: &PartitionFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Partition>> {
        let status = filter.status.map(|s| s.as_str().to_string());

        let conditions = r#"
            ($1::TEXT IS NULL OR item_id = $1)
            AND ($2::TEXT IS NULL OR storage_section_id = $2)
            AND ($3::TEXT IS NULL OR status = $3)
            AND ($4::TEXT IS NULL OR rfid_tag_id = $4)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM partitions WHERE {}",
            conditions
        ))
        .bind(&filter.item_id)
        .bind(&filter.storage_section_id)
        .bind(&status)
        .bind(&filter.rfid_tag_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, Partition>(&format!(
            "SELECT {} FROM partitions WHERE {} ORDER BY created_at DESC LIMIT $5 OFFSET $6",
            PARTITION_COLUMNS, conditions
        ))
        .bind(&filter.item_id)
        .bind(&filter.storage_section_id)
        .bind(&status)
        .bind(&filter.rfid_tag_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: rows,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Update a partition: quantity, status, shelf location or tag. A
    /// quantity decrease journals a withdraw, an increase a return.
    pub async fn update_partition(
        &self,
        id: &str,
        input: UpdatePartitionInput,
    ) -> AppResult<Partition> {
        let current = self.get_partition(id).await?;
        let item = self.fetch_item(&current.item_id).await?;

        let quantity = match input.quantity {
            Some(quantity) => {
                let capacity = self.partition_capacity(&item.id).await?;
                validate_quantity(quantity, capacity).map_err(|e| AppError::Validation {
                    field: "quantity".to_string(),
                    message: e.to_string(),
                })?;
                quantity
            }
            None => current.quantity,
        };
        let section_id = input
            .storage_section_id
            .as_deref()
            .unwrap_or(&current.storage_section_id);
        let tag_id = input.rfid_tag_id.as_deref().unwrap_or(&current.rfid_tag_id);
        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| current.status.clone());

        let mut tx = self.db.begin().await?;

        if section_id != current.storage_section_id {
            move_units(&mut *tx, &current.storage_section_id, section_id, item.unit).await?;
        }
        if tag_id != current.rfid_tag_id {
            reassign_tag(&mut *tx, &current.rfid_tag_id, tag_id).await?;
        }

        let partition = sqlx::query_as::<_, Partition>(&format!(
            r#"
            UPDATE partitions
            SET quantity = $1, status = $2, storage_section_id = $3, rfid_tag_id = $4,
                updated_at = now()
            WHERE id = $5
            RETURNING {}
            "#,
            PARTITION_COLUMNS
        ))
        .bind(quantity)
        .bind(&status)
        .bind(section_id)
        .bind(tag_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let outcome = stats::recompute_partition_stat(&mut *tx, &item.id).await?;

        let change_source = if quantity < current.quantity {
            transaction::record(
                &mut *tx,
                NewTransaction {
                    transaction_type: TransactionType::Withdraw,
                    item_type: ItemType::Partition,
                    item_id: &item.id,
                    item_name: &item.name,
                    partition_id: Some(&partition.id),
                    large_item_id: None,
                    container_id: None,
                    storage_section_id: section_id,
                    previous_quantity: Some(current.quantity),
                    current_quantity: Some(quantity),
                    previous_weight: None,
                    current_weight: None,
                    user_name: input.user_name.as_deref(),
                },
            )
            .await?;
            "Withdraw Partition"
        } else if quantity > current.quantity {
            transaction::record(
                &mut *tx,
                NewTransaction {
                    transaction_type: TransactionType::Return,
                    item_type: ItemType::Partition,
                    item_id: &item.id,
                    item_name: &item.name,
                    partition_id: Some(&partition.id),
                    large_item_id: None,
                    container_id: None,
                    storage_section_id: section_id,
                    previous_quantity: Some(current.quantity),
                    current_quantity: Some(quantity),
                    previous_weight: None,
                    current_weight: None,
                    user_name: input.user_name.as_deref(),
                },
            )
            .await?;
            "Return Partition"
        } else {
            "Update Partition"
        };

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, change_source)
            .await;

        Ok(partition)
    }

    /// Consume a partition: free its tag and shelf space and drop the row.
    pub async fn delete_partition(&self, id: &str, user_name: Option<&str>) -> AppResult<()> {
        let current = self.get_partition(id).await?;
        let item = self.fetch_item(&current.item_id).await?;

        let mut tx = self.db.begin().await?;

        release_tag(&mut *tx, &current.rfid_tag_id).await?;
        release_units(&mut *tx, &current.storage_section_id, item.unit).await?;

        sqlx::query("DELETE FROM partitions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let outcome = stats::recompute_partition_stat(&mut *tx, &item.id).await?;

        transaction::record(
            &mut *tx,
            NewTransaction {
                transaction_type: TransactionType::Consumed,
                item_type: ItemType::Partition,
                item_id: &item.id,
                item_name: &item.name,
                partition_id: Some(&current.id),
                large_item_id: None,
                container_id: None,
                storage_section_id: &current.storage_section_id,
                previous_quantity: Some(current.quantity),
                current_quantity: Some(0),
                previous_weight: None,
                current_weight: None,
                user_name,
            },
        )
        .await?;

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, "Partition Consumed")
            .await;

        Ok(())
    }

    /// Resolve a partition by its RFID tag.
    pub async fn get_by_rfid_tag(&self, tag_id: &str) -> AppResult<Partition> {
        sqlx::query_as::<_, Partition>(&format!(
            "SELECT {} FROM partitions WHERE rfid_tag_id = $1",
            PARTITION_COLUMNS
        ))
        .bind(tag_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Partition with RFID tag '{}'", tag_id)))
    }
}
