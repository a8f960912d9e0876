//! Large item unit lifecycle
//!
//! Large items are counted per physical unit, so the item's total quantity is
//! simply how many unit rows exist. Registering and consuming a unit move the
//! count; there is no per-unit quantity to update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{
    ItemType, PaginatedResponse, Pagination, PaginationMeta, TransactionType, UnitStatus,
};

use crate::error::{AppError, AppResult};
use crate::services::history::HistoryService;
use crate::services::stats;
use crate::services::storage_section::{move_units, release_units, reserve_units};
use crate::services::transaction::{self, NewTransaction};
use crate::services::rfid::{assign_tag, reassign_tag, release_tag};

/// A large item unit row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LargeItem {
    pub id: String,
    pub item_id: String,
    pub storage_section_id: String,
    pub rfid_tag_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a large item unit
#[derive(Debug, Deserialize)]
pub struct CreateLargeItemInput {
    pub item_id: String,
    pub storage_section_id: String,
    pub rfid_tag_id: String,
    pub user_name: Option<String>,
}

/// Input for updating a large item unit
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLargeItemInput {
    pub status: Option<UnitStatus>,
    pub storage_section_id: Option<String>,
    pub rfid_tag_id: Option<String>,
    pub user_name: Option<String>,
}

/// Filters for large item listings
#[derive(Debug, Default, Deserialize)]
pub struct LargeItemFilter {
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

const LARGE_ITEM_COLUMNS: &str =
    "id, item_id, storage_section_id, rfid_tag_id, status, created_at, updated_at";

/// Large item unit service
#[derive(Clone)]
pub struct LargeItemService {
    db: PgPool,
}

impl LargeItemService {
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

        if item.item_type != ItemType::LargeItem.as_str() {
            return Err(AppError::TypeMismatch {
                field: "item_id".to_string(),
                message: format!(
                    "Item '{}' is a {} item, expected large_item",
                    item_id, item.item_type
                ),
            });
        }
        Ok(item)
    }

    /// Register a new large item unit on a shelf.
    pub async fn create_large_item(&self, input: CreateLargeItemInput) -> AppResult<LargeItem> {
        let item = self.fetch_item(&input.item_id).await?;

        let mut tx = self.db.begin().await?;

        reserve_units(&mut *tx, &input.storage_section_id, item.unit).await?;
        assign_tag(&mut *tx, &input.rfid_tag_id).await?;

        let unit = sqlx::query_as::<_, LargeItem>(&format!(
            r#"
            INSERT INTO large_items (id, item_id, storage_section_id, rfid_tag_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            LARGE_ITEM_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&item.id)
        .bind(&input.storage_section_id)
        .bind(&input.rfid_tag_id)
        .bind(UnitStatus::Available.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let outcome = stats::recompute_large_item_stat(&mut *tx, &item.id).await?;

        transaction::record(
            &mut *tx,
            NewTransaction {
                transaction_type: TransactionType::Register,
                item_type: ItemType::LargeItem,
                item_id: &item.id,
                item_name: &item.name,
                partition_id: None,
                large_item_id: Some(&unit.id),
                container_id: None,
                storage_section_id: &unit.storage_section_id,
                previous_quantity: Some(0),
                current_quantity: Some(1),
                previous_weight: None,
                current_weight: None,
                user_name: input.user_name.as_deref(),
            },
        )
        .await?;

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, "Register Large Item")
            .await;

        Ok(unit)
    }

    pub async fn get_large_item(&self, id: &str) -> AppResult<LargeItem> {
        sqlx::query_as::<_, LargeItem>(&format!(
            "SELECT {} FROM large_items WHERE id = $1",
            LARGE_ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Large item '{}'", id)))
    }

    pub async fn list_large_items(
        &self,
        filter: &LargeItemFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<LargeItem>> {
        let status = filter.status.map(|s| s.as_str().to_string());

        let conditions = r#"
            ($1::TEXT IS NULL OR item_id = $1)
            AND ($2::TEXT IS NULL OR storage_section_id = $2)
            AND ($3::TEXT IS NULL OR status = $3)
            AND ($4::TEXT IS NULL OR rfid_tag_id = $4)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM large_items WHERE {}",
            conditions
        ))
        .bind(&filter.item_id)
        .bind(&filter.storage_section_id)
        .bind(&status)
        .bind(&filter.rfid_tag_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, LargeItem>(&format!(
            "SELECT {} FROM large_items WHERE {} ORDER BY created_at DESC LIMIT $5 OFFSET $6",
            LARGE_ITEM_COLUMNS, conditions
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

    /// Update a large item unit's status, shelf location or tag.
    pub async fn update_large_item(
        &self,
        id: &str,
        input: UpdateLargeItemInput,
    ) -> AppResult<LargeItem> {
        let current = self.get_large_item(id).await?;
        let item = self.fetch_item(&current.item_id).await?;

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

        let unit = sqlx::query_as::<_, LargeItem>(&format!(
            r#"
            UPDATE large_items
            SET status = $1, storage_section_id = $2, rfid_tag_id = $3, updated_at = now()
            WHERE id = $4
            RETURNING {}
            "#,
            LARGE_ITEM_COLUMNS
        ))
        .bind(&status)
        .bind(section_id)
        .bind(tag_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let outcome = stats::recompute_large_item_stat(&mut *tx, &item.id).await?;

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, "Update Large Item")
            .await;

        Ok(unit)
    }

    /// Consume a large item unit: free its tag and shelf space and drop the row.
    pub async fn delete_large_item(&self, id: &str, user_name: Option<&str>) -> AppResult<()> {
        let current = self.get_large_item(id).await?;
        let item = self.fetch_item(&current.item_id).await?;

        let mut tx = self.db.begin().await?;

        release_tag(&mut *tx, &current.rfid_tag_id).await?;
        release_units(&mut *tx, &current.storage_section_id, item.unit).await?;

        sqlx::query("DELETE FROM large_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let outcome = stats::recompute_large_item_stat(&mut *tx, &item.id).await?;

        transaction::record(
            &mut *tx,
            NewTransaction {
                transaction_type: TransactionType::Consumed,
                item_type: ItemType::LargeItem,
                item_id: &item.id,
                item_name: &item.name,
                partition_id: None,
                large_item_id: Some(&current.id),
                container_id: None,
                storage_section_id: &current.storage_section_id,
                previous_quantity: Some(1),
                current_quantity: Some(0),
                previous_weight: None,
                current_weight: None,
                user_name,
            },
        )
        .await?;

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, "Large Item Consumed")
            .await;

        Ok(())
    }

    /// Resolve a large item unit by its RFID tag.
    pub async fn get_by_rfid_tag(&self, tag_id: &str) -> AppResult<LargeItem> {
        sqlx::query_as::<_, LargeItem>(&format!(
            "SELECT {} FROM large_items WHERE rfid_tag_id = $1",
            LARGE_ITEM_COLUMNS
        ))
        .bind(tag_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Large item with RFID tag '{}'", tag_id)))
    }
}
