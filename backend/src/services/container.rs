//! Container unit lifecycle
//!
//! Containers track the weight of their contents; the item's total quantity is
//! derived from the summed weight and the per-item weight configured on the
//! stat row. A weight decrease journals a withdraw, an increase a return.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use shared::{
    container_quantity, validate_weight, ItemType, PaginatedResponse, Pagination, PaginationMeta,
    TransactionType, UnitStatus,
};

use crate::error::{AppError, AppResult};
use crate::services::history::HistoryService;
use crate::services::stats;
use crate::services::storage_section::{move_units, release_units, reserve_units};
use crate::services::transaction::{self, NewTransaction};
use crate::services::rfid::{assign_tag, reassign_tag, release_tag};

/// A container unit row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Container {
    pub id: String,
    pub item_id: String,
    pub storage_section_id: String,
    pub rfid_tag_id: String,
    pub items_weight: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Container response with the item count derived from its contents weight
#[derive(Debug, Clone, Serialize)]
pub struct ContainerView {
    #[serde(flatten)]
    pub container: Container,
    /// `items_weight` divided by the item's configured per-item weight;
    /// absent while that weight is unconfigured
    pub quantity: Option<i64>,
}

fn view(container: Container, container_item_weight: Option<Decimal>) -> ContainerView {
    let quantity = container_quantity(container.items_weight, container_item_weight);
    ContainerView {
        container,
        quantity,
    }
}

/// Input for registering a container
#[derive(Debug, Deserialize)]
pub struct CreateContainerInput {
    pub item_id: String,
    pub storage_section_id: String,
    pub rfid_tag_id: String,
    pub items_weight: Decimal,
    pub user_name: Option<String>,
}

/// Input for updating a container
#[derive(Debug, Default, Deserialize)]
pub struct UpdateContainerInput {
    pub items_weight: Option<Decimal>,
    pub status: Option<UnitStatus>,
    pub storage_section_id: Option<String>,
    pub rfid_tag_id: Option<String>,
    pub user_name: Option<String>,
}

/// Filters for container listings
#[derive(Debug, Default, Deserialize)]
pub struct ContainerFilter {
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

const CONTAINER_COLUMNS: &str =
    "id, item_id, storage_section_id, rfid_tag_id, items_weight, status, created_at, updated_at";

/// Container unit service
#[derive(Clone)]
pub struct ContainerService {
    db: PgPool,
}

impl ContainerService {
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

        if item.item_type != ItemType::Container.as_str() {
            return Err(AppError::TypeMismatch {
                field: "item_id".to_string(),
                message: format!(
                    "Item '{}' is a {} item, expected container",
                    item_id, item.item_type
                ),
            });
        }
        Ok(item)
    }

    /// Per-item weight configured on the item's container stat row
    async fn item_weight(&self, item_id: &str) -> AppResult<Option<Decimal>> {
        let weight = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT container_item_weight FROM container_stats WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .flatten();
        Ok(weight)
    }

    /// Register a new container on a shelf.
    pub async fn create_container(
        &self,
        input: CreateContainerInput,
    ) -> AppResult<ContainerView> {
        let item = self.fetch_item(&input.item_id).await?;

        validate_weight(input.items_weight).map_err(|e| AppError::Validation {
            field: "items_weight".to_string(),
            message: e.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        reserve_units(&mut *tx, &input.storage_section_id, item.unit).await?;
        assign_tag(&mut *tx, &input.rfid_tag_id).await?;

        let container = sqlx::query_as::<_, Container>(&format!(
            r#"
            INSERT INTO containers
                (id, item_id, storage_section_id, rfid_tag_id, items_weight, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CONTAINER_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&item.id)
        .bind(&input.storage_section_id)
        .bind(&input.rfid_tag_id)
        .bind(input.items_weight)
        .bind(UnitStatus::Available.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let outcome = stats::recompute_container_stat(&mut *tx, &item.id).await?;

        transaction::record(
            &mut *tx,
            NewTransaction {
                transaction_type: TransactionType::Register,
                item_type: ItemType::Container,
                item_id: &item.id,
                item_name: &item.name,
                partition_id: None,
                large_item_id: None,
                container_id: Some(&container.id),
                storage_section_id: &container.storage_section_id,
                previous_quantity: None,
                current_quantity: None,
                previous_weight: Some(Decimal::ZERO),
                current_weight: Some(container.items_weight),
                user_name: input.user_name.as_deref(),
            },
        )
        .await?;

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, "Register Container")
            .await;

        let item_weight = self.item_weight(&item.id).await?;
        Ok(view(container, item_weight))
    }

    pub async fn get_container(&self, id: &str) -> AppResult<ContainerView> {
        let container = self.fetch_container(id).await?;
        let item_weight = self.item_weight(&container.item_id).await?;
        Ok(view(container, item_weight))
    }

    async fn fetch_container(&self, id: &str) -> AppResult<Container> {
        sqlx::query_as::<_, Container>(&format!(
            "SELECT {} FROM containers WHERE id = $1",
            CONTAINER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Container '{}'", id)))
    }

    pub async fn list_containers(
        &self,
        filter: &ContainerFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<ContainerView>> {
        let status = filter.status.map(|s| s.as_str().to_string());

        let conditions = r#"
            ($1::TEXT IS NULL OR item_id = $1)
            AND ($2::TEXT IS NULL OR storage_section_id = $2)
            AND ($3::TEXT IS NULL OR status = $3)
            AND ($4::TEXT IS NULL OR rfid_tag_id = $4)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM containers WHERE {}",
            conditions
        ))
        .bind(&filter.item_id)
        .bind(&filter.storage_section_id)
        .bind(&status)
        .bind(&filter.rfid_tag_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, Container>(&format!(
            "SELECT {} FROM containers WHERE {} ORDER BY created_at DESC LIMIT $5 OFFSET $6",
            CONTAINER_COLUMNS, conditions
        ))
        .bind(&filter.item_id)
        .bind(&filter.storage_section_id)
        .bind(&status)
        .bind(&filter.rfid_tag_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let mut weights: HashMap<String, Option<Decimal>> = HashMap::new();
        let mut views = Vec::with_capacity(rows.len());
        for container in rows {
            let item_weight = match weights.get(&container.item_id) {
                Some(weight) => *weight,
                None => {
                    let weight = self.item_weight(&container.item_id).await?;
                    weights.insert(container.item_id.clone(), weight);
                    weight
                }
            };
            views.push(view(container, item_weight));
        }

        Ok(PaginatedResponse {
            data: views,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Update a container: contents weight, status, shelf location or tag.
    pub async fn update_container(
        &self,
        id: &str,
        input: UpdateContainerInput,
    ) -> AppResult<ContainerView> {
        let current = self.fetch_container(id).await?;
        let item = self.fetch_item(&current.item_id).await?;

        let items_weight = match input.items_weight {
            Some(weight) => {
                validate_weight(weight).map_err(|e| AppError::Validation {
                    field: "items_weight".to_string(),
                    message: e.to_string(),
                })?;
                weight
            }
            None => current.items_weight,
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

        let container = sqlx::query_as::<_, Container>(&format!(
            r#"
            UPDATE containers
            SET items_weight = $1, status = $2, storage_section_id = $3, rfid_tag_id = $4,
                updated_at = now()
            WHERE id = $5
            RETURNING {}
            "#,
            CONTAINER_COLUMNS
        ))
        .bind(items_weight)
        .bind(&status)
        .bind(section_id)
        .bind(tag_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let outcome = stats::recompute_container_stat(&mut *tx, &item.id).await?;

        let change_source = if items_weight < current.items_weight {
            transaction::record(
                &mut *tx,
                NewTransaction {
                    transaction_type: TransactionType::Withdraw,
                    item_type: ItemType::Container,
                    item_id: &item.id,
                    item_name: &item.name,
                    partition_id: None,
                    large_item_id: None,
                    container_id: Some(&container.id),
                    storage_section_id: section_id,
                    previous_quantity: None,
                    current_quantity: None,
                    previous_weight: Some(current.items_weight),
                    current_weight: Some(items_weight),
                    user_name: input.user_name.as_deref(),
                },
            )
            .await?;
            "Withdraw Container"
        } else if items_weight > current.items_weight {
            transaction::record(
                &mut *tx,
                NewTransaction {
                    transaction_type: TransactionType::Return,
                    item_type: ItemType::Container,
                    item_id: &item.id,
                    item_name: &item.name,
                    partition_id: None,
                    large_item_id: None,
                    container_id: Some(&container.id),
                    storage_section_id: section_id,
                    previous_quantity: None,
                    current_quantity: None,
                    previous_weight: Some(current.items_weight),
                    current_weight: Some(items_weight),
                    user_name: input.user_name.as_deref(),
                },
            )
            .await?;
            "Return Container"
        } else {
            "Update Container"
        };

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, change_source)
            .await;

        let item_weight = self.item_weight(&item.id).await?;
        Ok(view(container, item_weight))
    }

    /// Consume a container: free its tag and shelf space and drop the row.
    pub async fn delete_container(&self, id: &str, user_name: Option<&str>) -> AppResult<()> {
        let current = self.fetch_container(id).await?;
        let item = self.fetch_item(&current.item_id).await?;

        let mut tx = self.db.begin().await?;

        release_tag(&mut *tx, &current.rfid_tag_id).await?;
        release_units(&mut *tx, &current.storage_section_id, item.unit).await?;

        sqlx::query("DELETE FROM containers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let outcome = stats::recompute_container_stat(&mut *tx, &item.id).await?;

        transaction::record(
            &mut *tx,
            NewTransaction {
                transaction_type: TransactionType::Consumed,
                item_type: ItemType::Container,
                item_id: &item.id,
                item_name: &item.name,
                partition_id: None,
                large_item_id: None,
                container_id: Some(&current.id),
                storage_section_id: &current.storage_section_id,
                previous_quantity: None,
                current_quantity: None,
                previous_weight: Some(current.items_weight),
                current_weight: Some(Decimal::ZERO),
                user_name,
            },
        )
        .await?;

        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, "Container Consumed")
            .await;

        Ok(())
    }

    /// Resolve a container by its RFID tag.
    pub async fn get_by_rfid_tag(&self, tag_id: &str) -> AppResult<ContainerView> {
        let container = sqlx::query_as::<_, Container>(&format!(
            "SELECT {} FROM containers WHERE rfid_tag_id = $1",
            CONTAINER_COLUMNS
        ))
        .bind(tag_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Container with RFID tag '{}'", tag_id)))?;

        let item_weight = self.item_weight(&container.item_id).await?;
        Ok(view(container, item_weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn container(items_weight: Decimal) -> Container {
        Container {
            id: "c-1".to_string(),
            item_id: "ITEM-1".to_string(),
            storage_section_id: "F1-C1-L1-R".to_string(),
            rfid_tag_id: "TAG-1".to_string(),
            items_weight,
            status: "available".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn view_derives_quantity_from_per_item_weight() {
        let v = view(container(dec("60")), Some(dec("2")));
        assert_eq!(v.quantity, Some(30));
    }

    #[test]
    fn view_quantity_absent_without_per_item_weight() {
        let v = view(container(dec("60")), None);
        assert_eq!(v.quantity, None);
    }

    #[test]
    fn view_serializes_quantity_alongside_row_fields() {
        let v = view(container(dec("10")), Some(dec("5")));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["items_weight"], "10");
    }
}
