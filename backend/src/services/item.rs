//! Item catalog service
//!
//! Creating an item initializes its type-matching stat row; threshold and
//! per-unit capacity/weight updates re-run the stat aggregator with change
//! source "Item Threshold Change". Deleting an item (or changing its type) is
//! blocked while any physical unit references it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

use shared::{
    container_quantity, determine_status, validate_percent_thresholds, validate_thresholds,
    ItemType, PaginatedResponse, Pagination, PaginationMeta,
};

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::external::image_storage;
use crate::services::history::HistoryService;
use crate::services::stats;

/// Item catalog service
#[derive(Clone)]
pub struct ItemService {
    db: PgPool,
    storage: StorageConfig,
}

/// An item catalog row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub item_type: String,
    pub measure_method: Option<String>,
    pub unit: i32,
    pub process: Option<String>,
    pub tooling: Option<String>,
    pub part_number: Option<String>,
    #[serde(skip)]
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item response with a resolved image URL
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: Item,
    pub image_url: Option<String>,
}

/// The aggregate stat row for an item; fields are type-appropriate
#[derive(Debug, Clone, Serialize)]
pub struct ItemStats {
    pub item_id: String,
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_item_weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_weight: Option<Decimal>,
    pub high_threshold: Decimal,
    pub low_threshold: Decimal,
    pub stock_status: Option<String>,
}

/// Item response with its stat row and unit counts
#[derive(Debug, Serialize)]
pub struct ItemWithStats {
    #[serde(flatten)]
    pub item: ItemResponse,
    pub stats: ItemStats,
    pub unit_count: i64,
}

/// Input for creating an item
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub item_type: ItemType,
    pub unit: Option<i32>,
    pub process: Option<String>,
    pub tooling: Option<String>,
    pub part_number: Option<String>,
    /// Base64-encoded image, optionally with a data-URL prefix
    pub image: Option<String>,
    pub partition_capacity: Option<i32>,
    pub container_item_weight: Option<Decimal>,
    pub container_weight: Option<Decimal>,
    pub high_threshold: Option<Decimal>,
    pub low_threshold: Option<Decimal>,
}

/// Input for updating an item. Metadata fields distinguish "absent" (keep the
/// current value) from an explicit `null` (clear it).
#[derive(Debug, Deserialize)]
pub struct UpdateItemInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub item_type: Option<ItemType>,
    pub unit: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub process: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tooling: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub part_number: Option<Option<String>>,
    /// Replacement image; `clear_image` removes the current one
    pub image: Option<String>,
    #[serde(default)]
    pub clear_image: bool,
    pub partition_capacity: Option<i32>,
    pub container_item_weight: Option<Decimal>,
    pub container_weight: Option<Decimal>,
    pub high_threshold: Option<Decimal>,
    pub low_threshold: Option<Decimal>,
}

/// Filters for item listings
#[derive(Debug, Default, Deserialize)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub item_type: Option<ItemType>,
    pub manufacturer: Option<String>,
}

const ITEM_COLUMNS: &str = "id, name, manufacturer, item_type, measure_method, unit, \
                            process, tooling, part_number, image_path, created_at, updated_at";

/// Maps a present-but-null JSON field to `Some(None)`; an absent field stays
/// `None` through `#[serde(default)]`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

fn validate_thresholds_for_type(
    item_type: ItemType,
    low: Option<Decimal>,
    high: Option<Decimal>,
) -> AppResult<(Decimal, Decimal)> {
    let (low, high) = match (low, high) {
        (Some(low), Some(high)) => (low, high),
        _ => {
            return Err(AppError::ThresholdInvalid {
                field: "high_threshold".to_string(),
                message: format!(
                    "high_threshold and low_threshold are required for {} items",
                    item_type.as_str()
                ),
            })
        }
    };

    let check = if item_type == ItemType::Partition {
        validate_percent_thresholds(Some(low), Some(high))
    } else {
        validate_thresholds(Some(low), Some(high))
    };
    check.map_err(|e| AppError::ThresholdInvalid {
        field: "high_threshold".to_string(),
        message: e.to_string(),
    })?;

    Ok((low, high))
}

impl ItemService {
    pub fn new(db: PgPool, storage: StorageConfig) -> Self {
        Self { db, storage }
    }

    fn to_response(&self, item: Item) -> ItemResponse {
        let image_url = item
            .image_path
            .as_ref()
            .map(|path| image_storage::image_url(&self.storage.images_base_url, path));
        ItemResponse { item, image_url }
    }

    /// Create an item and initialize its stat row
    pub async fn create_item(&self, input: CreateItemInput) -> AppResult<ItemResponse> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
                .bind(&input.id)
                .fetch_one(&self.db)
                .await?;
        if exists {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: format!("Item '{}' already exists", input.id),
            });
        }

        let (low, high) = validate_thresholds_for_type(
            input.item_type,
            input.low_threshold,
            input.high_threshold,
        )?;

        let partition_capacity = if input.item_type == ItemType::Partition {
            match input.partition_capacity {
                Some(capacity) if capacity > 0 => Some(capacity),
                _ => {
                    return Err(AppError::Validation {
                        field: "partition_capacity".to_string(),
                        message: "partition_capacity must be a positive integer".to_string(),
                    })
                }
            }
        } else {
            None
        };

        let image_path = match &input.image {
            Some(data) => Some(
                image_storage::save_image_from_base64(&self.storage.images_dir, &input.id, data)
                    .await?,
            ),
            None => None,
        };

        let unit = input.unit.unwrap_or(1).max(1);
        let measure_method = input.item_type.measure_method();

        let mut tx = self.db.begin().await?;

        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (id, name, manufacturer, item_type, measure_method, unit,
                               process, tooling, part_number, image_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&input.id)
        .bind(&input.name)
        .bind(&input.manufacturer)
        .bind(input.item_type.as_str())
        .bind(measure_method.map(|m| m.as_str()))
        .bind(unit)
        .bind(&input.process)
        .bind(&input.tooling)
        .bind(&input.part_number)
        .bind(&image_path)
        .fetch_one(&mut *tx)
        .await?;

        match input.item_type {
            ItemType::Partition => {
                let status = determine_status(Decimal::ZERO, Some(low), Some(high));
                sqlx::query(
                    r#"
                    INSERT INTO partition_stats
                        (item_id, total_quantity, total_capacity, partition_capacity,
                         high_threshold, low_threshold, stock_status)
                    VALUES ($1, 0, 0, $2, $3, $4, $5)
                    "#,
                )
                .bind(&input.id)
                .bind(partition_capacity.unwrap_or(1))
                .bind(high)
                .bind(low)
                .bind(status.map(|s| s.as_str()))
                .execute(&mut *tx)
                .await?;
            }
            ItemType::LargeItem => {
                let status = determine_status(Decimal::ZERO, Some(low), Some(high));
                sqlx::query(
                    r#"
                    INSERT INTO large_item_stats
                        (item_id, total_quantity, high_threshold, low_threshold, stock_status)
                    VALUES ($1, 0, $2, $3, $4)
                    "#,
                )
                .bind(&input.id)
                .bind(high)
                .bind(low)
                .bind(status.map(|s| s.as_str()))
                .execute(&mut *tx)
                .await?;
            }
            ItemType::Container => {
                let quantity = container_quantity(Decimal::ZERO, input.container_item_weight);
                let status = determine_status(Decimal::ZERO, Some(low), Some(high));
                sqlx::query(
                    r#"
                    INSERT INTO container_stats
                        (item_id, total_weight, total_quantity, container_item_weight,
                         container_weight, high_threshold, low_threshold, stock_status)
                    VALUES ($1, 0, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(&input.id)
                .bind(quantity)
                .bind(input.container_item_weight)
                .bind(input.container_weight)
                .bind(high)
                .bind(low)
                .bind(status.map(|s| s.as_str()))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(self.to_response(item))
    }

    pub async fn get_item(&self, item_id: &str) -> AppResult<ItemResponse> {
        let item = self.fetch_item(item_id).await?;
        Ok(self.to_response(item))
    }

    async fn fetch_item(&self, item_id: &str) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item '{}'", item_id)))
    }

    /// Number of physical units referencing an item across all three tables
    async fn unit_count(&self, item_id: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM partitions WHERE item_id = $1)
                 + (SELECT COUNT(*) FROM large_items WHERE item_id = $1)
                 + (SELECT COUNT(*) FROM containers WHERE item_id = $1)
            "#,
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    pub async fn list_items(
        &self,
        filter: &ItemFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<ItemResponse>> {
        let search = filter.search.as_ref().map(|s| format!("%{}%", s));
        let item_type = filter.item_type.map(|t| t.as_str().to_string());
        let manufacturer = filter.manufacturer.as_ref().map(|m| format!("%{}%", m));

        let conditions = r#"
            ($1::TEXT IS NULL OR id ILIKE $1 OR name ILIKE $1 OR manufacturer ILIKE $1)
            AND ($2::TEXT IS NULL OR item_type = $2)
            AND ($3::TEXT IS NULL OR manufacturer ILIKE $3)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM items WHERE {}",
            conditions
        ))
        .bind(&search)
        .bind(&item_type)
        .bind(&manufacturer)
        .fetch_one(&self.db)
        .await?;

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE {} ORDER BY id LIMIT $4 OFFSET $5",
            ITEM_COLUMNS, conditions
        ))
        .bind(&search)
        .bind(&item_type)
        .bind(&manufacturer)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: items.into_iter().map(|i| self.to_response(i)).collect(),
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Fetch the stat row matching the item's type
    pub async fn get_stats(&self, item_id: &str) -> AppResult<ItemStats> {
        let item = self.fetch_item(item_id).await?;
        let item_type = ItemType::from_str(&item.item_type)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

        let stats = match item_type {
            ItemType::Partition => {
                let row = sqlx::query_as::<_, (i64, i64, i32, Decimal, Decimal, Option<String>)>(
                    r#"
                    SELECT total_quantity, total_capacity, partition_capacity,
                           high_threshold, low_threshold, stock_status
                    FROM partition_stats WHERE item_id = $1
                    "#,
                )
                .bind(item_id)
                .fetch_one(&self.db)
                .await?;
                ItemStats {
                    item_id: item.id.clone(),
                    item_type: item.item_type.clone(),
                    total_quantity: Some(row.0),
                    total_capacity: Some(row.1),
                    partition_capacity: Some(row.2),
                    total_weight: None,
                    container_item_weight: None,
                    container_weight: None,
                    high_threshold: row.3,
                    low_threshold: row.4,
                    stock_status: row.5,
                }
            }
            ItemType::LargeItem => {
                let row = sqlx::query_as::<_, (i64, Decimal, Decimal, Option<String>)>(
                    r#"
                    SELECT total_quantity, high_threshold, low_threshold, stock_status
                    FROM large_item_stats WHERE item_id = $1
                    "#,
                )
                .bind(item_id)
                .fetch_one(&self.db)
                .await?;
                ItemStats {
                    item_id: item.id.clone(),
                    item_type: item.item_type.clone(),
                    total_quantity: Some(row.0),
                    total_capacity: None,
                    partition_capacity: None,
                    total_weight: None,
                    container_item_weight: None,
                    container_weight: None,
                    high_threshold: row.1,
                    low_threshold: row.2,
                    stock_status: row.3,
                }
            }
            ItemType::Container => {
                let row = sqlx::query_as::<
                    _,
                    (
                        Decimal,
                        Option<i64>,
                        Option<Decimal>,
                        Option<Decimal>,
                        Decimal,
                        Decimal,
                        Option<String>,
                    ),
                >(
                    r#"
                    SELECT total_weight, total_quantity, container_item_weight,
                           container_weight, high_threshold, low_threshold, stock_status
                    FROM container_stats WHERE item_id = $1
                    "#,
                )
                .bind(item_id)
                .fetch_one(&self.db)
                .await?;
                ItemStats {
                    item_id: item.id.clone(),
                    item_type: item.item_type.clone(),
                    total_quantity: row.1,
                    total_capacity: None,
                    partition_capacity: None,
                    total_weight: Some(row.0),
                    container_item_weight: row.2,
                    container_weight: row.3,
                    high_threshold: row.4,
                    low_threshold: row.5,
                    stock_status: row.6,
                }
            }
        };

        Ok(stats)
    }

    pub async fn get_item_with_stats(&self, item_id: &str) -> AppResult<ItemWithStats> {
        let item = self.get_item(item_id).await?;
        let stats = self.get_stats(item_id).await?;
        let unit_count = self.unit_count(item_id).await?;
        Ok(ItemWithStats {
            item,
            stats,
            unit_count,
        })
    }

    /// Update an item; threshold and per-unit configuration changes trigger a
    /// stat recomputation with change source "Item Threshold Change".
    pub async fn update_item(
        &self,
        item_id: &str,
        input: UpdateItemInput,
    ) -> AppResult<ItemResponse> {
        let current = self.fetch_item(item_id).await?;
        let current_type = ItemType::from_str(&current.item_type)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        let units = self.unit_count(item_id).await?;

        // Type change swaps the type-specific stat row, so it is blocked
        // while any unit still references the item
        let new_type = input.item_type.unwrap_or(current_type);
        let type_changed = new_type != current_type;
        if type_changed && units > 0 {
            return Err(AppError::ReferentialBlock(format!(
                "Cannot change type of item '{}' while {} units reference it",
                item_id, units
            )));
        }

        let new_id = match &input.id {
            Some(new_id) if new_id != item_id => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)",
                )
                .bind(new_id)
                .fetch_one(&self.db)
                .await?;
                if exists {
                    return Err(AppError::Validation {
                        field: "id".to_string(),
                        message: format!("Item '{}' already exists", new_id),
                    });
                }
                new_id.clone()
            }
            _ => item_id.to_string(),
        };

        // Image replacement happens outside the transaction; losing an
        // orphaned file is acceptable, losing the row update is not
        let mut image_path = current.image_path.clone();
        if input.clear_image || input.image.is_some() {
            if let Some(old_path) = &current.image_path {
                image_storage::delete_image(&self.storage.images_dir, old_path).await;
            }
            image_path = None;
        }
        if let Some(data) = &input.image {
            image_path = Some(
                image_storage::save_image_from_base64(&self.storage.images_dir, &new_id, data)
                    .await?,
            );
        }

        // An explicit null clears a metadata field; an absent one keeps it
        let process = input.process.clone().unwrap_or_else(|| current.process.clone());
        let tooling = input.tooling.clone().unwrap_or_else(|| current.tooling.clone());
        let part_number = input
            .part_number
            .clone()
            .unwrap_or_else(|| current.part_number.clone());

        let mut tx = self.db.begin().await?;

        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET id = $1, name = $2, manufacturer = $3, item_type = $4, measure_method = $5,
                unit = $6, process = $7, tooling = $8, part_number = $9, image_path = $10,
                updated_at = now()
            WHERE id = $11
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&new_id)
        .bind(input.name.as_ref().unwrap_or(&current.name))
        .bind(input.manufacturer.as_ref().unwrap_or(&current.manufacturer))
        .bind(new_type.as_str())
        .bind(new_type.measure_method().map(|m| m.as_str()))
        .bind(input.unit.unwrap_or(current.unit))
        .bind(&process)
        .bind(&tooling)
        .bind(&part_number)
        .bind(&image_path)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        if type_changed {
            // Swap the stat row; the new type needs a full threshold pair
            let (low, high) = validate_thresholds_for_type(
                new_type,
                input.low_threshold,
                input.high_threshold,
            )?;
            sqlx::query("DELETE FROM partition_stats WHERE item_id = $1")
                .bind(&new_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM large_item_stats WHERE item_id = $1")
                .bind(&new_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM container_stats WHERE item_id = $1")
                .bind(&new_id)
                .execute(&mut *tx)
                .await?;

            let status = determine_status(Decimal::ZERO, Some(low), Some(high));
            match new_type {
                ItemType::Partition => {
                    let capacity = match input.partition_capacity {
                        Some(capacity) if capacity > 0 => capacity,
                        _ => {
                            return Err(AppError::Validation {
                                field: "partition_capacity".to_string(),
                                message: "partition_capacity must be a positive integer"
                                    .to_string(),
                            })
                        }
                    };
                    sqlx::query(
                        r#"
                        INSERT INTO partition_stats
                            (item_id, total_quantity, total_capacity, partition_capacity,
                             high_threshold, low_threshold, stock_status)
                        VALUES ($1, 0, 0, $2, $3, $4, $5)
                        "#,
                    )
                    .bind(&new_id)
                    .bind(capacity)
                    .bind(high)
                    .bind(low)
                    .bind(status.map(|s| s.as_str()))
                    .execute(&mut *tx)
                    .await?;
                }
                ItemType::LargeItem => {
                    sqlx::query(
                        r#"
                        INSERT INTO large_item_stats
                            (item_id, total_quantity, high_threshold, low_threshold, stock_status)
                        VALUES ($1, 0, $2, $3, $4)
                        "#,
                    )
                    .bind(&new_id)
                    .bind(high)
                    .bind(low)
                    .bind(status.map(|s| s.as_str()))
                    .execute(&mut *tx)
                    .await?;
                }
                ItemType::Container => {
                    sqlx::query(
                        r#"
                        INSERT INTO container_stats
                            (item_id, total_weight, total_quantity, container_item_weight,
                             container_weight, high_threshold, low_threshold, stock_status)
                        VALUES ($1, 0, $2, $3, $4, $5, $6, $7)
                        "#,
                    )
                    .bind(&new_id)
                    .bind(container_quantity(Decimal::ZERO, input.container_item_weight))
                    .bind(input.container_item_weight)
                    .bind(input.container_weight)
                    .bind(high)
                    .bind(low)
                    .bind(status.map(|s| s.as_str()))
                    .execute(&mut *tx)
                    .await?;
                }
            }

            tx.commit().await?;
            return Ok(self.to_response(item));
        }

        // Same-type stat configuration changes
        let stat_config_changed = match new_type {
            ItemType::Partition => {
                input.partition_capacity.is_some()
                    || input.high_threshold.is_some()
                    || input.low_threshold.is_some()
            }
            ItemType::LargeItem => {
                input.high_threshold.is_some() || input.low_threshold.is_some()
            }
            ItemType::Container => {
                input.container_item_weight.is_some()
                    || input.container_weight.is_some()
                    || input.high_threshold.is_some()
                    || input.low_threshold.is_some()
            }
        };

        if !stat_config_changed {
            tx.commit().await?;
            return Ok(self.to_response(item));
        }

        // Merge with current thresholds before validating the pair
        let (current_low, current_high) = sqlx::query_as::<_, (Decimal, Decimal)>(&format!(
            "SELECT low_threshold, high_threshold FROM {} WHERE item_id = $1 FOR UPDATE",
            stat_table(new_type)
        ))
        .bind(&new_id)
        .fetch_one(&mut *tx)
        .await?;

        let low = input.low_threshold.unwrap_or(current_low);
        let high = input.high_threshold.unwrap_or(current_high);
        validate_thresholds_for_type(new_type, Some(low), Some(high))?;

        match new_type {
            ItemType::Partition => {
                if let Some(capacity) = input.partition_capacity {
                    if capacity <= 0 {
                        return Err(AppError::Validation {
                            field: "partition_capacity".to_string(),
                            message: "partition_capacity must be a positive integer".to_string(),
                        });
                    }
                }
                sqlx::query(
                    r#"
                    UPDATE partition_stats
                    SET partition_capacity = COALESCE($1, partition_capacity),
                        high_threshold = $2, low_threshold = $3, updated_at = now()
                    WHERE item_id = $4
                    "#,
                )
                .bind(input.partition_capacity)
                .bind(high)
                .bind(low)
                .bind(&new_id)
                .execute(&mut *tx)
                .await?;
            }
            ItemType::LargeItem => {
                sqlx::query(
                    r#"
                    UPDATE large_item_stats
                    SET high_threshold = $1, low_threshold = $2, updated_at = now()
                    WHERE item_id = $3
                    "#,
                )
                .bind(high)
                .bind(low)
                .bind(&new_id)
                .execute(&mut *tx)
                .await?;
            }
            ItemType::Container => {
                sqlx::query(
                    r#"
                    UPDATE container_stats
                    SET container_item_weight = COALESCE($1, container_item_weight),
                        container_weight = COALESCE($2, container_weight),
                        high_threshold = $3, low_threshold = $4, updated_at = now()
                    WHERE item_id = $5
                    "#,
                )
                .bind(input.container_item_weight)
                .bind(input.container_weight)
                .bind(high)
                .bind(low)
                .bind(&new_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let outcome = stats::recompute_stat(&mut *tx, &new_id, new_type).await?;
        tx.commit().await?;

        HistoryService::new(self.db.clone())
            .record_if_changed(&outcome, "Item Threshold Change")
            .await;

        Ok(self.to_response(item))
    }

    /// Delete an item. Blocked while any unit references it; the stat row and
    /// history cascade with the item.
    pub async fn delete_item(&self, item_id: &str) -> AppResult<()> {
        let item = self.fetch_item(item_id).await?;

        let units = self.unit_count(item_id).await?;
        if units > 0 {
            return Err(AppError::ReferentialBlock(format!(
                "Cannot delete item '{}' while {} units reference it",
                item_id, units
            )));
        }

        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if let Some(path) = &item.image_path {
            image_storage::delete_image(&self.storage.images_dir, path).await;
        }

        Ok(())
    }
}

fn stat_table(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Partition => "partition_stats",
        ItemType::LargeItem => "large_item_stats",
        ItemType::Container => "container_stats",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_metadata_field_keeps_current_value() {
        let input: UpdateItemInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.process, None);
        assert_eq!(input.tooling, None);
        assert_eq!(input.part_number, None);
    }

    #[test]
    fn null_metadata_field_clears_it() {
        let input: UpdateItemInput =
            serde_json::from_str(r#"{"process": null, "part_number": null}"#).unwrap();
        assert_eq!(input.process, Some(None));
        assert_eq!(input.part_number, Some(None));
        assert_eq!(input.tooling, None);
    }

    #[test]
    fn present_metadata_field_sets_the_value() {
        let input: UpdateItemInput =
            serde_json::from_str(r#"{"tooling": "jig-4"}"#).unwrap();
        assert_eq!(input.tooling, Some(Some("jig-4".to_string())));
    }
}
