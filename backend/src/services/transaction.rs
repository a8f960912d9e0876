//! Transaction journal: one row per physical stock movement
//!
//! Recording runs on the caller's transaction so a journal entry commits
//! together with the unit mutation it describes. Change columns are derived
//! from the previous/current pair at insert time.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use shared::{
    ItemType, PaginatedResponse, Pagination, PaginationMeta, TransactionType,
};

use crate::error::{AppError, AppResult};

/// A recorded stock movement
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Transaction {
    pub id: String,
    pub transaction_type: String,
    pub transaction_date: DateTime<Utc>,
    pub item_type: String,
    pub item_id: String,
    pub item_name: String,
    pub partition_id: Option<String>,
    pub large_item_id: Option<String>,
    pub container_id: Option<String>,
    pub storage_section_id: String,
    pub previous_quantity: Option<i32>,
    pub current_quantity: Option<i32>,
    pub change_quantity: Option<i32>,
    pub previous_weight: Option<Decimal>,
    pub current_weight: Option<Decimal>,
    pub change_weight: Option<Decimal>,
    pub user_name: Option<String>,
}

/// A stock movement to be journaled
#[derive(Debug)]
pub struct NewTransaction<'a> {
    pub transaction_type: TransactionType,
    pub item_type: ItemType,
    pub item_id: &'a str,
    pub item_name: &'a str,
    pub partition_id: Option<&'a str>,
    pub large_item_id: Option<&'a str>,
    pub container_id: Option<&'a str>,
    pub storage_section_id: &'a str,
    pub previous_quantity: Option<i32>,
    pub current_quantity: Option<i32>,
    pub previous_weight: Option<Decimal>,
    pub current_weight: Option<Decimal>,
    pub user_name: Option<&'a str>,
}

/// Journal a stock movement on the caller's transaction.
pub async fn record(conn: &mut PgConnection, entry: NewTransaction<'_>) -> AppResult<()> {
    let change_quantity = match (entry.previous_quantity, entry.current_quantity) {
        (Some(prev), Some(cur)) => Some(cur - prev),
        _ => None,
    };
    let change_weight = match (entry.previous_weight, entry.current_weight) {
        (Some(prev), Some(cur)) => Some(cur - prev),
        _ => None,
    };

    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, transaction_type, transaction_date, item_type, item_id, item_name,
            partition_id, large_item_id, container_id, storage_section_id,
            previous_quantity, current_quantity, change_quantity,
            previous_weight, current_weight, change_weight, user_name
        )
        VALUES ($1, $2, now(), $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(entry.transaction_type.as_str())
    .bind(entry.item_type.as_str())
    .bind(entry.item_id)
    .bind(entry.item_name)
    .bind(entry.partition_id)
    .bind(entry.large_item_id)
    .bind(entry.container_id)
    .bind(entry.storage_section_id)
    .bind(entry.previous_quantity)
    .bind(entry.current_quantity)
    .bind(change_quantity)
    .bind(entry.previous_weight)
    .bind(entry.current_weight)
    .bind(change_weight)
    .bind(entry.user_name)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Filters for the transaction journal listing
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub item_type: Option<ItemType>,
    pub item_id: Option<String>,
    pub storage_section_id: Option<String>,
    /// Matches whichever of partition_id/large_item_id/container_id is set
    pub unit_id: Option<String>,
    pub user_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Movement summary over an optional date range
#[derive(Debug, Default, Serialize)]
pub struct TransactionStats {
    pub total: i64,
    pub withdraw_count: i64,
    pub return_count: i64,
    pub consumed_count: i64,
    pub register_count: i64,
    pub unique_items: i64,
    pub unique_users: i64,
    pub net_quantity_change: i64,
    pub net_weight_change: Decimal,
}

const TRANSACTION_COLUMNS: &str = "id, transaction_type, transaction_date, item_type, item_id, \
     item_name, partition_id, large_item_id, container_id, storage_section_id, \
     previous_quantity, current_quantity, change_quantity, \
     previous_weight, current_weight, change_weight, user_name";

/// Transaction journal query service
#[derive(Clone)]
pub struct TransactionService {
    db: PgPool,
}

impl TransactionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_transaction(&self, id: &str) -> AppResult<Transaction> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {} FROM transactions WHERE id = $1",
            TRANSACTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transaction '{}'", id)))
    }

    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Transaction>> {
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if end < start {
                return Err(AppError::ValidationRange {
                    field: "end_date".to_string(),
                    message: "end date must not be before start date".to_string(),
                });
            }
        }

        let transaction_type = filter.transaction_type.map(|t| t.as_str().to_string());
        let item_type = filter.item_type.map(|t| t.as_str().to_string());
        let user_name = filter.user_name.as_ref().map(|u| format!("%{}%", u));

        let conditions = r#"
            ($1::TEXT IS NULL OR transaction_type = $1)
            AND ($2::TEXT IS NULL OR item_type = $2)
            AND ($3::TEXT IS NULL OR item_id = $3)
            AND ($4::TEXT IS NULL OR storage_section_id = $4)
            AND ($5::TEXT IS NULL OR user_name ILIKE $5)
            AND ($6::TEXT IS NULL OR partition_id = $6 OR large_item_id = $6 OR container_id = $6)
            AND ($7::DATE IS NULL OR transaction_date >= $7::DATE)
            AND ($8::DATE IS NULL OR transaction_date < $8::DATE + INTERVAL '1 day')
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM transactions WHERE {}",
            conditions
        ))
        .bind(&transaction_type)
        .bind(&item_type)
        .bind(&filter.item_id)
        .bind(&filter.storage_section_id)
        .bind(&user_name)
        .bind(&filter.unit_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {} FROM transactions WHERE {} \
             ORDER BY transaction_date DESC LIMIT $9 OFFSET $10",
            TRANSACTION_COLUMNS, conditions
        ))
        .bind(&transaction_type)
        .bind(&item_type)
        .bind(&filter.item_id)
        .bind(&filter.storage_section_id)
        .bind(&user_name)
        .bind(&filter.unit_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: rows,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Most recent movements, newest first
    pub async fn recent_transactions(&self, limit: i64) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {} FROM transactions ORDER BY transaction_date DESC LIMIT $1",
            TRANSACTION_COLUMNS
        ))
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Movement summary over an optional date range: counts per type,
    /// distinct items/users touched, and net quantity/weight change
    pub async fn transaction_stats(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<TransactionStats> {
        let range_condition = r#"
            ($1::DATE IS NULL OR transaction_date >= $1::DATE)
            AND ($2::DATE IS NULL OR transaction_date < $2::DATE + INTERVAL '1 day')
        "#;

        let rows = sqlx::query_as::<_, (String, i64)>(&format!(
            "SELECT transaction_type, COUNT(*) FROM transactions WHERE {} \
             GROUP BY transaction_type",
            range_condition
        ))
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.db)
        .await?;

        let mut stats = TransactionStats::default();
        for (transaction_type, count) in rows {
            stats.total += count;
            match transaction_type.as_str() {
                "withdraw" => stats.withdraw_count = count,
                "return" => stats.return_count = count,
                "consumed" => stats.consumed_count = count,
                "register" => stats.register_count = count,
                _ => {}
            }
        }

        let (unique_items, unique_users, net_quantity, net_weight) =
            sqlx::query_as::<_, (i64, i64, Option<i64>, Option<Decimal>)>(&format!(
                r#"
                SELECT COUNT(DISTINCT item_id),
                       COUNT(DISTINCT user_name),
                       SUM(change_quantity)::BIGINT,
                       SUM(change_weight)
                FROM transactions WHERE {}
                "#,
                range_condition
            ))
            .bind(start_date)
            .bind(end_date)
            .fetch_one(&self.db)
            .await?;

        stats.unique_items = unique_items;
        stats.unique_users = unique_users;
        stats.net_quantity_change = net_quantity.unwrap_or(0);
        stats.net_weight_change = net_weight.unwrap_or(Decimal::ZERO);

        Ok(stats)
    }
}
