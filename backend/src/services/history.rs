//! History recorder and dashboard aggregation queries
//!
//! Snapshots are written after the primary stat mutation has committed, in a
//! separate transaction. Losing a history row is acceptable; losing the stat
//! update is not, so recording failures are logged and never propagated.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

use shared::{
    aggregate_item_series, aggregate_status_counts, period_boundaries, Granularity,
    HistorySnapshot, ItemPeriodStatus, PaginatedResponse, Pagination, PaginationMeta,
    PeriodStatusCounts, StockStatus,
};

use crate::error::{AppError, AppResult};
use crate::services::stats::StatRecompute;

/// History recorder and aggregation query engine
#[derive(Clone)]
pub struct HistoryService {
    db: PgPool,
}

/// A stored stat history snapshot
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ItemStatHistory {
    pub id: String,
    pub item_type: String,
    pub item_id: String,
    pub item_name: String,
    pub total_quantity: Option<i64>,
    pub total_capacity: Option<i64>,
    pub total_weight: Option<Decimal>,
    pub stock_status: Option<String>,
    pub change_source: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SnapshotRow {
    item_id: String,
    recorded_at: DateTime<Utc>,
    stock_status: Option<String>,
    total_quantity: Option<i64>,
    total_capacity: Option<i64>,
    total_weight: Option<Decimal>,
}

impl From<SnapshotRow> for HistorySnapshot {
    fn from(row: SnapshotRow) -> Self {
        HistorySnapshot {
            item_id: row.item_id,
            recorded_at: row.recorded_at,
            stock_status: row
                .stock_status
                .as_deref()
                .and_then(|s| StockStatus::from_str(s).ok()),
            total_quantity: row.total_quantity,
            total_capacity: row.total_capacity,
            total_weight: row.total_weight,
        }
    }
}

impl HistoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a snapshot if the recomputation changed a monitored field.
    ///
    /// Best-effort: called after the primary mutation has committed, so any
    /// failure here is logged and swallowed.
    pub async fn record_if_changed(&self, outcome: &StatRecompute, change_source: &str) {
        if !outcome.needs_history() {
            return;
        }

        if let Err(e) = self.insert_snapshot(outcome, change_source).await {
            tracing::error!(
                item_id = %outcome.snapshot.item_id,
                change_source,
                "failed to record stat history snapshot: {}",
                e
            );
        }
    }

    async fn insert_snapshot(
        &self,
        outcome: &StatRecompute,
        change_source: &str,
    ) -> AppResult<()> {
        let snapshot = &outcome.snapshot;
        let mut tx = self.db.begin().await?;

        // Per-type monotonically increasing counter for human-readable ids
        let seq = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM item_stat_history WHERE item_type = $1",
        )
        .bind(snapshot.item_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let id = format!("{}{}", snapshot.item_type.history_prefix(), seq);

        sqlx::query(
            r#"
            INSERT INTO item_stat_history (
                id, seq, item_type, item_id, item_name,
                total_quantity, total_capacity, total_weight, stock_status,
                change_source, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            "#,
        )
        .bind(&id)
        .bind(seq)
        .bind(snapshot.item_type.as_str())
        .bind(&snapshot.item_id)
        .bind(&snapshot.item_name)
        .bind(snapshot.total_quantity)
        .bind(snapshot.total_capacity)
        .bind(snapshot.total_weight)
        .bind(snapshot.stock_status.map(|s| s.as_str()))
        .bind(change_source)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Fleet-wide replay: item counts per stock status at each period boundary
    /// between `start` and `end` inclusive. Last-known status carries forward;
    /// all three buckets are always present.
    pub async fn aggregate_item_status_history(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> AppResult<Vec<PeriodStatusCounts>> {
        let periods = period_boundaries(start, end, granularity).map_err(|e| {
            AppError::ValidationRange {
                field: "end_date".to_string(),
                message: e.to_string(),
            }
        })?;

        let snapshots = self.snapshots_until(periods.last().map(|p| p.cutoff()), None).await?;
        Ok(aggregate_status_counts(&snapshots, &periods))
    }

    /// Per-item replay: last-known snapshot values at each period boundary.
    /// Periods before the item's first snapshot are omitted.
    pub async fn aggregate_item_history_for_item(
        &self,
        item_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> AppResult<Vec<ItemPeriodStatus>> {
        let periods = period_boundaries(start, end, granularity).map_err(|e| {
            AppError::ValidationRange {
                field: "end_date".to_string(),
                message: e.to_string(),
            }
        })?;

        let item_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
                .bind(item_id)
                .fetch_one(&self.db)
                .await?;
        if !item_exists {
            return Err(AppError::NotFound(format!("Item '{}'", item_id)));
        }

        let snapshots = self
            .snapshots_until(periods.last().map(|p| p.cutoff()), Some(item_id))
            .await?;
        Ok(aggregate_item_series(&snapshots, &periods))
    }

    /// All snapshots up to a cutoff, oldest first, optionally for one item.
    /// Snapshots from before the requested range are needed for carry-forward.
    async fn snapshots_until(
        &self,
        cutoff: Option<DateTime<Utc>>,
        item_id: Option<&str>,
    ) -> AppResult<Vec<HistorySnapshot>> {
        let cutoff = match cutoff {
            Some(cutoff) => cutoff,
            None => return Ok(Vec::new()),
        };

        let rows = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT item_id, recorded_at, stock_status,
                   total_quantity, total_capacity, total_weight
            FROM item_stat_history
            WHERE recorded_at <= $1
              AND ($2::TEXT IS NULL OR item_id = $2)
            ORDER BY recorded_at ASC, seq ASC
            "#,
        )
        .bind(cutoff)
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(HistorySnapshot::from).collect())
    }

    /// Raw history rows for an item, newest first
    pub async fn list_for_item(
        &self,
        item_id: &str,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<ItemStatHistory>> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM item_stat_history WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ItemStatHistory>(
            r#"
            SELECT id, item_type, item_id, item_name,
                   total_quantity, total_capacity, total_weight, stock_status,
                   change_source, recorded_at
            FROM item_stat_history
            WHERE item_id = $1
            ORDER BY recorded_at DESC, seq DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(item_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: rows,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }
}
