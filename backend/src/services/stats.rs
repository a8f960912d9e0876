//! Stat aggregator: recomputes per-item aggregate stat rows from child units
//!
//! Every recompute runs on the caller's transaction and locks the stat row
//! with `SELECT ... FOR UPDATE` so concurrent unit mutations of the same item
//! cannot lose updates. Only fields that actually changed are written, and the
//! change set is reported back so the history recorder can decide whether a
//! snapshot is due. Recomputation is a pure function of current child-row
//! state, so calling it twice in a row changes nothing the second time.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use std::str::FromStr;

use shared::{
    compute_partition_totals, container_quantity, determine_status, ChangeSet, ItemType,
    StockStatus, CONTAINER_MONITORED_FIELDS, LARGE_ITEM_MONITORED_FIELDS,
    PARTITION_MONITORED_FIELDS,
};

use crate::error::AppResult;

/// Values of a stat row as of one recomputation, used for history snapshots
#[derive(Debug, Clone)]
pub struct StatSnapshot {
    pub item_id: String,
    pub item_name: String,
    pub item_type: ItemType,
    pub total_quantity: Option<i64>,
    pub total_capacity: Option<i64>,
    pub total_weight: Option<Decimal>,
    pub stock_status: Option<StockStatus>,
}

/// Outcome of a stat recomputation
#[derive(Debug, Clone)]
pub struct StatRecompute {
    pub snapshot: StatSnapshot,
    pub changes: ChangeSet,
}

impl StatRecompute {
    /// Whether the change set touches the monitored field set for the type
    pub fn needs_history(&self) -> bool {
        let monitored = match self.snapshot.item_type {
            ItemType::Partition => PARTITION_MONITORED_FIELDS,
            ItemType::LargeItem => LARGE_ITEM_MONITORED_FIELDS,
            ItemType::Container => CONTAINER_MONITORED_FIELDS,
        };
        self.changes.touches(monitored)
    }
}

#[derive(Debug, FromRow)]
struct PartitionStatRow {
    total_quantity: i64,
    total_capacity: i64,
    partition_capacity: i32,
    high_threshold: Decimal,
    low_threshold: Decimal,
    stock_status: Option<String>,
    item_name: String,
}

#[derive(Debug, FromRow)]
struct LargeItemStatRow {
    total_quantity: i64,
    high_threshold: Decimal,
    low_threshold: Decimal,
    stock_status: Option<String>,
    item_name: String,
}

#[derive(Debug, FromRow)]
struct ContainerStatRow {
    total_weight: Decimal,
    total_quantity: Option<i64>,
    container_item_weight: Option<Decimal>,
    high_threshold: Decimal,
    low_threshold: Decimal,
    stock_status: Option<String>,
    item_name: String,
}

fn parse_status(status: &Option<String>) -> Option<StockStatus> {
    status.as_deref().and_then(|s| StockStatus::from_str(s).ok())
}

/// Recompute the partition stat row for an item from its partitions.
pub async fn recompute_partition_stat(
    conn: &mut PgConnection,
    item_id: &str,
) -> AppResult<StatRecompute> {
    let stat = sqlx::query_as::<_, PartitionStatRow>(
        r#"
        SELECT ps.total_quantity, ps.total_capacity, ps.partition_capacity,
               ps.high_threshold, ps.low_threshold, ps.stock_status,
               i.name AS item_name
        FROM partition_stats ps
        JOIN items i ON i.id = ps.item_id
        WHERE ps.item_id = $1
        FOR UPDATE OF ps
        "#,
    )
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    let (quantity_sum, partition_count) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COALESCE(SUM(quantity), 0)::BIGINT, COUNT(*) FROM partitions WHERE item_id = $1",
    )
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    let totals = compute_partition_totals(
        quantity_sum,
        partition_count,
        stat.partition_capacity as i64,
    );
    let status = determine_status(
        totals.percent(),
        Some(stat.low_threshold),
        Some(stat.high_threshold),
    );

    let mut changes = ChangeSet::new();
    changes.compare("total_quantity", &stat.total_quantity, &totals.total_quantity);
    changes.compare("total_capacity", &stat.total_capacity, &totals.total_capacity);
    changes.compare("stock_status", &parse_status(&stat.stock_status), &status);

    if !changes.is_empty() {
        sqlx::query(
            r#"
            UPDATE partition_stats
            SET total_quantity = $1, total_capacity = $2, stock_status = $3, updated_at = now()
            WHERE item_id = $4
            "#,
        )
        .bind(totals.total_quantity)
        .bind(totals.total_capacity)
        .bind(status.map(|s| s.as_str()))
        .bind(item_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(StatRecompute {
        snapshot: StatSnapshot {
            item_id: item_id.to_string(),
            item_name: stat.item_name,
            item_type: ItemType::Partition,
            total_quantity: Some(totals.total_quantity),
            total_capacity: Some(totals.total_capacity),
            total_weight: None,
            stock_status: status,
        },
        changes,
    })
}

/// Recompute the large item stat row for an item from its large items.
pub async fn recompute_large_item_stat(
    conn: &mut PgConnection,
    item_id: &str,
) -> AppResult<StatRecompute> {
    let stat = sqlx::query_as::<_, LargeItemStatRow>(
        r#"
        SELECT ls.total_quantity, ls.high_threshold, ls.low_threshold, ls.stock_status,
               i.name AS item_name
        FROM large_item_stats ls
        JOIN items i ON i.id = ls.item_id
        WHERE ls.item_id = $1
        FOR UPDATE OF ls
        "#,
    )
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    let total_quantity = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM large_items WHERE item_id = $1",
    )
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    let status = determine_status(
        Decimal::from(total_quantity),
        Some(stat.low_threshold),
        Some(stat.high_threshold),
    );

    let mut changes = ChangeSet::new();
    changes.compare("total_quantity", &stat.total_quantity, &total_quantity);
    changes.compare("stock_status", &parse_status(&stat.stock_status), &status);

    if !changes.is_empty() {
        sqlx::query(
            r#"
            UPDATE large_item_stats
            SET total_quantity = $1, stock_status = $2, updated_at = now()
            WHERE item_id = $3
            "#,
        )
        .bind(total_quantity)
        .bind(status.map(|s| s.as_str()))
        .bind(item_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(StatRecompute {
        snapshot: StatSnapshot {
            item_id: item_id.to_string(),
            item_name: stat.item_name,
            item_type: ItemType::LargeItem,
            total_quantity: Some(total_quantity),
            total_capacity: None,
            total_weight: None,
            stock_status: status,
        },
        changes,
    })
}

/// Recompute the container stat row for an item from its containers.
pub async fn recompute_container_stat(
    conn: &mut PgConnection,
    item_id: &str,
) -> AppResult<StatRecompute> {
    let stat = sqlx::query_as::<_, ContainerStatRow>(
        r#"
        SELECT cs.total_weight, cs.total_quantity, cs.container_item_weight,
               cs.high_threshold, cs.low_threshold, cs.stock_status,
               i.name AS item_name
        FROM container_stats cs
        JOIN items i ON i.id = cs.item_id
        WHERE cs.item_id = $1
        FOR UPDATE OF cs
        "#,
    )
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    let total_weight = sqlx::query_scalar::<_, Decimal>(
        "SELECT COALESCE(SUM(items_weight), 0) FROM containers WHERE item_id = $1",
    )
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    let total_quantity = container_quantity(total_weight, stat.container_item_weight);
    let status = determine_status(
        total_weight,
        Some(stat.low_threshold),
        Some(stat.high_threshold),
    );

    let mut changes = ChangeSet::new();
    changes.compare("total_weight", &stat.total_weight, &total_weight);
    changes.compare("total_quantity", &stat.total_quantity, &total_quantity);
    changes.compare("stock_status", &parse_status(&stat.stock_status), &status);

    if !changes.is_empty() {
        sqlx::query(
            r#"
            UPDATE container_stats
            SET total_weight = $1, total_quantity = $2, stock_status = $3, updated_at = now()
            WHERE item_id = $4
            "#,
        )
        .bind(total_weight)
        .bind(total_quantity)
        .bind(status.map(|s| s.as_str()))
        .bind(item_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(StatRecompute {
        snapshot: StatSnapshot {
            item_id: item_id.to_string(),
            item_name: stat.item_name,
            item_type: ItemType::Container,
            total_quantity,
            total_capacity: None,
            total_weight: Some(total_weight),
            stock_status: status,
        },
        changes,
    })
}

/// Recompute the stat row matching the item's type.
pub async fn recompute_stat(
    conn: &mut PgConnection,
    item_id: &str,
    item_type: ItemType,
) -> AppResult<StatRecompute> {
    match item_type {
        ItemType::Partition => recompute_partition_stat(conn, item_id).await,
        ItemType::LargeItem => recompute_large_item_stat(conn, item_id).await,
        ItemType::Container => recompute_container_stat(conn, item_id).await,
    }
}
