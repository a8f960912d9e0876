//! RFID tag assignment ledger and tag management
//!
//! Assignment and release run on the owning unit's transaction so a crash can
//! never leave a tag marked assigned with no owning unit, or the reverse.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use shared::{PaginatedResponse, Pagination, PaginationMeta};

use crate::error::{AppError, AppResult};

/// An RFID tag and its assignment state
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RfidTag {
    pub id: String,
    pub assigned: bool,
}

/// Input for registering a new RFID tag
#[derive(Debug, Deserialize)]
pub struct CreateRfidTagInput {
    pub id: String,
}

/// Mark a tag assigned. Fails when the tag does not exist or is already bound
/// to another unit. Runs on the caller's transaction.
pub async fn assign_tag(conn: &mut PgConnection, tag_id: &str) -> AppResult<RfidTag> {
    let tag = sqlx::query_as::<_, RfidTag>(
        "SELECT id, assigned FROM rfid_tags WHERE id = $1 FOR UPDATE",
    )
    .bind(tag_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("RFID tag '{}'", tag_id)))?;

    if tag.assigned {
        return Err(AppError::TagUnavailable(format!(
            "RFID tag '{}' is already assigned",
            tag_id
        )));
    }

    sqlx::query("UPDATE rfid_tags SET assigned = TRUE WHERE id = $1")
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;

    Ok(RfidTag {
        id: tag.id,
        assigned: true,
    })
}

/// Release a tag back to the available pool. No-op when the tag is missing.
/// Runs on the caller's transaction.
pub async fn release_tag(conn: &mut PgConnection, tag_id: &str) -> AppResult<()> {
    sqlx::query("UPDATE rfid_tags SET assigned = FALSE WHERE id = $1")
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Swap a unit's tag: no-op when unchanged, otherwise the new tag must be
/// free; the old tag is released and the new one assigned together.
pub async fn reassign_tag(
    conn: &mut PgConnection,
    old_tag_id: &str,
    new_tag_id: &str,
) -> AppResult<()> {
    if old_tag_id == new_tag_id {
        return Ok(());
    }
    assign_tag(conn, new_tag_id).await?;
    release_tag(conn, old_tag_id).await?;
    Ok(())
}

/// RFID tag management service
#[derive(Clone)]
pub struct RfidService {
    db: PgPool,
}

impl RfidService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_tag(&self, input: CreateRfidTagInput) -> AppResult<RfidTag> {
        if input.id.trim().is_empty() {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: "Tag id must not be empty".to_string(),
            });
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM rfid_tags WHERE id = $1)",
        )
        .bind(&input.id)
        .fetch_one(&self.db)
        .await?;
        if exists {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: format!("RFID tag '{}' already exists", input.id),
            });
        }

        let tag = sqlx::query_as::<_, RfidTag>(
            "INSERT INTO rfid_tags (id, assigned) VALUES ($1, FALSE) RETURNING id, assigned",
        )
        .bind(&input.id)
        .fetch_one(&self.db)
        .await?;

        Ok(tag)
    }

    pub async fn get_tag(&self, tag_id: &str) -> AppResult<RfidTag> {
        sqlx::query_as::<_, RfidTag>("SELECT id, assigned FROM rfid_tags WHERE id = $1")
            .bind(tag_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("RFID tag '{}'", tag_id)))
    }

    pub async fn list_tags(
        &self,
        assigned: Option<bool>,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<RfidTag>> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM rfid_tags WHERE ($1::BOOLEAN IS NULL OR assigned = $1)",
        )
        .bind(assigned)
        .fetch_one(&self.db)
        .await?;

        let tags = sqlx::query_as::<_, RfidTag>(
            r#"
            SELECT id, assigned FROM rfid_tags
            WHERE ($1::BOOLEAN IS NULL OR assigned = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(assigned)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: tags,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Delete a tag. Blocked while any unit references it.
    pub async fn delete_tag(&self, tag_id: &str) -> AppResult<()> {
        let tag = self.get_tag(tag_id).await?;
        if tag.assigned {
            return Err(AppError::ReferentialBlock(format!(
                "Cannot delete RFID tag '{}' while it is assigned to a unit",
                tag_id
            )));
        }

        sqlx::query("DELETE FROM rfid_tags WHERE id = $1")
            .bind(tag_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
