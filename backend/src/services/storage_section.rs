//! Storage section management and the capacity ledger
//!
//! Sections track how many storage units are in use. Reservations and
//! releases run on the owning unit's transaction; a section move releases the
//! old section and reserves the new one as a single all-or-nothing step.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use shared::{
    available_units, can_reserve, generate_section_id, lock_order, release_clamped,
    utilization_rate, validate_location_component, validate_total_units, PaginatedResponse,
    Pagination, PaginationMeta, SectionColor,
};

use crate::error::{AppError, AppResult};

/// A storage section row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StorageSection {
    pub id: String,
    pub floor: String,
    pub cabinet: String,
    pub layer: String,
    pub color: String,
    pub total_units: i32,
    pub used_units: i32,
}

/// Storage section with derived occupancy fields for responses
#[derive(Debug, Clone, Serialize)]
pub struct StorageSectionView {
    #[serde(flatten)]
    pub section: StorageSection,
    pub available_units: i32,
    pub utilization_rate: f64,
    pub is_full: bool,
    pub is_empty: bool,
}

impl From<StorageSection> for StorageSectionView {
    fn from(section: StorageSection) -> Self {
        let available = available_units(section.used_units, section.total_units);
        let rate = utilization_rate(section.used_units, section.total_units);
        Self {
            available_units: available,
            utilization_rate: rate,
            is_full: section.used_units >= section.total_units,
            is_empty: section.used_units == 0,
            section,
        }
    }
}

/// Input for creating a storage section; the id is derived from the location
#[derive(Debug, Deserialize)]
pub struct CreateSectionInput {
    pub floor: String,
    pub cabinet: String,
    pub layer: String,
    pub color: SectionColor,
    pub total_units: i32,
}

/// Input for updating a storage section
#[derive(Debug, Deserialize)]
pub struct UpdateSectionInput {
    pub total_units: Option<i32>,
}

/// Filters for section listings
#[derive(Debug, Default, Deserialize)]
pub struct SectionFilter {
    pub search: Option<String>,
    pub floor: Option<String>,
    pub cabinet: Option<String>,
    pub color: Option<SectionColor>,
    pub show_full_only: Option<bool>,
    pub show_empty_only: Option<bool>,
}

/// Reserve `units` in a section, failing when the reservation would exceed
/// its total. Runs on the caller's transaction; the row is locked so
/// concurrent reservations cannot oversubscribe the section.
pub async fn reserve_units(
    conn: &mut PgConnection,
    section_id: &str,
    units: i32,
) -> AppResult<()> {
    let section = sqlx::query_as::<_, StorageSection>(
        r#"
        SELECT id, floor, cabinet, layer, color, total_units, used_units
        FROM storage_sections WHERE id = $1 FOR UPDATE
        "#,
    )
    .bind(section_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Storage section '{}'", section_id)))?;

    if !can_reserve(section.used_units, section.total_units, units) {
        return Err(AppError::CapacityExceeded {
            field: "storage_section_id".to_string(),
            message: format!(
                "Storage section '{}' does not have enough capacity: available {}, required {}",
                section_id,
                available_units(section.used_units, section.total_units),
                units
            ),
        });
    }

    sqlx::query("UPDATE storage_sections SET used_units = used_units + $1 WHERE id = $2")
        .bind(units)
        .bind(section_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Release `units` from a section, clamped at zero. No-op when the section is
/// missing. Runs on the caller's transaction.
pub async fn release_units(
    conn: &mut PgConnection,
    section_id: &str,
    units: i32,
) -> AppResult<()> {
    let used = sqlx::query_scalar::<_, i32>(
        "SELECT used_units FROM storage_sections WHERE id = $1 FOR UPDATE",
    )
    .bind(section_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(used) = used {
        sqlx::query("UPDATE storage_sections SET used_units = $1 WHERE id = $2")
            .bind(release_clamped(used, units))
            .bind(section_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Move `units` between two sections as a single all-or-nothing step. Both
/// rows are locked in id order up front so concurrent opposite-direction
/// moves cannot deadlock.
pub async fn move_units(
    conn: &mut PgConnection,
    old_section_id: &str,
    new_section_id: &str,
    units: i32,
) -> AppResult<()> {
    let (first, second) = lock_order(old_section_id, new_section_id);
    for section_id in [first, second] {
        sqlx::query("SELECT id FROM storage_sections WHERE id = $1 FOR UPDATE")
            .bind(section_id)
            .execute(&mut *conn)
            .await?;
    }

    reserve_units(conn, new_section_id, units).await?;
    release_units(conn, old_section_id, units).await?;
    Ok(())
}

/// Storage section management service
#[derive(Clone)]
pub struct SectionService {
    db: PgPool,
}

impl SectionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_section(&self, input: CreateSectionInput) -> AppResult<StorageSectionView> {
        validate_total_units(input.total_units).map_err(|e| AppError::Validation {
            field: "total_units".to_string(),
            message: e.to_string(),
        })?;

        let floor = input.floor.to_uppercase();
        let cabinet = input.cabinet.to_uppercase();
        let layer = input.layer.to_uppercase();

        for (field, value, prefix) in [
            ("floor", &floor, 'F'),
            ("cabinet", &cabinet, 'C'),
            ("layer", &layer, 'L'),
        ] {
            validate_location_component(value, prefix).map_err(|e| AppError::Validation {
                field: field.to_string(),
                message: format!("{} '{}' is invalid: {}", field, value, e),
            })?;
        }

        let id = generate_section_id(&floor, &cabinet, &layer, input.color);

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM storage_sections WHERE id = $1)",
        )
        .bind(&id)
        .fetch_one(&self.db)
        .await?;
        if exists {
            return Err(AppError::Validation {
                field: "floor".to_string(),
                message: format!("Storage section '{}' already exists", id),
            });
        }

        let section = sqlx::query_as::<_, StorageSection>(
            r#"
            INSERT INTO storage_sections (id, floor, cabinet, layer, color, total_units, used_units)
            VALUES ($1, $2, $3, $4, $5, $6, 0)
            RETURNING id, floor, cabinet, layer, color, total_units, used_units
            "#,
        )
        .bind(&id)
        .bind(&floor)
        .bind(&cabinet)
        .bind(&layer)
        .bind(input.color.as_str())
        .bind(input.total_units)
        .fetch_one(&self.db)
        .await?;

        Ok(section.into())
    }

    pub async fn get_section(&self, section_id: &str) -> AppResult<StorageSectionView> {
        let section = sqlx::query_as::<_, StorageSection>(
            r#"
            SELECT id, floor, cabinet, layer, color, total_units, used_units
            FROM storage_sections WHERE id = $1
            "#,
        )
        .bind(section_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Storage section '{}'", section_id)))?;

        Ok(section.into())
    }

    /// List sections with filters, naturally sorted by floor/cabinet/layer
    /// number and then by color.
    pub async fn list_sections(
        &self,
        filter: &SectionFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<StorageSectionView>> {
        let search = filter.search.as_ref().map(|s| format!("%{}%", s));
        let floor = filter.floor.as_ref().map(|f| f.to_uppercase());
        let cabinet = filter.cabinet.as_ref().map(|c| c.to_uppercase());
        let color = filter.color.map(|c| c.as_str().to_string());
        let full_only = filter.show_full_only.unwrap_or(false);
        let empty_only = filter.show_empty_only.unwrap_or(false);

        let conditions = r#"
            ($1::TEXT IS NULL OR id ILIKE $1 OR floor ILIKE $1 OR cabinet ILIKE $1 OR layer ILIKE $1)
            AND ($2::TEXT IS NULL OR floor = $2)
            AND ($3::TEXT IS NULL OR cabinet = $3)
            AND ($4::TEXT IS NULL OR color = $4)
            AND (NOT $5 OR used_units >= total_units)
            AND (NOT $6 OR used_units = 0)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM storage_sections WHERE {}",
            conditions
        ))
        .bind(&search)
        .bind(&floor)
        .bind(&cabinet)
        .bind(&color)
        .bind(full_only)
        .bind(empty_only)
        .fetch_one(&self.db)
        .await?;

        let sections = sqlx::query_as::<_, StorageSection>(&format!(
            r#"
            SELECT id, floor, cabinet, layer, color, total_units, used_units
            FROM storage_sections
            WHERE {}
            ORDER BY
                NULLIF(substring(floor FROM 2), '')::INTEGER,
                NULLIF(substring(cabinet FROM 2), '')::INTEGER,
                NULLIF(substring(layer FROM 2), '')::INTEGER,
                CASE color
                    WHEN 'red' THEN 1 WHEN 'green' THEN 2 WHEN 'blue' THEN 3
                    WHEN 'yellow' THEN 4 ELSE 5
                END
            LIMIT $7 OFFSET $8
            "#,
            conditions
        ))
        .bind(&search)
        .bind(&floor)
        .bind(&cabinet)
        .bind(&color)
        .bind(full_only)
        .bind(empty_only)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: sections.into_iter().map(Into::into).collect(),
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Update a section's capacity. Location components form the id and are
    /// immutable; relocating means creating a new section.
    pub async fn update_section(
        &self,
        section_id: &str,
        input: UpdateSectionInput,
    ) -> AppResult<StorageSectionView> {
        let current = self.get_section(section_id).await?;

        let total_units = match input.total_units {
            Some(total) => {
                validate_total_units(total).map_err(|e| AppError::Validation {
                    field: "total_units".to_string(),
                    message: e.to_string(),
                })?;
                if total < current.section.used_units {
                    return Err(AppError::CapacityExceeded {
                        field: "total_units".to_string(),
                        message: format!(
                            "Cannot reduce total units to {}: {} units are in use",
                            total, current.section.used_units
                        ),
                    });
                }
                total
            }
            None => return Ok(current),
        };

        let section = sqlx::query_as::<_, StorageSection>(
            r#"
            UPDATE storage_sections SET total_units = $1 WHERE id = $2
            RETURNING id, floor, cabinet, layer, color, total_units, used_units
            "#,
        )
        .bind(total_units)
        .bind(section_id)
        .fetch_one(&self.db)
        .await?;

        Ok(section.into())
    }

    /// Delete a section. Blocked while any unit occupies it.
    pub async fn delete_section(&self, section_id: &str) -> AppResult<()> {
        let section = self.get_section(section_id).await?;

        let referenced = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM partitions WHERE storage_section_id = $1)
                 + (SELECT COUNT(*) FROM large_items WHERE storage_section_id = $1)
                 + (SELECT COUNT(*) FROM containers WHERE storage_section_id = $1)
            "#,
        )
        .bind(section_id)
        .fetch_one(&self.db)
        .await?;

        if section.section.used_units > 0 || referenced > 0 {
            return Err(AppError::ReferentialBlock(format!(
                "Cannot delete storage section '{}' while units are stored in it",
                section_id
            )));
        }

        sqlx::query("DELETE FROM storage_sections WHERE id = $1")
            .bind(section_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
