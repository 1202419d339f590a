// ============================================================================
// Access Infrastructure - PostgreSQL Feature Repository
// File: crates/access-infrastructure/src/database/postgres/feature_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info, warn};
use uuid::Uuid;

use access_core::domain::Feature;
use access_core::error::DomainError;
use access_core::repositories::FeatureRepository;

use super::{db_error, is_unique_violation, lock_live_menu};

pub struct PgFeatureRepository {
    pool: PgPool,
}

impl PgFeatureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct FeatureRow {
    pub id: Uuid,
    pub name: String,
    pub menu_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<FeatureRow> for Feature {
    fn from(row: FeatureRow) -> Self {
        Feature {
            id: row.id,
            name: row.name,
            menu_id: row.menu_id,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

fn name_conflict(feature: &Feature, e: sqlx::Error) -> DomainError {
    if is_unique_violation(&e) {
        warn!("Feature name already exists: {}", feature.name);
        DomainError::FeatureNameAlreadyExists(feature.name.clone())
    } else {
        error!("Database error writing feature {}: {}", feature.id, e);
        DomainError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl FeatureRepository for PgFeatureRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Feature>, DomainError> {
        let row: Option<FeatureRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, menu_id, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM features
            WHERE id = $1 AND removed_at IS NULL
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding feature by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Feature>, DomainError> {
        let row: Option<FeatureRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, menu_id, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM features
            WHERE LOWER(name) = LOWER($1) AND removed_at IS NULL
            "#
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding feature by name: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Feature>, DomainError> {
        let rows: Vec<FeatureRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, menu_id, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM features
            WHERE id = ANY($1) AND removed_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding features by ids: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<Feature>, DomainError> {
        let rows: Vec<FeatureRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, menu_id, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM features
            WHERE removed_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing features: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_menu(&self, menu_id: Option<Uuid>) -> Result<Vec<Feature>, DomainError> {
        // NULL $1 selects the global features
        let rows: Vec<FeatureRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, menu_id, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM features
            WHERE menu_id IS NOT DISTINCT FROM $1 AND removed_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing features by menu: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, feature: &Feature) -> Result<Feature, DomainError> {
        info!("Creating feature: {}", feature.name);

        let mut tx = self.pool.begin().await.map_err(db_error("starting feature create"))?;
        if let Some(menu_id) = feature.menu_id {
            lock_live_menu(&mut tx, &menu_id).await?;
        }

        let row: FeatureRow = sqlx::query_as(
            r#"
            INSERT INTO features (
                id, name, menu_id, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING
                id, name, menu_id, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            "#
        )
        .bind(feature.id)
        .bind(&feature.name)
        .bind(feature.menu_id)
        .bind(&feature.description)
        .bind(feature.is_active)
        .bind(feature.created_at)
        .bind(feature.created_by)
        .bind(feature.modified_at)
        .bind(feature.modified_by)
        .bind(feature.removed_at)
        .bind(feature.removed_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| name_conflict(feature, e))?;
        tx.commit().await.map_err(db_error("committing feature create"))?;

        info!("Feature created successfully: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, feature: &Feature) -> Result<Feature, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting feature update"))?;
        if let Some(menu_id) = feature.menu_id {
            lock_live_menu(&mut tx, &menu_id).await?;
        }

        let row: Option<FeatureRow> = sqlx::query_as(
            r#"
            UPDATE features
            SET
                name = $2,
                menu_id = $3,
                description = $4,
                is_active = $5,
                modified_at = $6,
                modified_by = $7
            WHERE id = $1 AND removed_at IS NULL
            RETURNING
                id, name, menu_id, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            "#
        )
        .bind(feature.id)
        .bind(&feature.name)
        .bind(feature.menu_id)
        .bind(&feature.description)
        .bind(feature.is_active)
        .bind(feature.modified_at)
        .bind(feature.modified_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| name_conflict(feature, e))?;

        let row = row.ok_or(DomainError::FeatureNotFound(feature.id))?;
        tx.commit().await.map_err(db_error("committing feature update"))?;

        Ok(row.into())
    }

    async fn delete(&self, id: &Uuid, deleted_by: &Uuid) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting feature delete"))?;

        let removed = sqlx::query(
            r#"
            UPDATE features
            SET is_active = FALSE, removed_at = NOW(), removed_by = $2
            WHERE id = $1 AND removed_at IS NULL
            "#
        )
        .bind(id)
        .bind(deleted_by)
        .execute(&mut *tx)
        .await
        .map_err(db_error("removing feature"))?
        .rows_affected();

        if removed == 0 {
            return Err(DomainError::FeatureNotFound(*id));
        }

        let grants = sqlx::query("DELETE FROM access_feature WHERE feature_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting feature grants"))?
            .rows_affected();

        tx.commit().await.map_err(db_error("committing feature delete"))?;

        info!("Feature {} removed with {} grants", id, grants);
        Ok(())
    }
}
