// ============================================================================
// Access Infrastructure - PostgreSQL Menu Repository
// File: crates/access-infrastructure/src/database/postgres/menu_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info, warn};
use uuid::Uuid;

use access_core::domain::{Menu, SubtreeDeletion};
use access_core::error::DomainError;
use access_core::repositories::MenuRepository;

use super::{db_error, is_unique_violation, lock_live_menu};

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuRow {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub route_path: Option<String>,
    pub icon: Option<String>,
    pub hierarchy_level: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
            route_path: row.route_path,
            icon: row.icon,
            hierarchy_level: row.hierarchy_level,
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

fn name_conflict(menu: &Menu, e: sqlx::Error) -> DomainError {
    if is_unique_violation(&e) {
        warn!("Menu name already exists: {}", menu.name);
        DomainError::MenuNameAlreadyExists(menu.name.clone())
    } else {
        error!("Database error writing menu {}: {}", menu.id, e);
        DomainError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, parent_id, route_path, icon, hierarchy_level, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM menus
            WHERE id = $1 AND removed_at IS NULL
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding menu by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, parent_id, route_path, icon, hierarchy_level, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM menus
            WHERE LOWER(name) = LOWER($1) AND removed_at IS NULL
            "#
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding menu by name: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, parent_id, route_path, icon, hierarchy_level, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM menus
            WHERE id = ANY($1) AND removed_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding menus by ids: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, parent_id, route_path, icon, hierarchy_level, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM menus
            WHERE removed_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing menus: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, parent_id, route_path, icon, hierarchy_level, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            FROM menus
            WHERE removed_at IS NULL
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing menu page: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM menus WHERE removed_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error counting menus: {}", e);
                DomainError::DatabaseError(e.to_string())
            })
    }

    async fn list_by_role(&self, role_id: &Uuid) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(
            r#"
            SELECT
                m.id, m.name, m.parent_id, m.route_path, m.icon, m.hierarchy_level, m.description,
                m.is_active, m.created_at, m.created_by, m.modified_at, m.modified_by,
                m.removed_at, m.removed_by
            FROM menus m
            INNER JOIN access_menu am ON am.menu_id = m.id
            WHERE am.role_id = $1 AND m.removed_at IS NULL
            ORDER BY m.created_at ASC, m.id ASC
            "#
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing menus for role: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, menu: &Menu) -> Result<Menu, DomainError> {
        info!("Creating menu: {}", menu.name);

        let mut tx = self.pool.begin().await.map_err(db_error("starting menu create"))?;
        if let Some(parent_id) = menu.parent_id {
            lock_live_menu(&mut tx, &parent_id).await?;
        }

        let row: MenuRow = sqlx::query_as(
            r#"
            INSERT INTO menus (
                id, name, parent_id, route_path, icon, hierarchy_level, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING
                id, name, parent_id, route_path, icon, hierarchy_level, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            "#
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.parent_id)
        .bind(&menu.route_path)
        .bind(&menu.icon)
        .bind(menu.hierarchy_level)
        .bind(&menu.description)
        .bind(menu.is_active)
        .bind(menu.created_at)
        .bind(menu.created_by)
        .bind(menu.modified_at)
        .bind(menu.modified_by)
        .bind(menu.removed_at)
        .bind(menu.removed_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| name_conflict(menu, e))?;
        tx.commit().await.map_err(db_error("committing menu create"))?;

        info!("Menu created successfully: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, menu: &Menu) -> Result<Menu, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting menu update"))?;

        if let Some(parent_id) = menu.parent_id {
            lock_live_menu(&mut tx, &parent_id).await?;

            // Parent must not sit inside the menu's own subtree
            let cyclic: bool = sqlx::query_scalar(
                r#"
                WITH RECURSIVE subtree AS (
                    SELECT id FROM menus WHERE id = $1

                    UNION

                    SELECT m.id FROM menus m
                    INNER JOIN subtree s ON m.parent_id = s.id
                    WHERE m.removed_at IS NULL
                )
                SELECT EXISTS(SELECT 1 FROM subtree WHERE id = $2)
                "#
            )
            .bind(menu.id)
            .bind(parent_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("checking menu ancestry"))?;

            if cyclic {
                warn!("Menu {} cannot move under its own descendant {}", menu.id, parent_id);
                return Err(DomainError::CyclicParent {
                    menu_id: menu.id,
                    parent_id,
                });
            }
        }

        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            UPDATE menus
            SET
                name = $2,
                parent_id = $3,
                route_path = $4,
                icon = $5,
                hierarchy_level = $6,
                description = $7,
                is_active = $8,
                modified_at = $9,
                modified_by = $10
            WHERE id = $1 AND removed_at IS NULL
            RETURNING
                id, name, parent_id, route_path, icon, hierarchy_level, description, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            "#
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.parent_id)
        .bind(&menu.route_path)
        .bind(&menu.icon)
        .bind(menu.hierarchy_level)
        .bind(&menu.description)
        .bind(menu.is_active)
        .bind(menu.modified_at)
        .bind(menu.modified_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| name_conflict(menu, e))?;

        let row = row.ok_or(DomainError::MenuNotFound(menu.id))?;
        tx.commit().await.map_err(db_error("committing menu update"))?;

        Ok(row.into())
    }

    async fn delete_subtree(&self, ids: &[Uuid], deleted_by: &Uuid) -> Result<SubtreeDeletion, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting subtree delete"))?;

        // Re-expand under the transaction so children created meanwhile go too
        let menu_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM menus WHERE id = ANY($1) AND removed_at IS NULL

                UNION

                SELECT m.id FROM menus m
                INNER JOIN subtree s ON m.parent_id = s.id
                WHERE m.removed_at IS NULL
            )
            SELECT id FROM subtree
            "#
        )
        .bind(ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("expanding menu subtree"))?;

        if menu_ids.is_empty() {
            return Ok(SubtreeDeletion::default());
        }

        // Soft-delete before touching grants: the row locks taken here make a
        // concurrent grant replace wait, then see the rows as removed.
        let menus = sqlx::query(
            r#"
            UPDATE menus
            SET is_active = FALSE, removed_at = NOW(), removed_by = $2
            WHERE id = ANY($1) AND removed_at IS NULL
            "#
        )
        .bind(&menu_ids)
        .bind(deleted_by)
        .execute(&mut *tx)
        .await
        .map_err(db_error("removing subtree menus"))?
        .rows_affected();

        let feature_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE features
            SET is_active = FALSE, removed_at = NOW(), removed_by = $2
            WHERE menu_id = ANY($1) AND removed_at IS NULL
            RETURNING id
            "#
        )
        .bind(&menu_ids)
        .bind(deleted_by)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("removing subtree features"))?;

        let access_features = sqlx::query("DELETE FROM access_feature WHERE feature_id = ANY($1)")
            .bind(&feature_ids)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting feature grants"))?
            .rows_affected();

        let access_menus = sqlx::query("DELETE FROM access_menu WHERE menu_id = ANY($1)")
            .bind(&menu_ids)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting menu grants"))?
            .rows_affected();

        tx.commit().await.map_err(db_error("committing subtree delete"))?;

        Ok(SubtreeDeletion {
            menus,
            features: feature_ids.len() as u64,
            access_menus,
            access_features,
        })
    }
}
