// ============================================================================
// Access Infrastructure - PostgreSQL Grant Store
// File: crates/access-infrastructure/src/database/postgres/access_repo_impl.rs
// ============================================================================

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{error, info, warn};
use uuid::Uuid;

use access_core::domain::{AccessFeature, AccessMenu, FeatureGrant, GrantCounts};
use access_core::error::DomainError;
use access_core::repositories::AccessRepository;

use super::db_error;

pub struct PgAccessRepository {
    pool: PgPool,
}

impl PgAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct AccessMenuRow {
    pub id: Uuid,
    pub role_id: Uuid,
    pub menu_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl From<AccessMenuRow> for AccessMenu {
    fn from(row: AccessMenuRow) -> Self {
        AccessMenu {
            id: row.id,
            role_id: row.role_id,
            menu_id: row.menu_id,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct AccessFeatureRow {
    pub id: Uuid,
    pub role_id: Uuid,
    pub feature_id: Uuid,
    pub can_access: bool,
    pub can_read: bool,
    pub can_insert: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl From<AccessFeatureRow> for AccessFeature {
    fn from(row: AccessFeatureRow) -> Self {
        AccessFeature {
            id: row.id,
            role_id: row.role_id,
            feature_id: row.feature_id,
            can_access: row.can_access,
            can_read: row.can_read,
            can_insert: row.can_insert,
            can_update: row.can_update,
            can_delete: row.can_delete,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

/// First id of `wanted` that the live-row query did not return.
fn first_missing(wanted: &[Uuid], found: Vec<Uuid>) -> Option<Uuid> {
    let found: HashSet<Uuid> = found.into_iter().collect();
    wanted.iter().find(|id| !found.contains(id)).copied()
}

async fn delete_role_grants(tx: &mut Transaction<'_, Postgres>, role_id: &Uuid) -> Result<GrantCounts, DomainError> {
    let access_features = sqlx::query("DELETE FROM access_feature WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("deleting feature grants"))?
        .rows_affected();

    let access_menus = sqlx::query("DELETE FROM access_menu WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("deleting menu grants"))?
        .rows_affected();

    Ok(GrantCounts {
        access_menus,
        access_features,
    })
}

#[async_trait]
impl AccessRepository for PgAccessRepository {
    async fn list_menu_grants(&self, role_id: &Uuid) -> Result<Vec<AccessMenu>, DomainError> {
        let rows: Vec<AccessMenuRow> = sqlx::query_as(
            r#"
            SELECT
                am.id, am.role_id, am.menu_id,
                am.created_at, am.created_by, am.modified_at, am.modified_by
            FROM access_menu am
            INNER JOIN menus m ON m.id = am.menu_id
            WHERE am.role_id = $1 AND m.removed_at IS NULL
            ORDER BY m.created_at ASC, m.id ASC
            "#
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing menu grants: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_feature_grants(&self, role_id: &Uuid) -> Result<Vec<AccessFeature>, DomainError> {
        let rows: Vec<AccessFeatureRow> = sqlx::query_as(
            r#"
            SELECT
                af.id, af.role_id, af.feature_id,
                af.can_access, af.can_read, af.can_insert, af.can_update, af.can_delete,
                af.created_at, af.created_by, af.modified_at, af.modified_by
            FROM access_feature af
            INNER JOIN features f ON f.id = af.feature_id
            WHERE af.role_id = $1 AND f.removed_at IS NULL
            ORDER BY f.created_at ASC, f.id ASC
            "#
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing feature grants: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_role_access(
        &self,
        role_id: &Uuid,
        menu_ids: &[Uuid],
        feature_grants: &[FeatureGrant],
        actor_id: &Uuid,
    ) -> Result<GrantCounts, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting grant replace"))?;

        // Row lock serialises concurrent replaces for the same role
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM roles WHERE id = $1 AND removed_at IS NULL FOR UPDATE")
                .bind(role_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("locking role"))?;
        if locked.is_none() {
            return Err(DomainError::RoleNotFound(*role_id));
        }

        let live_menus: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM menus WHERE id = ANY($1) AND removed_at IS NULL FOR SHARE")
                .bind(menu_ids)
                .fetch_all(&mut *tx)
                .await
                .map_err(db_error("re-checking menus"))?;
        if let Some(missing) = first_missing(menu_ids, live_menus) {
            warn!("Grant replace aborted, menu vanished: {}", missing);
            return Err(DomainError::MenuNotFound(missing));
        }

        let feature_ids: Vec<Uuid> = feature_grants.iter().map(|g| g.feature_id).collect();
        let live_features: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM features WHERE id = ANY($1) AND removed_at IS NULL FOR SHARE")
                .bind(&feature_ids)
                .fetch_all(&mut *tx)
                .await
                .map_err(db_error("re-checking features"))?;
        if let Some(missing) = first_missing(&feature_ids, live_features) {
            warn!("Grant replace aborted, feature vanished: {}", missing);
            return Err(DomainError::FeatureNotFound(missing));
        }

        let removed = delete_role_grants(&mut tx, role_id).await?;

        for menu_id in menu_ids {
            let grant = AccessMenu::new(*role_id, *menu_id, Some(*actor_id));
            sqlx::query(
                r#"
                INSERT INTO access_menu (id, role_id, menu_id, created_at, created_by)
                VALUES ($1, $2, $3, $4, $5)
                "#
            )
            .bind(grant.id)
            .bind(grant.role_id)
            .bind(grant.menu_id)
            .bind(grant.created_at)
            .bind(grant.created_by)
            .execute(&mut *tx)
            .await
            .map_err(db_error("inserting menu grant"))?;
        }

        for feature_grant in feature_grants {
            let grant = AccessFeature::new(
                *role_id,
                feature_grant.feature_id,
                feature_grant.permissions,
                Some(*actor_id),
            );
            sqlx::query(
                r#"
                INSERT INTO access_feature (
                    id, role_id, feature_id,
                    can_access, can_read, can_insert, can_update, can_delete,
                    created_at, created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#
            )
            .bind(grant.id)
            .bind(grant.role_id)
            .bind(grant.feature_id)
            .bind(grant.can_access)
            .bind(grant.can_read)
            .bind(grant.can_insert)
            .bind(grant.can_update)
            .bind(grant.can_delete)
            .bind(grant.created_at)
            .bind(grant.created_by)
            .execute(&mut *tx)
            .await
            .map_err(db_error("inserting feature grant"))?;
        }

        tx.commit().await.map_err(db_error("committing grant replace"))?;

        info!(
            "Role {} grants replaced: {} menu and {} feature rows dropped",
            role_id, removed.access_menus, removed.access_features
        );
        Ok(GrantCounts {
            access_menus: menu_ids.len() as u64,
            access_features: feature_grants.len() as u64,
        })
    }

    async fn revoke_role_access(&self, role_id: &Uuid) -> Result<GrantCounts, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting grant revoke"))?;
        let removed = delete_role_grants(&mut tx, role_id).await?;
        tx.commit().await.map_err(db_error("committing grant revoke"))?;
        Ok(removed)
    }
}
