// ============================================================================
// Access Infrastructure - PostgreSQL Role Lookup
// File: crates/access-infrastructure/src/database/postgres/role_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use access_core::error::DomainError;
use access_core::repositories::RoleRepository;

pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn exists(&self, role_id: &Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1 AND removed_at IS NULL)")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error checking role: {}", e);
                DomainError::DatabaseError(e.to_string())
            })
    }
}
