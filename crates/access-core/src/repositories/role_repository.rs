//! Role lookup trait (port). Roles themselves are owned by the role service.

use async_trait::async_trait;
use uuid::Uuid;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn exists(&self, role_id: &Uuid) -> Result<bool, DomainError>;
}
