//! Grant store trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{AccessFeature, AccessMenu, FeatureGrant, GrantCounts};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessRepository: Send + Sync {
    async fn list_menu_grants(&self, role_id: &Uuid) -> Result<Vec<AccessMenu>, DomainError>;
    async fn list_feature_grants(&self, role_id: &Uuid) -> Result<Vec<AccessFeature>, DomainError>;

    /// Replaces the role's complete grant set in one transaction.
    ///
    /// Every menu and feature id is re-checked inside the transaction; a
    /// missing one aborts with nothing written.
    async fn replace_role_access(
        &self,
        role_id: &Uuid,
        menu_ids: &[Uuid],
        feature_grants: &[FeatureGrant],
        actor_id: &Uuid,
    ) -> Result<GrantCounts, DomainError>;

    /// Drops every grant the role holds.
    async fn revoke_role_access(&self, role_id: &Uuid) -> Result<GrantCounts, DomainError>;
}
