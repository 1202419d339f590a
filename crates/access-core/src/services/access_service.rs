// ============================================================================
// Access Core - Access Service
// File: crates/access-core/src/services/access_service.rs
// ============================================================================
//! Role-scoped tree resolution and bulk grant replacement.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{AccessSubmission, FeaturePermissions, FeatureView, GrantCounts, ResolvedTree};
use crate::error::DomainError;
use crate::repositories::{AccessRepository, FeatureRepository, MenuRepository, RoleRepository};
use crate::services::submission::CollectedAccess;
use crate::services::HierarchyBuilder;

pub struct AccessService<M, F, A, R>
where
    M: MenuRepository,
    F: FeatureRepository,
    A: AccessRepository,
    R: RoleRepository,
{
    menu_repo: Arc<M>,
    feature_repo: Arc<F>,
    access_repo: Arc<A>,
    role_repo: Arc<R>,
}

impl<M, F, A, R> AccessService<M, F, A, R>
where
    M: MenuRepository,
    F: FeatureRepository,
    A: AccessRepository,
    R: RoleRepository,
{
    pub fn new(menu_repo: Arc<M>, feature_repo: Arc<F>, access_repo: Arc<A>, role_repo: Arc<R>) -> Self {
        Self {
            menu_repo,
            feature_repo,
            access_repo,
            role_repo,
        }
    }

    /// Full menu tree annotated with what `role_id` holds: every menu carries
    /// its access row (if any), every feature the role's flags.
    pub async fn get_access_tree_for_role(&self, role_id: &Uuid) -> Result<ResolvedTree, DomainError> {
        self.ensure_role_exists(role_id).await?;

        let menus = self.menu_repo.list_all().await?;
        let menu_grants = self.access_repo.list_menu_grants(role_id).await?;
        let features = self.feature_repo.list_all().await?;
        let flags = self.feature_flags(role_id).await?;

        let views = features
            .into_iter()
            .map(|feature| {
                let permissions = flags.get(&feature.id).copied().unwrap_or_default();
                FeatureView::scoped(feature, permissions)
            })
            .collect();

        HierarchyBuilder::new(menus)
            .with_grants(menu_grants)
            .with_features(views)
            .build()
    }

    /// Only what the role may navigate to: granted menus and granted
    /// features. Menus under an ungranted parent surface as roots.
    pub async fn get_accessible_menus(&self, role_id: &Uuid) -> Result<ResolvedTree, DomainError> {
        self.ensure_role_exists(role_id).await?;

        let menus = self.menu_repo.list_by_role(role_id).await?;
        let menu_grants = self.access_repo.list_menu_grants(role_id).await?;
        let features = self.feature_repo.list_all().await?;
        let flags = self.feature_flags(role_id).await?;

        let views = features
            .into_iter()
            .filter_map(|feature| {
                let permissions = flags.get(&feature.id).copied()?;
                Some(FeatureView::scoped(feature, permissions))
            })
            .collect();

        HierarchyBuilder::new(menus)
            .with_grants(menu_grants)
            .with_features(views)
            .build()
    }

    /// Replaces the role's complete grant set with `submission`.
    ///
    /// Validation happens before any write; the replace itself is one
    /// transaction, so the role ends up with either its old grants or
    /// exactly the submitted ones.
    pub async fn assign_bulk_access(
        &self,
        role_id: &Uuid,
        submission: &AccessSubmission,
        actor_id: Uuid,
    ) -> Result<ResolvedTree, DomainError> {
        info!("Bulk access assignment for role: {}", role_id);

        // 1. Role must exist
        self.ensure_role_exists(role_id).await?;

        // 2. Flatten the submitted tree
        let collected = CollectedAccess::collect(submission).map_err(|e| {
            warn!("Bulk access rejected for role {}: {}", role_id, e);
            e
        })?;

        // 3. Every referenced id must exist
        self.validate_references(&collected).await.map_err(|e| {
            warn!("Bulk access rejected for role {}: {}", role_id, e);
            e
        })?;

        // 4. Full replace
        let grants = collected.feature_grants();
        let written = self
            .access_repo
            .replace_role_access(role_id, &collected.selected_menu_ids, &grants, &actor_id)
            .await?;

        info!(
            "Role {} now holds {} menu grants and {} feature grants",
            role_id, written.access_menus, written.access_features
        );

        // 5. Re-resolve for the caller
        self.get_access_tree_for_role(role_id).await
    }

    /// Drops every grant of the role, e.g. when the role itself goes away.
    pub async fn revoke_role_access(&self, role_id: &Uuid) -> Result<GrantCounts, DomainError> {
        let removed = self.access_repo.revoke_role_access(role_id).await?;
        info!(
            "Revoked {} menu grants and {} feature grants from role {}",
            removed.access_menus, removed.access_features, role_id
        );
        Ok(removed)
    }

    async fn ensure_role_exists(&self, role_id: &Uuid) -> Result<(), DomainError> {
        if self.role_repo.exists(role_id).await? {
            Ok(())
        } else {
            warn!("Role not found: {}", role_id);
            Err(DomainError::RoleNotFound(*role_id))
        }
    }

    async fn feature_flags(&self, role_id: &Uuid) -> Result<HashMap<Uuid, FeaturePermissions>, DomainError> {
        Ok(self
            .access_repo
            .list_feature_grants(role_id)
            .await?
            .into_iter()
            .map(|g| (g.feature_id, g.to_permissions()))
            .collect())
    }

    async fn validate_references(&self, collected: &CollectedAccess) -> Result<(), DomainError> {
        if !collected.referenced_menu_ids.is_empty() {
            let found: HashSet<Uuid> = self
                .menu_repo
                .find_by_ids(&collected.referenced_menu_ids)
                .await?
                .into_iter()
                .map(|m| m.id)
                .collect();
            if let Some(missing) = collected.referenced_menu_ids.iter().find(|id| !found.contains(id)) {
                return Err(DomainError::MenuNotFound(*missing));
            }
        }

        if collected.features.is_empty() {
            return Ok(());
        }

        let scopes: HashMap<Uuid, Option<Uuid>> = self
            .feature_repo
            .find_by_ids(&collected.referenced_feature_ids())
            .await?
            .into_iter()
            .map(|f| (f.id, f.menu_id))
            .collect();

        for submitted in &collected.features {
            let scope = scopes
                .get(&submitted.feature_id)
                .ok_or(DomainError::FeatureNotFound(submitted.feature_id))?;
            if *scope != submitted.placement {
                return Err(DomainError::InvalidSubmission(match submitted.placement {
                    Some(menu_id) => format!(
                        "feature {} does not belong to menu {}",
                        submitted.feature_id, menu_id
                    ),
                    None => format!("feature {} is not a global feature", submitted.feature_id),
                }));
            }
        }
        Ok(())
    }
}
