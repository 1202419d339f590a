// ============================================================================
// Access Core - Feature Service
// File: crates/access-core/src/services/feature_service.rs
// ============================================================================
//! Feature CRUD with name uniqueness and menu scoping checks.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{CreateFeatureInput, Feature, FeaturePatch};
use crate::error::DomainError;
use crate::repositories::{FeatureRepository, MenuRepository};

pub struct FeatureService<F: FeatureRepository, M: MenuRepository> {
    feature_repo: Arc<F>,
    menu_repo: Arc<M>,
}

impl<F: FeatureRepository, M: MenuRepository> FeatureService<F, M> {
    pub fn new(feature_repo: Arc<F>, menu_repo: Arc<M>) -> Self {
        Self { feature_repo, menu_repo }
    }

    pub async fn get_feature_by_id(&self, id: &Uuid) -> Result<Feature, DomainError> {
        self.feature_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::FeatureNotFound(*id))
    }

    pub async fn get_feature_by_name(&self, name: &str) -> Result<Option<Feature>, DomainError> {
        self.feature_repo.find_by_name(name.trim()).await
    }

    /// Features of one menu, or the global ones when `menu_id` is `None`.
    pub async fn list_features(&self, menu_id: Option<Uuid>) -> Result<Vec<Feature>, DomainError> {
        if let Some(menu_id) = menu_id {
            self.ensure_menu_exists(&menu_id).await?;
        }
        self.feature_repo.list_by_menu(menu_id).await
    }

    pub async fn create_feature(&self, input: CreateFeatureInput, actor_id: Uuid) -> Result<Uuid, DomainError> {
        let name = input.name.trim().to_string();
        info!("Creating feature: {}", name);

        if self.feature_repo.find_by_name(&name).await?.is_some() {
            warn!("Feature creation rejected: name already exists: {}", name);
            return Err(DomainError::FeatureNameAlreadyExists(name));
        }

        if let Some(menu_id) = input.menu_id {
            self.ensure_menu_exists(&menu_id).await?;
        }

        let feature = Feature::new(input, Some(actor_id))?;
        let created = self.feature_repo.create(&feature).await?;

        info!("Feature created: {} ({})", created.name, created.id);
        Ok(created.id)
    }

    pub async fn update_feature(&self, id: &Uuid, patch: FeaturePatch, actor_id: Uuid) -> Result<(), DomainError> {
        let mut feature = self.get_feature_by_id(id).await?;

        if let Some(name) = patch.name.as_deref().map(str::trim) {
            if !name.eq_ignore_ascii_case(&feature.name) {
                if let Some(other) = self.feature_repo.find_by_name(name).await? {
                    if other.id != feature.id {
                        warn!("Feature update rejected: name already exists: {}", name);
                        return Err(DomainError::FeatureNameAlreadyExists(name.to_string()));
                    }
                }
            }
        }

        if let Some(Some(menu_id)) = patch.menu_id {
            self.ensure_menu_exists(&menu_id).await?;
        }

        feature.apply_patch(patch, actor_id)?;
        self.feature_repo.update(&feature).await?;

        info!("Feature updated: {}", id);
        Ok(())
    }

    pub async fn delete_feature(&self, id: &Uuid, actor_id: Uuid) -> Result<(), DomainError> {
        self.get_feature_by_id(id).await?;
        self.feature_repo.delete(id, &actor_id).await?;

        info!("Feature deleted: {}", id);
        Ok(())
    }

    async fn ensure_menu_exists(&self, menu_id: &Uuid) -> Result<(), DomainError> {
        match self.menu_repo.find_by_id(menu_id).await? {
            Some(_) => Ok(()),
            None => {
                warn!("Feature rejected: menu not found: {}", menu_id);
                Err(DomainError::MenuNotFound(*menu_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repositories::{MockFeatureRepository, MockMenuRepository};
    use crate::services::hierarchy::tests::{feature, menu};

    fn service(feature_repo: MockFeatureRepository, menu_repo: MockMenuRepository) -> FeatureService<MockFeatureRepository, MockMenuRepository> {
        FeatureService::new(Arc::new(feature_repo), Arc::new(menu_repo))
    }

    #[tokio::test]
    async fn test_create_menu_scoped_feature() {
        let scope = menu("Reports", None);
        let scope_id = scope.id;
        let mut features = MockFeatureRepository::new();
        features.expect_find_by_name().returning(|_| Ok(None));
        features
            .expect_create()
            .withf(move |f| f.menu_id == Some(scope_id))
            .returning(|f| Ok(f.clone()));
        let mut menus = MockMenuRepository::new();
        menus
            .expect_find_by_id()
            .returning(move |_| Ok(Some(scope.clone())));

        let result = service(features, menus)
            .create_feature(
                CreateFeatureInput {
                    name: "export".to_string(),
                    menu_id: Some(scope_id),
                    ..Default::default()
                },
                Uuid::new_v4(),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_feature_duplicate_name() {
        let existing = feature("export", None);
        let mut features = MockFeatureRepository::new();
        features
            .expect_find_by_name()
            .returning(move |_| Ok(Some(existing.clone())));
        features.expect_create().never();

        let result = service(features, MockMenuRepository::new())
            .create_feature(
                CreateFeatureInput {
                    name: "export".to_string(),
                    ..Default::default()
                },
                Uuid::new_v4(),
            )
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_create_feature_for_missing_menu() {
        let mut features = MockFeatureRepository::new();
        features.expect_find_by_name().returning(|_| Ok(None));
        features.expect_create().never();
        let mut menus = MockMenuRepository::new();
        menus.expect_find_by_id().returning(|_| Ok(None));

        let missing = Uuid::new_v4();
        let result = service(features, menus)
            .create_feature(
                CreateFeatureInput {
                    name: "export".to_string(),
                    menu_id: Some(missing),
                    ..Default::default()
                },
                Uuid::new_v4(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::MenuNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_update_feature_same_name_different_case_skips_lookup() {
        let current = feature("export", None);
        let id = current.id;
        let mut features = MockFeatureRepository::new();
        features
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        features.expect_find_by_name().never();
        features
            .expect_update()
            .withf(|f| f.name == "Export")
            .times(1)
            .returning(|f| Ok(f.clone()));

        service(features, MockMenuRepository::new())
            .update_feature(
                &id,
                FeaturePatch {
                    name: Some("Export".to_string()),
                    ..Default::default()
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_feature_rename_conflict() {
        let current = feature("export", None);
        let taken = feature("import", None);
        let id = current.id;
        let mut features = MockFeatureRepository::new();
        features
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        features
            .expect_find_by_name()
            .withf(|name| name == "Import")
            .returning(move |_| Ok(Some(taken.clone())));
        features.expect_update().never();

        let result = service(features, MockMenuRepository::new())
            .update_feature(
                &id,
                FeaturePatch {
                    name: Some("  Import ".to_string()),
                    ..Default::default()
                },
                Uuid::new_v4(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::FeatureNameAlreadyExists(ref name)) if name == "Import"));
    }

    #[tokio::test]
    async fn test_update_feature_to_missing_menu() {
        let current = feature("export", None);
        let id = current.id;
        let mut features = MockFeatureRepository::new();
        features
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        features.expect_update().never();
        let mut menus = MockMenuRepository::new();
        menus.expect_find_by_id().returning(|_| Ok(None));

        let missing = Uuid::new_v4();
        let result = service(features, menus)
            .update_feature(
                &id,
                FeaturePatch {
                    menu_id: Some(Some(missing)),
                    ..Default::default()
                },
                Uuid::new_v4(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::MenuNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_delete_missing_feature() {
        let mut features = MockFeatureRepository::new();
        features.expect_find_by_id().returning(|_| Ok(None));
        features.expect_delete().never();

        let result = service(features, MockMenuRepository::new())
            .delete_feature(&Uuid::new_v4(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(DomainError::FeatureNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_global_features() {
        let mut features = MockFeatureRepository::new();
        features
            .expect_list_by_menu()
            .withf(|menu_id| menu_id.is_none())
            .returning(|_| Ok(vec![feature("audit", None)]));

        let listed = service(features, MockMenuRepository::new())
            .list_features(None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_global());
    }
}
